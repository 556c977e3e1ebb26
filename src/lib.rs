//! Deterministic tick-driven simulation core for a four-player 2-D platformer.
//!
//! * `defs`   – fixed-point constants, per-character tables, input flags.
//! * `world`  – integer vectors and the resizable tile grid.
//! * `sim`    – bodies, collision traces, abilities and the tick loop.
//! * `config` – runtime knobs and logging bootstrap for the binaries.

pub mod config;
pub mod defs;
pub mod sim;
pub mod world;
