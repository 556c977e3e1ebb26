pub mod color;
pub mod flags;
pub mod mans;

pub use self::{
    color::Rgba,
    flags::Buttons,
    mans::{MAN_COUNT, MAN_INFO, ManInfo, ManKind},
};

use bincode::config::{self, Configuration, Fixint, LittleEndian};

/* ----------------------------------------------------------------- */
/*  Fixed-point units                                                */
/* ----------------------------------------------------------------- */
pub const PIXEL_SIZE: i64 = 64; // sub-units per pixel
pub const TILE_SIZE: i64 = 16; // pixels per tile
pub const TILE: i64 = TILE_SIZE * PIXEL_SIZE; // sub-units per tile

/* ----------------------------------------------------------------- */
/*  Physics (sub-units, per tick)                                    */
/* ----------------------------------------------------------------- */
pub const TICKS_PER_SECOND: i64 = 100;
pub const GRAVITY: i64 = PIXEL_SIZE * 9;
pub const MINIMUM_VELOCITY: i64 = PIXEL_SIZE * 20;
pub const TERMINAL_VELOCITY: i64 = 100 * TILE;
pub const FRICTION: i64 = 100;
pub const BOUNCE_IMPULSE: i64 = 100 * GRAVITY;
pub const DAMAGE_FACTOR: i64 = TILE * 100;
/// Tiles past the world edge before a body is killed.
pub const OUTSIDE_DEATH_DISTANCE: i64 = 100;

/* ----------------------------------------------------------------- */
/*  Characters                                                       */
/* ----------------------------------------------------------------- */
pub const MAN_LIVES: i64 = 100;
pub const MAN_HEALTH: i64 = 10_000;
pub const RESPAWN_TIME: u64 = 200;
pub const SPAWN_ATTEMPTS: usize = 100;

pub const WHIP_TIME_MIN: u64 = 20;
pub const WHIP_TIME_MAX: u64 = 150;
pub const WHIP_DAMAGE_MIN: i64 = 10;
pub const WHIP_DAMAGE_MAX: i64 = 5000;
pub const WHIP_SPEED_MIN: i64 = 200 * PIXEL_SIZE;
pub const WHIP_SPEED_MAX: i64 = 1500 * PIXEL_SIZE;
pub const WHIP_DISTANCE: i64 = 10 * TILE;

pub const DENSITY_MIN: i64 = -GRAVITY;
pub const DENSITY_MAX: i64 = 4 * GRAVITY;
pub const DENSITY_STEP: i64 = 10;

pub const VACUUM_HURT: u64 = 20;
pub const VACUUM_SPEED: i64 = 100 * PIXEL_SIZE;
pub const VACUUM_DISTANCE: i64 = 1000 * PIXEL_SIZE;
pub const VACUUM_SUCK: i64 = 20;

pub const LEMON_SPEED: i64 = 1000 * PIXEL_SIZE;
pub const LEMON_TIME: u64 = 30;
pub const LEMON_SIZE: i64 = 16 * PIXEL_SIZE;
pub const LEMON_MASS: i64 = 50;

pub const GRUB_HEALTH: i64 = 500;
pub const GRUB_MASS: i64 = 200;
pub const GRUB_SIZE: i64 = 24 * PIXEL_SIZE;

/* ----------------------------------------------------------------- */
/*  Presentation                                                     */
/* ----------------------------------------------------------------- */
pub const FLOATER_FADE_START: u64 = 50;
pub const FLOATER_FADE_END: u64 = 150;

/// bincode layout shared by world files, snapshots and replays.
pub fn wire_config() -> Configuration<LittleEndian, Fixint> {
    config::standard()
        .with_fixed_int_encoding()
        .with_little_endian()
}
