use super::input::Input;
use super::snapshot::SnapshotError;
use super::state::SimState;
use crate::defs::{MAN_COUNT, ManKind, TICKS_PER_SECOND};
use crate::world::TileWorld;
use std::time::{Duration, Instant};

pub const TIC: Duration = Duration::from_micros(1_000_000 / TICKS_PER_SECOND as u64);

/// Owns the world and the state and drives the fixed-rate simulation.
pub struct TicRunner {
    world: TileWorld,
    state: SimState,
    /// Latest packet per slot; `None` plays as "all buttons released".
    inputs: [Option<Input>; MAN_COUNT],
    last: Instant,
    interval: Duration,
}

impl TicRunner {
    pub fn new(world: TileWorld, seed: u32) -> Self {
        let state = SimState::new(&world, seed);
        tracing::info!(seed, width = world.width(), height = world.height(), "simulation ready");
        Self {
            world,
            state,
            inputs: [None; MAN_COUNT],
            last: Instant::now(),
            interval: TIC,
        }
    }

    /// Pace `pump` at a different real-time rate.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[inline]
    pub fn world(&self) -> &TileWorld {
        &self.world
    }

    #[inline]
    pub fn state(&self) -> &SimState {
        &self.state
    }

    #[inline]
    pub fn state_mut(&mut self) -> &mut SimState {
        &mut self.state
    }

    /// Buffer a packet for `slot`; it stays in effect until replaced.
    pub fn submit(&mut self, slot: ManKind, input: Input) {
        self.inputs[slot.index()] = Some(input);
    }

    /// Forget `slot`'s packet, e.g. when its client drops.
    pub fn release(&mut self, slot: ManKind) {
        self.inputs[slot.index()] = None;
    }

    /// Run one tick and return the snapshot to broadcast.
    pub fn tick(&mut self) -> Result<Vec<u8>, SnapshotError> {
        self.state.update(&self.world, &self.inputs);
        tracing::trace!(
            tick = self.state.tick,
            units = self.state.units.len(),
            floaters = self.state.floaters.len(),
            "tick"
        );
        self.state.to_bytes()
    }

    /// Advance enough ticks to keep up with real time.
    pub fn pump(&mut self) -> Result<Vec<Vec<u8>>, SnapshotError> {
        let mut out = Vec::new();
        while self.last.elapsed() >= self.interval {
            out.push(self.tick()?);
            self.last += self.interval;
        }
        Ok(out)
    }
}
