use bincode::{Decode, Encode};

use super::components::Body;
use super::state::SimState;
use crate::defs::{GRAVITY, PIXEL_SIZE, TICKS_PER_SECOND};
use crate::world::Coord;

/// Thrown by the vacuum. Inert until it hits something, then gone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct Lemon;

/// Wandering critter: hops about roughly once a second.
#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct Grub {
    pub last_moved: u64,
}

impl Grub {
    pub(crate) fn update(&mut self, body: &mut Body, state: &mut SimState) {
        let tick = state.tick;
        let tps = TICKS_PER_SECOND as u64;
        if tick <= tps || self.last_moved + tps >= tick {
            body.acceleration = Coord::ZERO;
            return;
        }
        let rng = &mut state.rng;
        body.acceleration.y = if rng.one_in(5) { -10 * GRAVITY } else { 0 };
        let dir = if rng.below(2) == 0 { -1 } else { 1 };
        body.acceleration.x = dir * 50 * PIXEL_SIZE;
        self.last_moved = tick;
    }
}
