//! Per-body integrator: ability intent, ground probe, velocity, sweep and
//! collision response, run once per body per tick.

use super::collision::{Side, Trace};
use super::components::{Actor, Body, Fate, Unit, UnitId, UnitKind};
use super::state::SimState;
use crate::defs::{
    BOUNCE_IMPULSE, DAMAGE_FACTOR, FRICTION, GRAVITY, MINIMUM_VELOCITY, OUTSIDE_DEATH_DISTANCE,
    PIXEL_SIZE, TERMINAL_VELOCITY, TICKS_PER_SECOND, TILE,
};
use crate::world::{Coord, SpecialTile, TileWorld};

/* ----------------------------------------------------------------- */
/*  Ground probe                                                      */
/* ----------------------------------------------------------------- */

/// Is the body standing on something, and on which special tile?
///
/// Probes one sub-unit down; grounded iff that move is fully blocked.
pub(crate) fn on_ground(
    body: &Body,
    state: &SimState,
    world: &TileWorld,
    me: Actor,
) -> (bool, SpecialTile) {
    let below = body.position + Coord::new(0, 1);
    let mut tr = state.trace(world, body.position, below, body.size, false);
    tr.collide_func(|o| me.blocks(state, o));
    let grounded = tr.end == body.position;
    let special = if grounded && tr.hit_world {
        tr.special
    } else {
        SpecialTile::None
    };
    (grounded, special)
}

/* ================================================================= */
/*  Core integrator                                                  */
/* ================================================================= */

impl Unit {
    /// Run one tick for a body checked out of `state` under `id`.
    ///
    /// Returns `Fate::Remove` when the body should leave the state.
    pub fn update(&mut self, state: &mut SimState, world: &TileWorld, id: UnitId) -> Fate {
        let me = Actor {
            id,
            class: self.kind.class(),
        };

        /* -- 1: intent ---------------------------------------------- */
        if self.body.alive() {
            self.kind.update(&mut self.body, state, world, me);
        } else {
            if self.kind.update_dead(&mut self.body, state, world, me) == Fate::Remove {
                return Fate::Remove;
            }
            self.body.acceleration = Coord::ZERO;
            self.body.gravity = 0;
        }

        /* -- 2-3: ground ---------------------------------------------- */
        let (grounded, special) = on_ground(&self.body, state, world, me);
        let b = &mut self.body;
        if grounded && b.velocity.y > 0 {
            b.velocity.y = 0;
        }

        /* -- 4: friction, acceleration, gravity ----------------------- */
        b.velocity -= b.velocity / FRICTION;
        b.velocity += b.acceleration;
        if !grounded {
            b.velocity.y += GRAVITY + b.gravity;
        }

        /* -- 5: clamp & rest ------------------------------------------ */
        b.velocity.x = b.velocity.x.clamp(-TERMINAL_VELOCITY, TERMINAL_VELOCITY);
        b.velocity.y = b.velocity.y.clamp(-TERMINAL_VELOCITY, TERMINAL_VELOCITY);
        if grounded
            && b.velocity.x.abs() < MINIMUM_VELOCITY
            && b.velocity.y.abs() < MINIMUM_VELOCITY
            && b.acceleration.is_zero()
        {
            b.velocity = Coord::ZERO;
        }

        /* -- 6: standing on specials ---------------------------------- */
        if grounded {
            match special {
                SpecialTile::Bounce => self.body.velocity.y = -BOUNCE_IMPULSE,
                SpecialTile::Checkpoint if self.body.alive() => {
                    if let UnitKind::Man(man) = &mut self.kind {
                        man.touch_checkpoint(&self.body, state, world);
                    }
                }
                _ => {}
            }
        }

        /* -- 7: sweep --------------------------------------------------- */
        let (mut tr, collide) = self.sweep(state, world, me);

        /* -- 8: world response ---------------------------------------- */
        if collide.is_none() && tr.hit_world {
            self.hit_world(&tr, state);
        }

        /* -- 9: move, body response ----------------------------------- */
        if let Some(other) = collide {
            if tr.end == self.body.position {
                tr.end = self.separate(other, state, world);
            }
        }
        self.body.position = tr.end;
        if let Some(other) = collide {
            if self.body.alive() {
                self.exchange(other, tr.side, state);
            }
        }

        /* -- 10: left the world --------------------------------------- */
        let p = self.body.position;
        if world.outside(p.x.div_euclid(TILE), p.y.div_euclid(TILE)) > OUTSIDE_DEATH_DISTANCE {
            let health = self.body.health;
            state.hurt_local(&mut self.body, self.kind.look(), None, health);
        }

        Fate::Keep
    }

    /// Primary move plus the partial-progress and un-stick retries.
    fn sweep(&self, state: &SimState, world: &TileWorld, me: Actor) -> (Trace, Option<UnitId>) {
        let b = &self.body;
        let delta = b.velocity / TICKS_PER_SECOND;
        let cast = |d: Coord, world_only: bool| {
            let mut tr = state.trace(world, b.position, b.position + d, b.size, world_only);
            let hit = tr.collide_func(|o| me.blocks(state, o));
            (tr, hit)
        };

        let (mut tr, mut collide) = cast(delta, false);
        if tr.end != b.position || !b.alive() {
            return (tr, collide);
        }

        if !b.velocity.is_zero() {
            // blocked at contact: try each axis on its own
            for axis in [Coord::new(delta.x, 0), Coord::new(0, delta.y)] {
                let (t2, c2) = cast(axis, false);
                if t2.end != tr.end {
                    tr = t2;
                    collide = c2;
                    break;
                }
            }
        } else if collide.is_none() && tr.hit_world {
            // at rest inside geometry: look one body-height up for room
            let up = b.position - Coord::new(0, b.size.y);
            let room = state.trace(world, up, up, b.size, true);
            if !room.hit_world {
                tr.end = state.trace(world, up, b.position, b.size, true).end;
            }
        }
        (tr, collide)
    }

    /// Plain tiles stop and hurt, bounce pads fling, checkpoints do nothing.
    fn hit_world(&mut self, tr: &Trace, state: &mut SimState) {
        match tr.special {
            SpecialTile::None => {
                let v = &mut self.body.velocity;
                let speed = match tr.side {
                    Side::Left => std::mem::take(&mut v.x),
                    Side::Right => -std::mem::take(&mut v.x),
                    Side::Top => std::mem::take(&mut v.y),
                    Side::Bottom => -std::mem::take(&mut v.y),
                };
                let damage = speed * self.mass(state) / DAMAGE_FACTOR;
                state.hurt_local(&mut self.body, self.kind.look(), None, damage);
            }
            SpecialTile::Bounce => {
                let v = &mut self.body.velocity;
                match tr.side {
                    Side::Left => v.x = -BOUNCE_IMPULSE,
                    Side::Right => v.x = BOUNCE_IMPULSE,
                    Side::Top => v.y = -BOUNCE_IMPULSE,
                    Side::Bottom => v.y = BOUNCE_IMPULSE,
                }
            }
            SpecialTile::Checkpoint => {}
        }
    }

    /// Overlapping another body: nudge apart along the separation vector.
    fn separate(&mut self, other: UnitId, state: &mut SimState, world: &TileWorld) -> Coord {
        let from = state.unit(other).map_or(self.body.position, |o| o.body.position);
        let mut delta = (self.body.position - from) / TICKS_PER_SECOND;
        if delta.is_zero() {
            delta.x += state.rng.below(PIXEL_SIZE * 2 + 1) - PIXEL_SIZE;
        }
        let b = &self.body;
        state
            .trace(world, b.position, b.position + delta, b.size, true)
            .end
    }

    /// Mass-weighted one-third / two-thirds velocity exchange on impact.
    fn exchange(&mut self, other: UnitId, side: Side, state: &mut SimState) {
        let Some(o) = state.unit(other) else { return };
        let other_is_man = o.kind.is_man();
        let mut ov = o.body.velocity;

        if self.kind.is_man() != other_is_man {
            self.body.velocity = self.body.velocity * 2;
            ov = ov * 2;
        }

        let m1 = self.mass(state);
        let m2 = state.mass_of(other);
        let h = side.horizontal();
        let (v1, v2) = weighted_swap(*axis(&mut self.body.velocity, h), *axis(&mut ov, h), m1, m2);
        *axis(&mut self.body.velocity, h) = v1;
        *axis(&mut ov, h) = v2;
        if let Some(o) = state.unit_mut(other) {
            o.body.velocity = ov;
        }

        let rel = (v1 - v2).abs();
        state.hurt_local(&mut self.body, self.kind.look(), None, rel * m2 / DAMAGE_FACTOR);
        state.hurt(other, None, rel * m1 / DAMAGE_FACTOR);
    }
}

fn axis(c: &mut Coord, horizontal: bool) -> &mut i64 {
    if horizontal { &mut c.x } else { &mut c.y }
}

/// Exchange velocities `v1`, `v2` between bodies of mass `m1`, `m2`.
///
/// Masses below 1 count as 1.
pub(crate) fn weighted_swap(v1: i64, v2: i64, m1: i64, m2: i64) -> (i64, i64) {
    let (m1, m2) = (m1.max(1), m2.max(1));
    let (vm1, vm2) = (v1 * m1, v2 * m2);
    ((vm1 / 3 + vm2 * 2 / 3) / m1, (vm1 * 2 / 3 + vm2 / 3) / m2)
}
