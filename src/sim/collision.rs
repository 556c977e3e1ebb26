//! Swept-AABB traces against the tile grid and the live bodies.
//!
//! ✔ slab test per axis with ±∞ for a motionless axis
//! ✔ earliest solid tile wins, specials win ties
//! ✔ bodies collected nearest-first for the caller to filter

use smallvec::SmallVec;

use super::components::UnitId;
use super::state::SimState;
use crate::defs::TILE;
use crate::world::{Coord, SpecialTile, TileWorld};

/// Face of the obstacle that was hit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    #[inline]
    pub fn horizontal(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }
}

/// A body the sweep ran into.
#[derive(Clone, Copy, Debug)]
pub struct TraceUnit {
    pub id: UnitId,
    /// Squared length of the move up to contact.
    pub dist: i64,
    pub end: Coord,
    pub side: Side,
}

/// Result of one sweep.
#[derive(Clone, Debug)]
pub struct Trace {
    /// Where the box stops: world contact, or the requested end.
    pub end: Coord,
    /// Candidate bodies, nearest first, not yet filtered.
    pub units: SmallVec<[TraceUnit; 4]>,
    pub hit_world: bool,
    pub special: SpecialTile,
    pub side: Side,
    world_dist: i64,
}

impl Trace {
    /// Stop at the nearest body not in `ignore`.
    pub fn collide(&mut self, ignore: &[UnitId]) -> Option<UnitId> {
        self.collide_func(|id| !ignore.contains(&id))
    }

    /// Stop at the nearest body accepted by `accept`.
    ///
    /// Rewrites `end`/`side` on success. A body strictly nearer than the
    /// world contact also clears `hit_world`.
    pub fn collide_func(&mut self, mut accept: impl FnMut(UnitId) -> bool) -> Option<UnitId> {
        let hit = self.units.iter().find(|u| accept(u.id)).copied()?;
        self.end = hit.end;
        self.side = hit.side;
        if hit.dist < self.world_dist {
            self.hit_world = false;
        }
        Some(hit.id)
    }
}

/// Contact of a moving box with a static one.
struct Contact {
    dist: i64,
    offset: Coord,
    side: Side,
}

/// Sweep box `[min, max]` by `delta` against `[mins, maxs]`.
fn sweep(min: Coord, max: Coord, delta: Coord, mins: Coord, maxs: Coord) -> Option<Contact> {
    /* ----- separating-axis rejection on the swept extent -------------- */
    if delta.x >= 0 && (min.x >= maxs.x || max.x + delta.x <= mins.x) {
        return None;
    }
    if delta.x <= 0 && (min.x + delta.x >= maxs.x || max.x <= mins.x) {
        return None;
    }
    if delta.y >= 0 && (min.y >= maxs.y || max.y + delta.y <= mins.y) {
        return None;
    }
    if delta.y <= 0 && (min.y + delta.y >= maxs.y || max.y <= mins.y) {
        return None;
    }

    /* ----- slab times -------------------------------------------------- */
    let slab = |lo: i64, hi: i64, slo: i64, shi: i64, d: i64| -> (f64, f64) {
        if d > 0 {
            ((slo - hi) as f64 / d as f64, (shi - lo) as f64 / d as f64)
        } else if d < 0 {
            ((shi - lo) as f64 / d as f64, (slo - hi) as f64 / d as f64)
        } else {
            (f64::NEG_INFINITY, f64::INFINITY)
        }
    };
    let (x_enter, x_exit) = slab(min.x, max.x, mins.x, maxs.x, delta.x);
    let (y_enter, y_exit) = slab(min.y, max.y, mins.y, maxs.y, delta.y);

    let enter = x_enter.max(y_enter);
    let exit = x_exit.min(y_exit);
    if exit < 0.0 || enter > 1.0 || enter > exit {
        return None;
    }

    let side = if x_enter > y_enter {
        if delta.x > 0 { Side::Left } else { Side::Right }
    } else if delta.y > 0 {
        Side::Top
    } else {
        Side::Bottom
    };

    if enter < 0.0 {
        // already overlapping: contact at the start
        return Some(Contact {
            dist: 0,
            offset: Coord::ZERO,
            side,
        });
    }
    let offset = Coord::new(
        (enter * delta.x as f64) as i64,
        (enter * delta.y as f64) as i64,
    );
    Some(Contact {
        dist: offset.length_squared(),
        offset,
        side,
    })
}

impl SimState {
    /// Sweep a box of size `hull` from `start` to `end`.
    ///
    /// Solid tiles decide `end`; live, unheld bodies at or before that
    /// point are returned in `units` for the caller to accept or skip.
    pub fn trace(
        &self,
        world: &TileWorld,
        start: Coord,
        end: Coord,
        hull: Coord,
        world_only: bool,
    ) -> Trace {
        let (hmin, hmax) = hull.hull();
        let min = hmin + start;
        let max = hmax + start;
        let delta = end - start;

        let mut tr = Trace {
            end,
            units: SmallVec::new(),
            hit_world: false,
            special: SpecialTile::None,
            side: Side::default(),
            world_dist: i64::MAX,
        };

        /* ----- tiles under the swept box ------------------------------ */
        let mut lo = min;
        let mut hi = max;
        if delta.x < 0 {
            lo.x += delta.x;
        } else {
            hi.x += delta.x;
        }
        if delta.y < 0 {
            lo.y += delta.y;
        } else {
            hi.y += delta.y;
        }
        let lo = lo.floor(TILE);
        let hi = hi.floor(TILE) + Coord::new(TILE, TILE);

        let mut x = lo.x;
        while x <= hi.x {
            let mut y = lo.y;
            while y <= hi.y {
                let (tx, ty) = (x / TILE, y / TILE);
                if world.solid(tx, ty) {
                    let tile_max = Coord::new(x + TILE, y + TILE);
                    if let Some(c) = sweep(min, max, delta, Coord::new(x, y), tile_max) {
                        if c.dist < tr.world_dist
                            || (c.dist == tr.world_dist && tr.special == SpecialTile::None)
                        {
                            tr.world_dist = c.dist;
                            tr.hit_world = true;
                            tr.end = start + c.offset;
                            tr.special = world.special(tx, ty);
                            tr.side = c.side;
                        }
                    }
                }
                y += TILE;
            }
            x += TILE;
        }

        /* ----- bodies --------------------------------------------------- */
        if !world_only {
            for (id, u) in self.bodies() {
                if !u.body.alive() || u.body.held_by.is_some() {
                    continue;
                }
                let (mins, maxs) = u.body.bounds();
                if let Some(c) = sweep(min, max, delta, mins, maxs) {
                    if c.dist <= tr.world_dist {
                        tr.units.push(TraceUnit {
                            id,
                            dist: c.dist,
                            end: start + c.offset,
                            side: c.side,
                        });
                    }
                }
            }
            // stable: equal distances keep update order
            tr.units.sort_by_key(|u| u.dist);
        }
        tr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::{ManKind, PIXEL_SIZE, TERMINAL_VELOCITY, TICKS_PER_SECOND};
    use crate::world::{Tile, levels};

    const BOX: Coord = Coord::new(TILE, TILE);

    /// State with every man parked far outside the test area.
    fn empty_state(world: &TileWorld) -> SimState {
        let mut state = SimState::new(world, 3);
        for m in state.mans.iter_mut() {
            m.body.health = 0;
        }
        state
    }

    #[test]
    fn stops_on_floor_top() {
        let world = levels::arena(20, 10);
        let state = empty_state(&world);
        let start = Coord::new(5 * TILE, 2 * TILE);
        let tr = state.trace(&world, start, start + Coord::new(0, 16 * TILE), BOX, false);
        assert!(tr.hit_world);
        assert_eq!(tr.side, Side::Top);
        assert_eq!(tr.end, Coord::new(5 * TILE, 9 * TILE));
    }

    #[test]
    fn resting_box_is_not_blocked_sideways() {
        let world = levels::arena(20, 10);
        let state = empty_state(&world);
        let start = Coord::new(5 * TILE, 9 * TILE);
        let end = start + Coord::new(2 * TILE, 0);
        let tr = state.trace(&world, start, end, BOX, false);
        assert!(!tr.hit_world);
        assert_eq!(tr.end, end);

        let probe = state.trace(&world, start, start + Coord::new(0, 1), BOX, false);
        assert_eq!(probe.end, start);
        let up = state.trace(&world, start, start - Coord::new(0, TILE), BOX, false);
        assert!(!up.hit_world);
    }

    #[test]
    fn overlap_reports_contact_at_start() {
        let world = levels::arena(20, 10);
        let state = empty_state(&world);
        let start = Coord::new(5 * TILE, 9 * TILE + 10);
        let tr = state.trace(&world, start, start + Coord::new(300, -300), BOX, false);
        assert!(tr.hit_world);
        assert_eq!(tr.end, start);
    }

    #[test]
    fn specials_win_ties() {
        let mut world = levels::arena(20, 10);
        *world.tile_mut(5, 9).unwrap() = Tile {
            special: SpecialTile::Bounce,
            ..*world.tile(5, 9)
        };
        let state = empty_state(&world);
        // box straddles tiles 4 and 5, both hit at the same distance
        let start = Coord::new(5 * TILE, 5 * TILE);
        let tr = state.trace(&world, start, start + Coord::new(0, 10 * TILE), BOX, true);
        assert_eq!(tr.special, SpecialTile::Bounce);
    }

    #[test]
    fn no_tunneling_at_terminal_velocity() {
        let mut world = levels::arena(200, 10);
        *world.tile_mut(100, 5).unwrap() = Tile {
            solid: true,
            ..Tile::default()
        };
        let state = empty_state(&world);
        let step = TERMINAL_VELOCITY / TICKS_PER_SECOND;
        let hull = Coord::new(PIXEL_SIZE, PIXEL_SIZE);
        let y = 5 * TILE + TILE / 2;
        let mut x = 90 * TILE;
        for _ in 0..200 {
            let start = Coord::new(x, y);
            let tr = state.trace(&world, start, start + Coord::new(step, 0), hull, true);
            assert!(tr.end.x + hull.x / 2 <= 100 * TILE, "passed the wall at {}", tr.end.x);
            if tr.hit_world {
                assert_eq!(tr.side, Side::Left);
                return;
            }
            x = tr.end.x;
        }
        panic!("never reached the wall");
    }

    #[test]
    fn bodies_sorted_nearest_first() {
        let world = levels::arena(40, 10);
        let mut state = empty_state(&world);
        let far = state.spawn_grub(Coord::new(20 * TILE, 9 * TILE));
        let near = state.spawn_grub(Coord::new(10 * TILE, 9 * TILE));
        let start = Coord::new(3 * TILE, 9 * TILE);
        let mut tr = state.trace(&world, start, start + Coord::new(30 * TILE, 0), BOX, false);
        assert_eq!(tr.units.len(), 2);
        assert_eq!(tr.units[0].id, near);
        assert_eq!(tr.collide(&[near]), Some(far));
        assert_eq!(tr.side, Side::Left);
        assert!(!tr.hit_world);
    }

    #[test]
    fn held_and_dead_bodies_are_invisible() {
        let world = levels::arena(40, 10);
        let mut state = empty_state(&world);
        let grub = state.spawn_grub(Coord::new(10 * TILE, 9 * TILE));
        state.unit_mut(grub).unwrap().body.held_by = Some(UnitId::Man(ManKind::Vacuum));
        let start = Coord::new(3 * TILE, 9 * TILE);
        let tr = state.trace(&world, start, start + Coord::new(30 * TILE, 0), BOX, false);
        assert!(tr.units.is_empty());
    }
}
