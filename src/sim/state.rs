//! The authoritative simulation state and its per-tick driver.

use bincode::{Decode, Encode};
use std::collections::BTreeMap;

use super::components::{Body, Fate, Floater, Look, Unit, UnitId, UnitKind};
use super::input::Input;
use super::man::Man;
use super::mob::Grub;
use super::random::SeededRandom;
use crate::defs::{GRUB_HEALTH, GRUB_SIZE, MAN_COUNT, ManKind, Rgba, SPAWN_ATTEMPTS};
use crate::world::{Coord, TileWorld};

/// Everything that changes from tick to tick. The world is passed in.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct SimState {
    pub tick: u64,
    pub mans: [Unit; MAN_COUNT],
    pub units: BTreeMap<u64, Unit>,
    pub next_unit: u64,
    pub floaters: Vec<Floater>,
    pub spawn_point: Coord,
    pub rng: SeededRandom,
}

impl SimState {
    /// Fresh state: every man alive at full health, placed in slot order.
    pub fn new(world: &TileWorld, seed: u32) -> Self {
        let spawn_point = world.spawn_point();
        let mut state = Self {
            tick: 0,
            mans: ManKind::ALL.map(|kind| Man::spawn(kind, spawn_point)),
            units: BTreeMap::new(),
            next_unit: 1,
            floaters: Vec::new(),
            spawn_point,
            rng: SeededRandom::new(seed),
        };
        for kind in ManKind::ALL {
            let size = state.mans[kind.index()].body.size;
            let pos = state.find_spawn_position(world, size);
            let body = &mut state.mans[kind.index()].body;
            body.position = pos;
            body.health = kind.info().max_health;
        }
        state
    }

    /* ---------------------------------------------------------------- */
    /* lookup                                                            */
    /* ---------------------------------------------------------------- */

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        match id {
            UnitId::Man(kind) => Some(&self.mans[kind.index()]),
            UnitId::Unit(key) => self.units.get(&key),
        }
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        match id {
            UnitId::Man(kind) => Some(&mut self.mans[kind.index()]),
            UnitId::Unit(key) => self.units.get_mut(&key),
        }
    }

    #[inline]
    pub fn man(&self, kind: ManKind) -> &Unit {
        &self.mans[kind.index()]
    }

    /// Update order: player slots, then dynamic units by ascending key.
    pub fn ids(&self) -> Vec<UnitId> {
        self.bodies().map(|(id, _)| id).collect()
    }

    /// Every unit in update order, borrowed.
    pub fn bodies(&self) -> impl Iterator<Item = (UnitId, &Unit)> {
        ManKind::ALL
            .into_iter()
            .zip(&self.mans)
            .map(|(k, u)| (UnitId::Man(k), u))
            .chain(self.units.iter().map(|(&k, u)| (UnitId::Unit(k), u)))
    }

    /// Mass of a body; missing bodies weigh 1 so exchanges never divide by 0.
    pub fn mass_of(&self, id: UnitId) -> i64 {
        self.unit(id).map_or(1, |u| u.mass(self))
    }

    /* ---------------------------------------------------------------- */
    /* dynamic bodies                                                    */
    /* ---------------------------------------------------------------- */

    pub fn spawn_unit(&mut self, unit: Unit) -> UnitId {
        let key = self.next_unit;
        self.next_unit += 1;
        self.units.insert(key, unit);
        tracing::debug!(key, tick = self.tick, "unit spawned");
        UnitId::Unit(key)
    }

    pub fn spawn_grub(&mut self, position: Coord) -> UnitId {
        self.spawn_unit(Unit {
            body: Body {
                position,
                size: Coord::new(GRUB_SIZE, GRUB_SIZE),
                health: GRUB_HEALTH,
                ..Body::default()
            },
            kind: UnitKind::Grub(Grub::default()),
        })
    }

    /// Remove a dynamic unit. Player slots are permanent.
    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        match id {
            UnitId::Man(_) => None,
            UnitId::Unit(key) => {
                tracing::debug!(key, tick = self.tick, "unit removed");
                self.units.remove(&key)
            }
        }
    }

    /* ---------------------------------------------------------------- */
    /* damage                                                            */
    /* ---------------------------------------------------------------- */

    /// Damage a body stored in the state.
    pub fn hurt(&mut self, id: UnitId, by: Option<Rgba>, amount: i64) {
        let tick = self.tick;
        let unit = match id {
            UnitId::Man(kind) => &mut self.mans[kind.index()],
            UnitId::Unit(key) => match self.units.get_mut(&key) {
                Some(u) => u,
                None => return,
            },
        };
        let look = unit.kind.look();
        apply_damage(&mut unit.body, look, by, amount, tick, &mut self.floaters, &mut self.rng);
    }

    /// Damage a body currently checked out of the state for its update.
    pub(crate) fn hurt_local(&mut self, body: &mut Body, look: Look, by: Option<Rgba>, amount: i64) {
        apply_damage(body, look, by, amount, self.tick, &mut self.floaters, &mut self.rng);
    }

    /* ---------------------------------------------------------------- */
    /* spawning                                                          */
    /* ---------------------------------------------------------------- */

    /// Random free spot near the spawn point, settled onto the ground.
    pub fn find_spawn_position(&mut self, world: &TileWorld, hull: Coord) -> Coord {
        let fall = Coord::new(0, hull.y * 10);
        for _ in 0..SPAWN_ATTEMPTS {
            let mut pos = self.spawn_point;
            pos.x += self.rng.below(hull.x * 10 + 1) - hull.x * 5;
            pos.y += self.rng.below(hull.y * 10 + 1) - hull.y * 5;

            let tr = self.trace(world, self.spawn_point, pos, hull, false);
            if tr.units.is_empty() {
                if tr.end != self.spawn_point && tr.hit_world {
                    return tr.end;
                }
                let pos = tr.end;
                let mut drop = self.trace(world, pos, pos + fall, hull, false);
                drop.collide(&[]);
                if drop.hit_world && drop.end != pos {
                    return drop.end;
                }
            } else if tr.hit_world {
                let lift = self.trace(world, tr.end, tr.end - fall, hull, true);
                let pos = lift.end;
                let mut drop = self.trace(world, pos, pos + fall, hull, false);
                drop.collide(&[]);
                if drop.end != pos {
                    return drop.end;
                }
            }
        }
        self.spawn_point
    }

    /* ---------------------------------------------------------------- */
    /* tick                                                              */
    /* ---------------------------------------------------------------- */

    /// Advance one tick. `None` input means "no packet": buttons released.
    pub fn update(&mut self, world: &TileWorld, input: &[Option<Input>; MAN_COUNT]) {
        self.tick += 1;

        for (unit, packet) in self.mans.iter_mut().zip(input) {
            if let Some(man) = unit.as_man_mut() {
                man.state.receive(packet.as_ref());
            }
        }

        self.release_orphans();

        for id in self.ids() {
            let Some(unit) = self.unit(id) else {
                continue; // removed earlier this tick
            };
            if unit.body.held_by.is_some() {
                continue;
            }
            let mut unit = unit.clone();
            match unit.update(self, world, id) {
                Fate::Keep => {
                    if let Some(slot) = self.unit_mut(id) {
                        *slot = unit;
                    }
                }
                Fate::Remove => {
                    self.remove_unit(id);
                }
            }
        }

        let now = self.tick;
        self.floaters.retain(|f| f.live(now));
    }

    /// Drop `held_by` links the holder no longer claims.
    fn release_orphans(&mut self) {
        let stale: Vec<UnitId> = self
            .ids()
            .into_iter()
            .filter(|&id| {
                let Some(holder) = self.unit(id).and_then(|u| u.body.held_by) else {
                    return false;
                };
                let claimed = self
                    .unit(holder)
                    .and_then(Unit::as_man)
                    .is_some_and(|m| m.holding() == Some(id));
                !claimed
            })
            .collect();
        for id in stale {
            if let Some(u) = self.unit_mut(id) {
                u.body.held_by = None;
            }
        }
    }
}

/// Shared damage path: clamp to remaining health, spawn a floater.
fn apply_damage(
    body: &mut Body,
    look: Look,
    by: Option<Rgba>,
    amount: i64,
    tick: u64,
    floaters: &mut Vec<Floater>,
    rng: &mut SeededRandom,
) {
    if amount <= 0 || body.health <= 0 {
        return;
    }
    if look.show_damage {
        let x = body.position.x - body.size.x / 2 + rng.below(body.size.x);
        let y = body.position.y - rng.below(body.size.y);
        floaters.push(Floater {
            text: comma(amount),
            fg: look.color,
            bg: by.unwrap_or(Rgba::NEUTRAL),
            x,
            y,
            tick,
        });
    }
    body.health -= amount.min(body.health);
}

/// `1234567` -> `"1,234,567"`.
pub(crate) fn comma(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::{MAN_HEALTH, MAN_LIVES, TILE};
    use crate::world::levels;

    #[test]
    fn comma_groups_thousands() {
        assert_eq!(comma(7), "7");
        assert_eq!(comma(1000), "1,000");
        assert_eq!(comma(1234567), "1,234,567");
        assert_eq!(comma(-45000), "-45,000");
    }

    #[test]
    fn new_state_places_every_man_on_the_floor() {
        let world = levels::proving_ground();
        let state = SimState::new(&world, 7);
        for kind in ManKind::ALL {
            let u = state.man(kind);
            assert_eq!(u.body.health, MAN_HEALTH);
            assert_eq!(u.as_man().map(|m| m.state.lives), Some(MAN_LIVES));
            assert!(u.body.position.y <= 20 * TILE);
        }
        // no two men overlap
        for a in 0..MAN_COUNT {
            for b in a + 1..MAN_COUNT {
                let (amin, amax) = state.mans[a].body.bounds();
                let (bmin, bmax) = state.mans[b].body.bounds();
                let overlap = amin.x < bmax.x && bmin.x < amax.x && amin.y < bmax.y && bmin.y < amax.y;
                assert!(!overlap, "men {a} and {b} overlap");
            }
        }
    }

    #[test]
    fn hurt_clamps_and_records_floater() {
        let world = levels::proving_ground();
        let mut state = SimState::new(&world, 1);
        let id = UnitId::Man(ManKind::Normal);
        state.hurt(id, Some(Rgba::WHITE), 1_500);
        assert_eq!(state.man(ManKind::Normal).body.health, MAN_HEALTH - 1_500);
        let f = state.floaters.last().unwrap();
        assert_eq!(f.text, "1,500");
        assert_eq!(f.bg, Rgba::WHITE);
        assert_eq!(f.fg, ManKind::Normal.info().color);

        state.hurt(id, None, MAN_HEALTH * 3);
        assert_eq!(state.man(ManKind::Normal).body.health, 0);
        let count = state.floaters.len();
        state.hurt(id, None, 10);
        assert_eq!(state.floaters.len(), count, "dead bodies take no damage");
    }

    #[test]
    fn unit_ids_are_never_reused() {
        let world = levels::proving_ground();
        let mut state = SimState::new(&world, 1);
        let a = state.spawn_grub(Coord::new(20 * TILE, 10 * TILE));
        state.remove_unit(a);
        let b = state.spawn_grub(Coord::new(20 * TILE, 10 * TILE));
        assert_ne!(a, b);
        assert!(state.unit(a).is_none());
        assert_eq!(state.ids().len(), MAN_COUNT + 1);
    }

    #[test]
    fn bodies_follow_update_order() {
        let world = levels::proving_ground();
        let mut state = SimState::new(&world, 1);
        let a = state.spawn_grub(Coord::new(20 * TILE, 10 * TILE));
        let b = state.spawn_grub(Coord::new(30 * TILE, 10 * TILE));
        let order: Vec<UnitId> = state.bodies().map(|(id, _)| id).collect();
        assert_eq!(order, state.ids());
        assert_eq!(&order[MAN_COUNT..], &[a, b]);
        for (id, u) in state.bodies() {
            assert!(std::ptr::eq(u, state.unit(id).unwrap()));
        }
    }

    #[test]
    fn floaters_expire() {
        let world = levels::proving_ground();
        let mut state = SimState::new(&world, 1);
        state.hurt(UnitId::Man(ManKind::Whip), None, 100);
        let idle = [None; MAN_COUNT];
        for _ in 0..crate::defs::FLOATER_FADE_END {
            state.update(&world, &idle);
        }
        assert!(!state.floaters.is_empty());
        state.update(&world, &idle);
        state.update(&world, &idle);
        assert!(state.floaters.iter().all(|f| f.tick > 0));
    }
}
