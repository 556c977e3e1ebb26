//! Player characters: shared movement plus the four abilities.

use bincode::{Decode, Encode};

use super::components::{Actor, Body, Class, Floater, Look, Unit, UnitId, UnitKind};
use super::input::Input;
use super::mob::Lemon;
use super::movement::on_ground;
use super::state::SimState;
use crate::defs::{
    Buttons, DENSITY_MAX, DENSITY_MIN, DENSITY_STEP, GRAVITY, LEMON_SIZE, LEMON_SPEED, LEMON_TIME,
    MAN_COUNT, MAN_LIVES, ManKind, PIXEL_SIZE, RESPAWN_TIME, Rgba, TILE, VACUUM_DISTANCE,
    VACUUM_HURT, VACUUM_SPEED, VACUUM_SUCK, WHIP_DAMAGE_MAX, WHIP_DAMAGE_MIN, WHIP_DISTANCE,
    WHIP_SPEED_MAX, WHIP_SPEED_MIN, WHIP_TIME_MAX, WHIP_TIME_MIN,
};
use crate::world::{Coord, SpecialTile, TileWorld};

const CHECKPOINT_TEXT: [&str; MAN_COUNT] = [
    "CHECKPOINT 25%",
    "CHECKPOINT 50%",
    "CHECKPOINT 75%",
    "CHECKPOINT UNLOCKED",
];

/// Player bookkeeping shared by every character.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct ManState {
    pub kind: ManKind,
    /// Aim point in world units, refreshed every live tick.
    pub target: Coord,
    pub crouching: bool,
    pub input: Input,
    /// Tick at which a dead man may come back; 0 while alive.
    pub respawn: u64,
    pub lives: i64,
    pub checkpoint: Coord,
    /// Client tick echoed from the last packet.
    pub ping: u64,
}

impl ManState {
    /// Take this tick's packet; a missing packet releases every button.
    pub fn receive(&mut self, packet: Option<&Input>) {
        self.input = match packet {
            Some(p) => *p,
            None => self.input.released(),
        };
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct Whip {
    pub start: u64,
    pub stop: u64,
    /// Where the last crack ended, while it is still drawn.
    pub end: Option<Coord>,
    pub tether: Option<Coord>,
    pub pull: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct Density {
    /// Extra gravity on top of the global one.
    pub gravity: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct Vacuum {
    pub held: Option<UnitId>,
    pub held_since: u64,
    pub last_lemon: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub enum Ability {
    Whip(Whip),
    Density(Density),
    Vacuum(Vacuum),
    Normal,
}

impl Ability {
    pub fn new(kind: ManKind) -> Self {
        match kind {
            ManKind::Whip => Ability::Whip(Whip::default()),
            ManKind::Density => Ability::Density(Density::default()),
            ManKind::Vacuum => Ability::Vacuum(Vacuum::default()),
            ManKind::Normal => Ability::Normal,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct Man {
    pub state: ManState,
    pub ability: Ability,
}

/* ================================================================= */
/*  Construction & queries                                           */
/* ================================================================= */

impl Man {
    /// A dead, standing man at `position`; the caller brings him to life.
    pub fn spawn(kind: ManKind, position: Coord) -> Unit {
        let man = Man {
            state: ManState {
                kind,
                target: position,
                crouching: false,
                input: Input::default(),
                respawn: 0,
                lives: MAN_LIVES,
                checkpoint: position,
                ping: 0,
            },
            ability: Ability::new(kind),
        };
        Unit {
            body: Body {
                position,
                size: man.size(),
                ..Body::default()
            },
            kind: UnitKind::Man(man),
        }
    }

    pub fn size(&self) -> Coord {
        let info = self.state.kind.info();
        if self.state.crouching {
            info.crouch_size
        } else {
            info.size
        }
    }

    pub fn mass(&self, state: &SimState) -> i64 {
        let info = self.state.kind.info();
        let m = if self.state.crouching {
            info.crouch_mass
        } else {
            info.mass
        };
        match &self.ability {
            Ability::Density(d) => m + m * d.gravity / GRAVITY,
            Ability::Vacuum(Vacuum { held: Some(h), .. }) => m + state.mass_of(*h),
            _ => m,
        }
    }

    /// Body currently held by a vacuum.
    pub fn holding(&self) -> Option<UnitId> {
        match &self.ability {
            Ability::Vacuum(v) => v.held,
            _ => None,
        }
    }

    fn look(&self) -> Look {
        Look {
            color: self.state.kind.info().color,
            show_damage: true,
        }
    }

    /* ============================================================= */
    /*  Live update                                                  */
    /* ============================================================= */

    pub(crate) fn update(
        &mut self,
        body: &mut Body,
        state: &mut SimState,
        world: &TileWorld,
        me: Actor,
    ) {
        let grounded = self.control(body, state, world, me);
        let look = self.look();
        let ms = &self.state;
        match &mut self.ability {
            Ability::Whip(w) => w.update(ms, body, state, world, me, grounded),
            Ability::Density(d) => d.update(ms, body),
            Ability::Vacuum(v) => v.update(ms, look, body, state, world, me),
            Ability::Normal => {}
        }
    }

    /// Walking, crouching, jumping and aim. Returns whether grounded.
    fn control(&mut self, body: &mut Body, state: &SimState, world: &TileWorld, me: Actor) -> bool {
        let info = self.state.kind.info();
        let input = self.state.input;
        self.state.ping = input.tick;

        let (grounded, _) = on_ground(body, state, world, me);

        if input.held(Buttons::KEY_DOWN) {
            // feet stay planted: position is the bottom of the box
            self.state.crouching = true;
        } else if self.state.crouching {
            let rise = Coord::new(0, info.size.y - info.crouch_size.y);
            let mut tr = state.trace(world, body.position, body.position - rise, body.size, false);
            if tr.collide_func(|o| me.blocks(state, o)).is_none() && !tr.hit_world {
                self.state.crouching = false;
            }
        }
        body.size = self.size();

        let speed = match (grounded, self.state.crouching) {
            (true, false) => info.move_speed,
            (true, true) => info.crouch_speed,
            (false, false) => info.air_speed,
            (false, true) => info.air_crouch_speed,
        };
        body.acceleration.x = match (input.held(Buttons::KEY_LEFT), input.held(Buttons::KEY_RIGHT)) {
            (true, false) => -speed,
            (false, true) => speed,
            _ => 0,
        };
        body.acceleration.y = if grounded && body.velocity.y == 0 && input.held(Buttons::KEY_UP) {
            -info.jump_speed
        } else {
            0
        };

        self.state.target = body.position + Coord::new(input.x * PIXEL_SIZE, input.y * PIXEL_SIZE);

        let g = if self.state.crouching {
            info.crouch_gravity
        } else {
            info.gravity
        };
        body.gravity = g - GRAVITY;
        grounded
    }

    /* ============================================================= */
    /*  Dead update & respawn                                        */
    /* ============================================================= */

    pub(crate) fn update_dead(
        &mut self,
        body: &mut Body,
        state: &mut SimState,
        world: &TileWorld,
        me: Actor,
    ) {
        let tick = state.tick;
        self.state.ping = self.state.input.tick;
        if self.state.respawn == 0 {
            self.state.respawn = tick + RESPAWN_TIME;
        }

        match &mut self.ability {
            Ability::Whip(w) => *w = Whip::default(),
            Ability::Vacuum(v) => v.drop_held(body, state),
            _ => {}
        }

        if self.state.respawn > tick {
            return;
        }
        if self.state.lives > 0 {
            self.respawn(body, state, world);
        } else {
            self.comeback(body, state, world, me);
        }
    }

    /// Everyone is out and waiting: the men with the most lives left return.
    fn comeback(&mut self, body: &mut Body, state: &mut SimState, world: &TileWorld, me: Actor) {
        let tick = state.tick;
        let mut max_lives = self.state.lives;
        for kind in ManKind::ALL {
            if UnitId::Man(kind) == me.id {
                continue;
            }
            let Some(m) = state.man(kind).as_man() else { continue };
            if m.state.respawn == 0 || m.state.respawn > tick {
                return;
            }
            max_lives = max_lives.max(m.state.lives);
        }

        tracing::info!(tick, max_lives, "all men out, comeback round");
        for kind in ManKind::ALL {
            let id = UnitId::Man(kind);
            if id == me.id {
                if self.state.lives == max_lives {
                    self.respawn(body, state, world);
                }
                continue;
            }
            let mut other = state.man(kind).clone();
            let Unit { body: ob, kind: ok } = &mut other;
            if let UnitKind::Man(m) = ok {
                if m.state.lives == max_lives {
                    m.respawn(ob, state, world);
                    if let Some(slot) = state.unit_mut(id) {
                        *slot = other;
                    }
                }
            }
        }
    }

    pub(crate) fn respawn(&mut self, body: &mut Body, state: &mut SimState, world: &TileWorld) {
        let ms = &mut self.state;
        ms.lives -= 1;
        ms.crouching = false;
        ms.respawn = 0;
        body.health = ms.kind.info().max_health;
        body.size = self.size();
        body.acceleration = Coord::ZERO;
        body.velocity = Coord::ZERO;
        body.position = state.find_spawn_position(world, body.size);
        tracing::debug!(
            man = self.state.kind.info().name,
            lives = self.state.lives,
            tick = state.tick,
            "respawned"
        );
    }

    /// Standing on a checkpoint tile: claim the nearest marker.
    pub(crate) fn touch_checkpoint(&mut self, body: &Body, state: &mut SimState, world: &TileWorld) {
        let base = body.position.floor(TILE);
        let (tx, ty) = (base.x.div_euclid(TILE), base.y.div_euclid(TILE));
        let found = (-3..=3)
            .flat_map(|x| (-3..=3).map(move |y| (x, y)))
            .find(|&(x, y)| world.special(tx + x, ty + y) == SpecialTile::Checkpoint);
        let Some((x, y)) = found else { return };
        let pos = base + Coord::new(x * TILE + TILE / 2, y * TILE - TILE);

        if pos == self.state.checkpoint || pos == state.spawn_point {
            return;
        }
        let count = state
            .mans
            .iter()
            .filter_map(Unit::as_man)
            .filter(|m| m.state.checkpoint == pos)
            .count();
        self.state.checkpoint = pos;
        state.floaters.push(Floater {
            text: CHECKPOINT_TEXT[count.min(MAN_COUNT - 1)].to_owned(),
            fg: Rgba::WHITE,
            bg: self.look().color,
            x: pos.x,
            y: pos.y,
            tick: state.tick,
        });
        if count == MAN_COUNT - 1 {
            state.spawn_point = pos;
            tracing::info!(x = pos.x, y = pos.y, "checkpoint unlocked");
        }
    }
}

/* ================================================================= */
/*  Whip                                                             */
/* ================================================================= */

fn whip_lerp(min: i64, max: i64, t: u64) -> i64 {
    min + (max - min) * (t - WHIP_TIME_MIN) as i64 / (WHIP_TIME_MAX - WHIP_TIME_MIN) as i64
}

/// Outcome of releasing the whip.
struct Crack {
    velocity: Coord,
    end: Coord,
    hurt: i64,
    hit: Option<UnitId>,
    hit_world: bool,
}

impl Whip {
    fn tethered(&self, body: &Body, grounded: bool) -> Option<Coord> {
        let t = self.tether?;
        let near = (body.position - t).length_squared() < WHIP_DISTANCE * WHIP_DISTANCE;
        (near && !grounded).then_some(t)
    }

    fn update(
        &mut self,
        ms: &ManState,
        body: &mut Body,
        state: &mut SimState,
        world: &TileWorld,
        me: Actor,
        grounded: bool,
    ) {
        let tick = state.tick;
        if self.stop != 0 && (self.stop - self.start) / 10 < tick - self.stop {
            self.start = 0;
            self.stop = 0;
            self.end = None;
        }

        if let Some(t) = self.tether {
            if (body.position - t).length_squared() < WHIP_DISTANCE * WHIP_DISTANCE {
                if !grounded {
                    if body.velocity.length_squared() > TILE * TILE {
                        body.velocity = body.velocity * 19 / 20;
                    }
                    body.velocity += (t - body.position) / 100;
                    body.acceleration = body.acceleration / 4;
                }
            } else if self.stop == 0 {
                self.tether = None;
            }
        }

        let input = ms.input;
        let (m1, m2) = (input.held(Buttons::MOUSE1), input.held(Buttons::MOUSE2));
        if m1 || m2 {
            self.pull = m2;
            if self.start == 0 {
                self.start = tick;
            }
        } else if self.start != 0 && self.stop == 0 {
            self.stop = tick;
            self.start = self.start.max(tick.saturating_sub(WHIP_TIME_MAX));
            self.tether = None;

            match self.crack(ms, body, state, world, me) {
                Some(c) => {
                    self.end = Some(c.end);
                    if let Some(hit) = c.hit {
                        state.hurt(hit, Some(ms.kind.info().color), c.hurt);
                    }
                    if self.pull {
                        body.velocity -= c.velocity;
                        if c.hit.is_none() && c.hit_world {
                            self.tether = Some(c.end);
                        }
                    } else if let Some(u) = c.hit.and_then(|id| state.unit_mut(id)) {
                        u.body.velocity -= c.velocity;
                    }
                }
                None => self.end = None,
            }
        }

        if let Some(t) = self.tethered(body, grounded) {
            if body.position.y > t.y {
                body.gravity -= GRAVITY * 9 / 10;
            }
        }
    }

    /// Trace the lash; `None` when it was not held long enough.
    fn crack(
        &self,
        ms: &ManState,
        body: &Body,
        state: &SimState,
        world: &TileWorld,
        me: Actor,
    ) -> Option<Crack> {
        let t = (state.tick - self.start).min(WHIP_TIME_MAX);
        if t < WHIP_TIME_MIN {
            return None;
        }
        let start = body.position - Coord::new(0, body.size.y / 2);
        let stop = start + (ms.target - start).scale(WHIP_DISTANCE);

        let mut tr = state.trace(world, start, stop, Coord::new(1, 1), false);
        let hit = tr.collide(&[me.id]);

        let hurt = match hit.and_then(|id| state.unit(id)) {
            Some(u) if !u.kind.is_man() => whip_lerp(WHIP_DAMAGE_MIN, WHIP_DAMAGE_MAX, t),
            _ => 0,
        };
        let velocity = if start != tr.end && (hit.is_some() || tr.hit_world) {
            (start - tr.end).scale(whip_lerp(WHIP_SPEED_MIN, WHIP_SPEED_MAX, t))
        } else {
            Coord::ZERO
        };
        Some(Crack {
            velocity,
            end: tr.end,
            hurt,
            hit,
            hit_world: tr.hit_world,
        })
    }
}

/* ================================================================= */
/*  Density                                                          */
/* ================================================================= */

impl Density {
    fn update(&mut self, ms: &ManState, body: &mut Body) {
        body.acceleration.x -= body.acceleration.x * self.gravity / GRAVITY / 5;

        if ms.input.held(Buttons::MOUSE1) {
            self.gravity += DENSITY_STEP;
        }
        if ms.input.held(Buttons::MOUSE2) {
            self.gravity -= DENSITY_STEP;
        }
        self.gravity = self.gravity.clamp(DENSITY_MIN, DENSITY_MAX);
        body.gravity = self.gravity;
    }
}

/* ================================================================= */
/*  Vacuum                                                           */
/* ================================================================= */

impl Vacuum {
    fn update(
        &mut self,
        ms: &ManState,
        look: Look,
        body: &mut Body,
        state: &mut SimState,
        world: &TileWorld,
        me: Actor,
    ) {
        let tick = state.tick;
        let input = ms.input;
        let side = if ms.target.x > body.position.x { 1 } else { -1 };
        let chest = Coord::new(0, body.size.y / 2);

        if input.held(Buttons::MOUSE2) {
            self.suck(ms, body, state, world, me);
        } else if let Some(h) = self.held {
            let Some(held) = state.unit(h) else {
                self.held = None;
                self.held_since = 0;
                return;
            };
            let class = held.kind.class();
            let mut hb = held.body.clone();
            hb.position = body.position - Coord::new(0, 1);
            hb.position.x += side * (body.size.x / 2 + hb.size.x / 2 + PIXEL_SIZE);
            let speed = VACUUM_SPEED * (tick - self.held_since) as i64;
            hb.velocity = (ms.target - body.position + chest).scale(speed) + body.velocity;

            let probe = hb.position + hb.velocity.unit();
            let mut tr = state.trace(world, hb.position, probe, hb.size, false);
            let blocked = tr
                .collide_func(|o| {
                    o != me.id && state.unit(o).is_some_and(|u| class.collides_with(u.kind.class()))
                })
                .is_some();
            if !blocked && !tr.hit_world {
                hb.held_by = None;
                self.held = None;
                self.held_since = 0;
                tracing::debug!(tick, "vacuum released its load");
            }
            if let Some(u) = state.unit_mut(h) {
                u.body = hb;
            }
        } else if input.held(Buttons::MOUSE1) && tick.saturating_sub(self.last_lemon) > LEMON_TIME {
            self.throw_lemon(ms, body, state, world, side);
            self.last_lemon = tick;
        }

        if self.held_since != 0 {
            let by = self.held.and_then(|h| state.unit(h)).map(|u| u.kind.color());
            let amount = (tick - self.held_since) as i64 / VACUUM_HURT as i64;
            state.hurt_local(body, look, by, amount);
        }
    }

    /// Pull whatever the nozzle points at; grab it once it is close.
    fn suck(&mut self, ms: &ManState, body: &Body, state: &mut SimState, world: &TileWorld, me: Actor) {
        let start = body.position - Coord::new(0, body.size.y / 2);
        let delta = (ms.target - start).scale(VACUUM_DISTANCE);
        let mut tr = state.trace(world, start, start + delta, Coord::new(1, 1), false);
        let Some(hit) = tr.collide_func(|o| me.blocks(state, o)) else {
            return;
        };
        let tick = state.tick;
        let held = self.held;
        let Some(u) = state.unit_mut(hit) else { return };

        if held.is_none() {
            let centre = u.body.position - Coord::new(0, u.body.size.y / 2);
            let reach = body.size.x + u.body.size.x;
            if (centre - start).length_squared() < reach * reach {
                self.held = Some(hit);
                self.held_since = tick;
                u.body.held_by = Some(me.id);
            }
        }
        u.body.velocity -= delta / VACUUM_SUCK;
    }

    fn throw_lemon(
        &mut self,
        ms: &ManState,
        body: &Body,
        state: &mut SimState,
        world: &TileWorld,
        side: i64,
    ) {
        let mut position = body.position - Coord::new(0, body.size.y / 2);
        position.x += side * (body.size.x / 2 + LEMON_SIZE / 2 + PIXEL_SIZE);
        let chest = Coord::new(0, body.size.y / 2);
        let velocity = (ms.target - body.position + chest).scale(LEMON_SPEED) + body.velocity;
        let size = Coord::new(LEMON_SIZE, LEMON_SIZE);

        let mut tr = state.trace(world, position, position + velocity.unit(), size, false);
        let blocked = tr
            .collide_func(|o| state.unit(o).is_some_and(|u| Class::Lemon.collides_with(u.kind.class())))
            .is_some();
        if blocked || tr.hit_world {
            return;
        }
        state.spawn_unit(Unit {
            body: Body {
                position,
                velocity,
                size,
                health: 1,
                ..Body::default()
            },
            kind: UnitKind::Lemon(Lemon),
        });
    }

    /// Let go on death: the load lands where the vacuum fell.
    fn drop_held(&mut self, body: &Body, state: &mut SimState) {
        if let Some(u) = self.held.and_then(|h| state.unit_mut(h)) {
            u.body.position = body.position;
            u.body.velocity = Coord::ZERO;
            u.body.held_by = None;
        }
        self.held = None;
        self.held_since = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::{MAN_HEALTH, TICKS_PER_SECOND};
    use crate::world::levels;

    const FLOOR: i64 = 9 * TILE;

    /// Arena with `keep` standing at x=20 tiles and the rest dead and parked.
    fn solo(keep: ManKind) -> (TileWorld, SimState) {
        let world = levels::arena(40, 10);
        let mut state = SimState::new(&world, 5);
        for (i, m) in state.mans.iter_mut().enumerate() {
            m.body.velocity = Coord::ZERO;
            if i == keep.index() {
                m.body.position = Coord::new(20 * TILE, FLOOR);
            } else {
                m.body.health = 0;
                m.body.position = Coord::new((3 + 3 * i as i64) * TILE, FLOOR);
                if let Some(man) = m.as_man_mut() {
                    man.state.respawn = u64::MAX;
                }
            }
        }
        (world, state)
    }

    fn step(state: &mut SimState, world: &TileWorld, slot: ManKind, input: Input) {
        let mut all = [None; MAN_COUNT];
        all[slot.index()] = Some(input);
        state.update(world, &all);
    }

    fn man(state: &SimState, kind: ManKind) -> &Man {
        state.man(kind).as_man().unwrap()
    }

    #[test]
    fn missing_packet_releases_buttons() {
        let mut ms = man(&SimState::new(&levels::arena(10, 10), 1), ManKind::Whip).state.clone();
        ms.receive(Some(&Input::aim(3, -4).with(Buttons::MOUSE1)));
        assert!(ms.input.held(Buttons::MOUSE1));
        ms.receive(None);
        assert_eq!(ms.input, Input::aim(3, -4));
    }

    #[test]
    fn crouch_keeps_feet_and_needs_headroom_to_stand() {
        let (mut world, mut state) = solo(ManKind::Normal);
        let id = ManKind::Normal.index();
        step(&mut state, &world, ManKind::Normal, Input::default().with(Buttons::KEY_DOWN));
        assert!(man(&state, ManKind::Normal).state.crouching);
        assert_eq!(state.mans[id].body.size, ManKind::Normal.info().crouch_size);
        assert_eq!(state.mans[id].body.position.y, FLOOR);

        // low ceiling right above the crouched head
        for x in 18..=22 {
            world.tile_mut(x, 6).unwrap().solid = true;
        }
        step(&mut state, &world, ManKind::Normal, Input::default());
        assert!(man(&state, ManKind::Normal).state.crouching);

        for x in 18..=22 {
            world.tile_mut(x, 6).unwrap().solid = false;
        }
        step(&mut state, &world, ManKind::Normal, Input::default());
        assert!(!man(&state, ManKind::Normal).state.crouching);
        assert_eq!(state.mans[id].body.size, ManKind::Normal.info().size);
    }

    #[test]
    fn short_whip_does_nothing() {
        let (world, mut state) = solo(ManKind::Whip);
        let aim = Input::aim(200, -23);
        for _ in 0..WHIP_TIME_MIN - 2 {
            step(&mut state, &world, ManKind::Whip, aim.with(Buttons::MOUSE1));
        }
        step(&mut state, &world, ManKind::Whip, aim);
        let Ability::Whip(w) = &man(&state, ManKind::Whip).ability else {
            panic!("whip slot holds another ability")
        };
        assert_ne!(w.stop, 0);
        assert_eq!(w.end, None);
        assert_eq!(state.mans[ManKind::Whip.index()].body.velocity, Coord::ZERO);
    }

    #[test]
    fn full_pull_into_wall_tethers() {
        let (world, mut state) = solo(ManKind::Whip);
        let id = ManKind::Whip.index();
        // wall at x=39, within reach; aim level with the chest
        state.mans[id].body.position.x = 33 * TILE;
        let aim = Input::aim(400, -23);
        for _ in 0..WHIP_TIME_MAX + 10 {
            step(&mut state, &world, ManKind::Whip, aim.with(Buttons::MOUSE2));
        }
        step(&mut state, &world, ManKind::Whip, aim);

        let Ability::Whip(w) = &man(&state, ManKind::Whip).ability else {
            panic!("whip slot holds another ability")
        };
        let end = w.end.unwrap();
        assert!((end.x - 39 * TILE).abs() <= 1, "whip ended at {}", end.x);
        assert_eq!(w.tether, Some(end));
        assert!(state.mans[id].body.velocity.x > WHIP_SPEED_MAX / 2);
    }

    #[test]
    fn charged_whip_kills_a_grub() {
        let (world, mut state) = solo(ManKind::Whip);
        let grub = state.spawn_grub(Coord::new(25 * TILE, FLOOR));
        let aim = Input::aim(400, -23);
        // grubs sit still for their first second
        for _ in 0..90 {
            step(&mut state, &world, ManKind::Whip, aim.with(Buttons::MOUSE1));
        }
        step(&mut state, &world, ManKind::Whip, aim);
        assert!(state.unit(grub).is_none(), "grub survived the lash");
        let Ability::Whip(w) = &man(&state, ManKind::Whip).ability else {
            panic!("not a whip");
        };
        let charge = (w.stop - w.start).min(WHIP_TIME_MAX);
        // floaters show the damage dealt, not the health it removed
        let dealt = whip_lerp(WHIP_DAMAGE_MIN, WHIP_DAMAGE_MAX, charge);
        assert!(dealt > crate::defs::GRUB_HEALTH);
        let whip = ManKind::Whip.info().color;
        assert!(
            state
                .floaters
                .iter()
                .any(|f| f.bg == whip && f.text == crate::sim::state::comma(dealt))
        );
    }

    #[test]
    fn dead_man_respawns_after_the_timer_for_a_life() {
        let (world, mut state) = solo(ManKind::Whip);
        let id = ManKind::Whip.index();
        let lives = man(&state, ManKind::Whip).state.lives;
        state.mans[id].body.health = 0;

        step(&mut state, &world, ManKind::Whip, Input::default());
        let due = man(&state, ManKind::Whip).state.respawn;
        assert_eq!(due, state.tick + RESPAWN_TIME);
        while state.tick + 1 < due {
            step(&mut state, &world, ManKind::Whip, Input::default());
            assert!(!state.mans[id].body.alive());
        }

        step(&mut state, &world, ManKind::Whip, Input::default());
        let m = man(&state, ManKind::Whip);
        assert_eq!(m.state.lives, lives - 1);
        assert_eq!(m.state.respawn, 0);
        assert!(state.mans[id].body.alive());
    }

    #[test]
    fn dying_drops_whip_charge_and_tether() {
        let (world, mut state) = solo(ManKind::Whip);
        let id = ManKind::Whip.index();
        let pull = Input::aim(400, -23).with(Buttons::MOUSE2);
        for _ in 0..30 {
            step(&mut state, &world, ManKind::Whip, pull);
        }
        if let Some(Ability::Whip(w)) = state.mans[id].as_man_mut().map(|m| &mut m.ability) {
            assert_ne!(w.start, 0);
            w.tether = Some(Coord::new(39 * TILE, 5 * TILE));
        }

        state.mans[id].body.health = 0;
        step(&mut state, &world, ManKind::Whip, pull);
        assert_eq!(man(&state, ManKind::Whip).ability, Ability::Whip(Whip::default()));
    }

    #[test]
    fn lemon_needs_room_to_spawn() {
        let (mut world, mut state) = solo(ManKind::Vacuum);
        let fire = Input::aim(200, -23).with(Buttons::MOUSE1);
        // wall right in front of the nozzle
        for y in 5..=8 {
            for x in 21..=22 {
                world.tile_mut(x, y).unwrap().solid = true;
            }
        }
        for _ in 0..=LEMON_TIME {
            step(&mut state, &world, ManKind::Vacuum, fire);
        }
        assert!(state.units.is_empty(), "lemon spawned inside a wall");

        // a body in the way blocks it as well
        for y in 5..=8 {
            for x in 21..=22 {
                world.tile_mut(x, y).unwrap().solid = false;
            }
        }
        let grub = state.spawn_grub(Coord::new(22 * TILE, FLOOR));
        for _ in 0..=LEMON_TIME {
            step(&mut state, &world, ManKind::Vacuum, fire);
        }
        assert_eq!(state.units.len(), 1);
        assert!(state.unit(grub).is_some());
    }

    #[test]
    fn density_is_clamped() {
        let (world, mut state) = solo(ManKind::Density);
        let ticks = (DENSITY_MAX / DENSITY_STEP) as usize + 10;
        for _ in 0..ticks {
            step(&mut state, &world, ManKind::Density, Input::default().with(Buttons::MOUSE1));
        }
        let m = man(&state, ManKind::Density);
        assert_eq!(m.ability, Ability::Density(Density { gravity: DENSITY_MAX }));
        let base = ManKind::Density.info().mass;
        assert_eq!(m.mass(&state), base * 5);
        assert_eq!(state.mans[ManKind::Density.index()].body.gravity, DENSITY_MAX);

        let ticks = ((DENSITY_MAX - DENSITY_MIN) / DENSITY_STEP) as usize + 10;
        for _ in 0..ticks {
            step(&mut state, &world, ManKind::Density, Input::default().with(Buttons::MOUSE2));
        }
        let m = man(&state, ManKind::Density);
        assert_eq!(m.ability, Ability::Density(Density { gravity: DENSITY_MIN }));
        assert_eq!(m.mass(&state), 0);
    }

    #[test]
    fn lemons_are_rate_limited() {
        let (world, mut state) = solo(ManKind::Vacuum);
        let fire = Input::aim(200, -23).with(Buttons::MOUSE1);
        for _ in 0..=LEMON_TIME {
            step(&mut state, &world, ManKind::Vacuum, fire);
        }
        assert_eq!(state.units.len(), 1);
        step(&mut state, &world, ManKind::Vacuum, fire);
        assert_eq!(state.units.len(), 1, "second lemon before the cooldown");
        let lemon = state.units.values().next().unwrap();
        assert!(matches!(lemon.kind, UnitKind::Lemon(_)));
    }

    #[test]
    fn vacuum_grabs_and_throws() {
        let (world, mut state) = solo(ManKind::Vacuum);
        let grub = state.spawn_grub(Coord::new(23 * TILE, FLOOR));
        let suck = Input::aim(200, -23).with(Buttons::MOUSE2);
        let mut grabbed = false;
        for _ in 0..TICKS_PER_SECOND {
            step(&mut state, &world, ManKind::Vacuum, suck);
            if man(&state, ManKind::Vacuum).holding() == Some(grub) {
                grabbed = true;
                break;
            }
        }
        assert!(grabbed);
        assert_eq!(state.unit(grub).unwrap().body.held_by, Some(UnitId::Man(ManKind::Vacuum)));
        let carried = state.mass_of(UnitId::Man(ManKind::Vacuum));
        assert_eq!(carried, ManKind::Vacuum.info().mass + crate::defs::GRUB_MASS);

        for _ in 0..40 {
            step(&mut state, &world, ManKind::Vacuum, suck);
        }
        assert!(state.mans[ManKind::Vacuum.index()].body.health < MAN_HEALTH);

        step(&mut state, &world, ManKind::Vacuum, Input::aim(200, -23));
        assert_eq!(man(&state, ManKind::Vacuum).holding(), None);
        let g = state.unit(grub).unwrap();
        assert_eq!(g.body.held_by, None);
        assert!(g.body.velocity.x > 0);
    }

    #[test]
    fn last_men_standing_come_back_together() {
        let world = levels::arena(40, 10);
        let mut state = SimState::new(&world, 9);
        let lives = [0, 2, 0, 2];
        for (i, m) in state.mans.iter_mut().enumerate() {
            m.body.health = 0;
            let man = m.as_man_mut().unwrap();
            man.state.lives = lives[i];
            man.state.respawn = 1;
        }
        // slots 1 and 3 have lives and respawn on their own
        let idle = [None; MAN_COUNT];
        state.update(&world, &idle);
        assert!(state.mans[1].body.alive());
        assert!(!state.mans[0].body.alive());

        // now only slots 0 and 2 wait; the living block a comeback
        state.update(&world, &idle);
        assert!(!state.mans[0].body.alive());

        for i in [1, 3] {
            state.mans[i].body.health = 0;
            state.mans[i].as_man_mut().unwrap().state.respawn = 1;
            state.mans[i].as_man_mut().unwrap().state.lives = 0;
        }
        state.update(&world, &idle);
        for m in &state.mans {
            assert!(m.body.alive());
            assert_eq!(m.as_man().unwrap().state.lives, -1);
        }
    }

    #[test]
    fn checkpoints_unlock_when_everyone_touches() {
        let mut world = levels::arena(40, 10);
        let mut state = SimState::new(&world, 2);
        world.tile_mut(20, 9).unwrap().special = SpecialTile::Checkpoint;
        let marker = TileWorld::marker_position(20, 9);
        for kind in ManKind::ALL {
            let mut unit = state.man(kind).clone();
            unit.body.position = Coord::new(20 * TILE + TILE / 2, FLOOR);
            let Unit { body, kind: UnitKind::Man(m) } = &mut unit else {
                unreachable!()
            };
            m.touch_checkpoint(body, &mut state, &world);
            assert_eq!(m.state.checkpoint, marker);
            state.mans[kind.index()] = unit;
        }
        let texts: Vec<_> = state.floaters.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, CHECKPOINT_TEXT);
        assert_eq!(state.spawn_point, marker);
    }
}
