use bincode::{Decode, Encode};

use super::man::Man;
use super::mob::{Grub, Lemon};
use super::state::SimState;
use crate::defs::{FLOATER_FADE_END, FLOATER_FADE_START, GRUB_MASS, LEMON_MASS, ManKind, Rgba};
use crate::world::{Coord, TileWorld};

/// Stable reference to a body: a player slot or a dynamic unit key.
///
/// Dynamic keys are never reused, so a stale id simply stops resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub enum UnitId {
    Man(ManKind),
    Unit(u64),
}

/// Physical state shared by every kind of body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct Body {
    /// Bottom-centre of the box.
    pub position: Coord,
    pub velocity: Coord,
    pub acceleration: Coord,
    pub size: Coord,
    /// Added to the global gravity while airborne.
    pub gravity: i64,
    pub health: i64,
    /// Set while a vacuum holds this body; held bodies neither update nor
    /// block traces.
    pub held_by: Option<UnitId>,
}

impl Body {
    #[inline]
    pub fn alive(&self) -> bool {
        self.health > 0
    }

    /// Absolute `(min, max)` box at the current position.
    pub fn bounds(&self) -> (Coord, Coord) {
        let (min, max) = self.size.hull();
        (min + self.position, max + self.position)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub enum UnitKind {
    Man(Man),
    Lemon(Lemon),
    Grub(Grub),
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct Unit {
    pub body: Body,
    pub kind: UnitKind,
}

/// What happened to a body after its dead update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fate {
    Keep,
    Remove,
}

/// How damage to a body is displayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Look {
    pub color: Rgba,
    pub show_damage: bool,
}

/// Coarse body category used by collision filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Class {
    Man(ManKind),
    Lemon,
    Grub,
}

impl Class {
    /// Lemons pass through each other and through the vacuum that throws them.
    pub fn collides_with(self, other: Class) -> bool {
        !matches!(
            (self, other),
            (Class::Lemon, Class::Lemon)
                | (Class::Lemon, Class::Man(ManKind::Vacuum))
                | (Class::Man(ManKind::Vacuum), Class::Lemon)
        )
    }
}

/// The body currently being updated, as seen by its own traces.
#[derive(Clone, Copy, Debug)]
pub struct Actor {
    pub id: UnitId,
    pub class: Class,
}

impl Actor {
    /// Trace filter: not itself, and a kind it can touch.
    pub fn blocks(self, state: &SimState, other: UnitId) -> bool {
        other != self.id
            && state
                .unit(other)
                .is_some_and(|u| self.class.collides_with(u.kind.class()))
    }
}

impl UnitKind {
    pub fn class(&self) -> Class {
        match self {
            UnitKind::Man(m) => Class::Man(m.state.kind),
            UnitKind::Lemon(_) => Class::Lemon,
            UnitKind::Grub(_) => Class::Grub,
        }
    }

    #[inline]
    pub fn is_man(&self) -> bool {
        matches!(self, UnitKind::Man(_))
    }

    pub fn color(&self) -> Rgba {
        match self {
            UnitKind::Man(m) => m.state.kind.info().color,
            UnitKind::Lemon(_) => ManKind::Vacuum.info().color,
            UnitKind::Grub(_) => Rgba::BLACK,
        }
    }

    pub fn show_damage(&self) -> bool {
        !matches!(self, UnitKind::Lemon(_))
    }

    pub fn look(&self) -> Look {
        Look {
            color: self.color(),
            show_damage: self.show_damage(),
        }
    }

    pub fn mass(&self, state: &SimState) -> i64 {
        match self {
            UnitKind::Man(m) => m.mass(state),
            UnitKind::Lemon(_) => LEMON_MASS,
            UnitKind::Grub(_) => GRUB_MASS,
        }
    }

    pub(crate) fn update(
        &mut self,
        body: &mut Body,
        state: &mut SimState,
        world: &TileWorld,
        me: Actor,
    ) {
        match self {
            UnitKind::Man(m) => m.update(body, state, world, me),
            UnitKind::Lemon(_) => {}
            UnitKind::Grub(g) => g.update(body, state),
        }
    }

    pub(crate) fn update_dead(
        &mut self,
        body: &mut Body,
        state: &mut SimState,
        world: &TileWorld,
        me: Actor,
    ) -> Fate {
        match self {
            UnitKind::Man(m) => {
                m.update_dead(body, state, world, me);
                Fate::Keep
            }
            UnitKind::Lemon(_) | UnitKind::Grub(_) => Fate::Remove,
        }
    }
}

impl Unit {
    #[inline]
    pub fn mass(&self, state: &SimState) -> i64 {
        self.kind.mass(state)
    }

    pub fn as_man(&self) -> Option<&Man> {
        match &self.kind {
            UnitKind::Man(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_man_mut(&mut self) -> Option<&mut Man> {
        match &mut self.kind {
            UnitKind::Man(m) => Some(m),
            _ => None,
        }
    }
}

/// Floating text spawned by damage and checkpoint events.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct Floater {
    pub text: String,
    pub fg: Rgba,
    pub bg: Rgba,
    pub x: i64,
    pub y: i64,
    /// Tick the floater was spawned on.
    pub tick: u64,
}

impl Floater {
    /// Colours to draw at tick `now`, or `None` once fully faded.
    pub fn faded(&self, now: u64) -> Option<(Rgba, Rgba)> {
        let age = now.saturating_sub(self.tick);
        if age >= FLOATER_FADE_END {
            return None;
        }
        if age <= FLOATER_FADE_START {
            return Some((self.fg, self.bg));
        }
        let keep = FLOATER_FADE_END - age;
        let span = FLOATER_FADE_END - FLOATER_FADE_START;
        Some((self.fg.fade(keep, span), self.bg.fade(keep, span)))
    }

    /// Still inside the fade horizon at tick `now`.
    #[inline]
    pub fn live(&self, now: u64) -> bool {
        self.tick + FLOATER_FADE_END >= now
    }
}
