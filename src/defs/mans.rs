//! Per-character tuning table, one row per player slot.

use bincode::{Decode, Encode};

use super::{GRAVITY, MAN_HEALTH, PIXEL_SIZE, Rgba};
use crate::world::Coord;

pub const MAN_COUNT: usize = 4;

/// Player slot; the discriminant is the slot index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub enum ManKind {
    Whip = 0,
    Density = 1,
    Vacuum = 2,
    Normal = 3,
}

impl ManKind {
    pub const ALL: [ManKind; MAN_COUNT] = [
        ManKind::Whip,
        ManKind::Density,
        ManKind::Vacuum,
        ManKind::Normal,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    #[inline]
    pub fn info(self) -> &'static ManInfo {
        &MAN_INFO[self.index()]
    }
}

/// Static movement / body parameters of one character.
#[derive(Debug)]
pub struct ManInfo {
    pub name: &'static str,
    pub move_speed: i64,
    pub crouch_speed: i64,
    pub air_speed: i64,
    pub air_crouch_speed: i64,
    pub jump_speed: i64,
    pub size: Coord,
    pub crouch_size: Coord,
    pub max_health: i64,
    pub mass: i64,
    pub crouch_mass: i64,
    pub gravity: i64,
    pub crouch_gravity: i64,
    pub color: Rgba,
}

const STAND: Coord = Coord::new(30 * PIXEL_SIZE, 46 * PIXEL_SIZE);
const CROUCH: Coord = Coord::new(30 * PIXEL_SIZE, 30 * PIXEL_SIZE);

const fn agile(name: &'static str, color: Rgba) -> ManInfo {
    ManInfo {
        name,
        move_speed: 2 * PIXEL_SIZE,
        crouch_speed: PIXEL_SIZE,
        air_speed: 2 * PIXEL_SIZE,
        air_crouch_speed: PIXEL_SIZE,
        jump_speed: 350 * PIXEL_SIZE,
        size: STAND,
        crouch_size: CROUCH,
        max_health: MAN_HEALTH,
        mass: 1000,
        crouch_mass: 2000,
        gravity: GRAVITY,
        crouch_gravity: GRAVITY * 2,
        color,
    }
}

pub static MAN_INFO: [ManInfo; MAN_COUNT] = [
    agile("whip", Rgba::rgb(192, 0, 0)),
    agile("density", Rgba::rgb(128, 128, 0)),
    agile("vacuum", Rgba::rgb(0, 128, 0)),
    ManInfo {
        air_speed: 0,
        air_crouch_speed: 0,
        jump_speed: 200 * PIXEL_SIZE,
        ..agile("normal", Rgba::rgb(0, 0, 192))
    },
];
