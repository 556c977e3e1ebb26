//! Resizable tile grid with clamped queries.
//!
//! Every query outside `[min, max]` is answered by the nearest edge tile, so
//! the world behaves as if its border extended forever. `outside` reports how
//! far a query had to be clamped.

use bincode::{Decode, Encode};

use super::Coord;
use super::asset::WorldError;
use crate::defs::TILE;

/// Gameplay marker attached to a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Encode, Decode)]
pub enum SpecialTile {
    #[default]
    None,
    Bounce,
    Checkpoint,
}

impl SpecialTile {
    pub const ALL: [SpecialTile; 3] = [
        SpecialTile::None,
        SpecialTile::Bounce,
        SpecialTile::Checkpoint,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SpecialTile::None => "none",
            SpecialTile::Bounce => "bounce",
            SpecialTile::Checkpoint => "checkpoint",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Encode, Decode)]
pub struct Tile {
    /// Visual index, meaningless to the simulation.
    pub tile: u16,
    pub solid: bool,
    pub special: SpecialTile,
}

/// Grid of tiles over the inclusive rectangle `[min, max]`, X-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileWorld {
    pub(super) min: Coord,
    pub(super) max: Coord,
    pub(super) tiles: Vec<Tile>,
}

impl TileWorld {
    /// Empty (non-solid) world covering the rectangle spanned by two corners.
    pub fn new(a: Coord, b: Coord) -> Self {
        let min = Coord::new(a.x.min(b.x), a.y.min(b.y));
        let max = Coord::new(a.x.max(b.x), a.y.max(b.y));
        let len = ((max.x - min.x + 1) * (max.y - min.y + 1)) as usize;
        Self {
            min,
            max,
            tiles: vec![Tile::default(); len],
        }
    }

    /// Build from raw parts, checking the length invariant.
    pub fn from_parts(min: Coord, max: Coord, tiles: Vec<Tile>) -> Result<Self, WorldError> {
        if min.x > max.x || min.y > max.y {
            return Err(WorldError::BadBounds { min, max });
        }
        let span = |lo: i64, hi: i64| hi.checked_sub(lo).and_then(|d| d.checked_add(1));
        let expected = span(min.x, max.x)
            .zip(span(min.y, max.y))
            .and_then(|(w, h)| w.checked_mul(h))
            .ok_or(WorldError::BadBounds { min, max })?;
        if tiles.len() as i64 != expected {
            return Err(WorldError::BadTileCount {
                expected: expected as usize,
                found: tiles.len(),
            });
        }
        Ok(Self { min, max, tiles })
    }

    #[inline]
    pub fn min(&self) -> Coord {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Coord {
        self.max
    }

    #[inline]
    pub fn width(&self) -> i64 {
        self.max.x - self.min.x + 1
    }

    #[inline]
    pub fn height(&self) -> i64 {
        self.max.y - self.min.y + 1
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /* ---------------------------------------------------------------- */
    /* clamped queries                                                   */
    /* ---------------------------------------------------------------- */

    /// Clamp `(x, y)` into bounds; returns the flat index and clamp distance.
    fn index(&self, x: i64, y: i64) -> (usize, i64) {
        let cx = x.clamp(self.min.x, self.max.x);
        let cy = y.clamp(self.min.y, self.max.y);
        let out = (x - cx).abs() + (y - cy).abs();
        let i = (cx - self.min.x) * self.height() + (cy - self.min.y);
        (i as usize, out)
    }

    #[inline]
    pub fn tile(&self, x: i64, y: i64) -> &Tile {
        &self.tiles[self.index(x, y).0]
    }

    #[inline]
    pub fn solid(&self, x: i64, y: i64) -> bool {
        self.tile(x, y).solid
    }

    #[inline]
    pub fn special(&self, x: i64, y: i64) -> SpecialTile {
        self.tile(x, y).special
    }

    /// In-bounds tile for in-place edits; `None` outside (no clamping).
    pub fn tile_mut(&mut self, x: i64, y: i64) -> Option<&mut Tile> {
        match self.index(x, y) {
            (i, 0) => self.tiles.get_mut(i),
            _ => None,
        }
    }

    /// Tiles between `(x, y)` and the nearest in-bounds tile; 0 inside.
    #[inline]
    pub fn outside(&self, x: i64, y: i64) -> i64 {
        self.index(x, y).1
    }

    /// Every in-bounds tile with its coordinates, X-major.
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64, &Tile)> + '_ {
        let h = self.height();
        let min = self.min;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, t)| (min.x + i as i64 / h, min.y + i as i64 % h, t))
    }

    /// Feet position for a body standing one tile above marker `(x, y)`.
    pub fn marker_position(x: i64, y: i64) -> Coord {
        Coord::new(x * TILE + TILE / 2, y * TILE - TILE)
    }

    /// First checkpoint marker, else the top centre of the bounds.
    pub fn spawn_point(&self) -> Coord {
        self.iter()
            .find(|(_, _, t)| t.special == SpecialTile::Checkpoint)
            .map(|(x, y, _)| Self::marker_position(x, y))
            .unwrap_or_else(|| {
                Coord::new((self.min.x + self.max.x + 1) * TILE / 2, self.min.y * TILE)
            })
    }

    /* ---------------------------------------------------------------- */
    /* editing                                                           */
    /* ---------------------------------------------------------------- */

    /// Grow the bounds minimally so `(x, y)` is inside.
    ///
    /// New cells copy the edge tile they used to clamp to, so no query
    /// changes its answer.
    pub fn ensure_tile_exists(&mut self, x: i64, y: i64) {
        let min = Coord::new(self.min.x.min(x), self.min.y.min(y));
        let max = Coord::new(self.max.x.max(x), self.max.y.max(y));
        if min != self.min || max != self.max {
            self.resize(min, max);
        }
    }

    /// Trim border rows/columns identical to their inner neighbour.
    pub fn shrink(&mut self) {
        loop {
            let (min, max) = (self.min, self.max);
            if min.x < max.x && self.column_eq(min.x, min.x + 1) {
                self.resize(Coord::new(min.x + 1, min.y), max);
            } else if min.x < max.x && self.column_eq(max.x, max.x - 1) {
                self.resize(min, Coord::new(max.x - 1, max.y));
            } else if min.y < max.y && self.row_eq(min.y, min.y + 1) {
                self.resize(Coord::new(min.x, min.y + 1), max);
            } else if min.y < max.y && self.row_eq(max.y, max.y - 1) {
                self.resize(min, Coord::new(max.x, max.y - 1));
            } else {
                return;
            }
        }
    }

    /// Editor cycle: grow to include `(x, y)`, mutate the tile, shrink.
    pub fn edit(&mut self, x: i64, y: i64, f: impl FnOnce(&mut Tile)) {
        self.ensure_tile_exists(x, y);
        let (i, _) = self.index(x, y);
        f(&mut self.tiles[i]);
        self.shrink();
    }

    fn column_eq(&self, a: i64, b: i64) -> bool {
        (self.min.y..=self.max.y).all(|y| self.tile(a, y) == self.tile(b, y))
    }

    fn row_eq(&self, a: i64, b: i64) -> bool {
        (self.min.x..=self.max.x).all(|x| self.tile(x, a) == self.tile(x, b))
    }

    fn resize(&mut self, min: Coord, max: Coord) {
        let len = ((max.x - min.x + 1) * (max.y - min.y + 1)) as usize;
        let mut tiles = Vec::with_capacity(len);
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                tiles.push(*self.tile(x, y));
            }
        }
        self.min = min;
        self.max = max;
        self.tiles = tiles;
    }
}
