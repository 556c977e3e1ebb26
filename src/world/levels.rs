//! Built-in levels, generated in code so tools and tests need no files.

use super::{Coord, SpecialTile, Tile, TileWorld};

const STONE: Tile = Tile {
    tile: 1,
    solid: true,
    special: SpecialTile::None,
};

type Span = std::ops::RangeInclusive<i64>;

fn fill(w: &mut TileWorld, xs: Span, ys: Span, t: Tile) {
    for x in xs {
        for y in ys.clone() {
            if let Some(tile) = w.tile_mut(x, y) {
                *tile = t;
            }
        }
    }
}

/// Closed box: one-tile walls left and right, floor on the bottom row.
///
/// Interior is `x in 1..width-1`, `y in 0..height-1`; the floor's top edge
/// sits at `y = (height - 1) * TILE`.
pub fn arena(width: i64, height: i64) -> TileWorld {
    let mut w = TileWorld::new(Coord::new(0, 0), Coord::new(width - 1, height - 1));
    fill(&mut w, 0..=width - 1, height - 1..=height - 1, STONE);
    fill(&mut w, 0..=0, 0..=height - 1, STONE);
    fill(&mut w, width - 1..=width - 1, 0..=height - 1, STONE);
    w
}

/// Default playground: floor, walls, a ledge, a pillar, a bounce pad and
/// a checkpoint the players spawn above.
pub fn proving_ground() -> TileWorld {
    let mut w = TileWorld::new(Coord::new(0, 0), Coord::new(47, 23));
    fill(&mut w, 0..=47, 20..=23, STONE);
    fill(&mut w, 0..=1, 0..=23, STONE);
    fill(&mut w, 46..=47, 0..=23, STONE);
    fill(&mut w, 10..=16, 12..=12, STONE);
    fill(&mut w, 24..=25, 16..=19, STONE);

    let pad = Tile {
        tile: 2,
        special: SpecialTile::Bounce,
        ..STONE
    };
    fill(&mut w, 36..=38, 20..=20, pad);

    let flag = Tile {
        tile: 3,
        special: SpecialTile::Checkpoint,
        ..STONE
    };
    fill(&mut w, 6..=6, 20..=20, flag);
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proving_ground_markers() {
        let w = proving_ground();
        assert_eq!(w.spawn_point(), TileWorld::marker_position(6, 20));
        assert_eq!(w.special(37, 20), SpecialTile::Bounce);
        assert!(w.solid(24, 19) && !w.solid(24, 15));
    }

    #[test]
    fn arena_is_enclosed() {
        let w = arena(10, 8);
        assert!(w.solid(0, 3) && w.solid(9, 3));
        assert!(w.solid(4, 7));
        assert!(!w.solid(4, 6));
        assert!(w.solid(4, 100));
    }
}
