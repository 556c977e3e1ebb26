mod asset;
mod coord;
pub mod levels;
mod tiles;

pub use asset::{FORMAT_VERSION, WorldError};
pub use coord::Coord;
pub use tiles::{SpecialTile, Tile, TileWorld};
