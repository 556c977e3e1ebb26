//! World file codec.
//!
//! Layout: `b"WDVN"`, `u32` LE format version, then the bincode body
//! (bounds + X-major tile vector). Encoding is byte-exact: loading and
//! saving an unmodified world reproduces the file.

use bincode::{
    Decode, Encode,
    error::{DecodeError, EncodeError},
};
use byteorder::{LittleEndian as LE, ReadBytesExt, WriteBytesExt};
use std::{
    fs,
    io::{self, Read},
    path::Path,
};
use thiserror::Error;

use super::{Coord, Tile, TileWorld};
use crate::defs::wire_config;

pub const FORMAT_VERSION: u32 = 1;
const MAGIC: &[u8; 4] = b"WDVN";
/// Upper bound on a decoded body; rejects absurd tile counts before allocating.
const MAX_BODY: usize = 64 << 20;

#[derive(Error, Debug)]
pub enum WorldError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("file is not a world asset")]
    BadMagic,

    #[error("unsupported world format version {0}")]
    BadVersion(u32),

    #[error("world bounds {min:?}..={max:?} are inverted or too large")]
    BadBounds { min: Coord, max: Coord },

    #[error("expected {expected} tiles, found {found}")]
    BadTileCount { expected: usize, found: usize },

    #[error("{0} trailing bytes after world data")]
    TrailingBytes(usize),

    #[error("encode: {0}")]
    Encode(#[from] EncodeError),

    #[error("decode: {0}")]
    Decode(#[from] DecodeError),
}

#[derive(Encode, Decode)]
struct WorldBody {
    min: Coord,
    max: Coord,
    tiles: Vec<Tile>,
}

impl TileWorld {
    pub fn to_bytes(&self) -> Result<Vec<u8>, WorldError> {
        let mut out = Vec::with_capacity(8 + 32 + self.tiles.len() * 4);
        out.extend_from_slice(MAGIC);
        out.write_u32::<LE>(FORMAT_VERSION)?;
        let body = WorldBody {
            min: self.min,
            max: self.max,
            tiles: self.tiles.clone(),
        };
        bincode::encode_into_std_write(&body, &mut out, wire_config())?;
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WorldError> {
        let mut rdr = bytes;
        let mut magic = [0u8; 4];
        rdr.read_exact(&mut magic).map_err(|_| WorldError::BadMagic)?;
        if &magic != MAGIC {
            return Err(WorldError::BadMagic);
        }
        let version = rdr.read_u32::<LE>()?;
        if version != FORMAT_VERSION {
            return Err(WorldError::BadVersion(version));
        }

        let cfg = wire_config().with_limit::<MAX_BODY>();
        let (body, used): (WorldBody, usize) = bincode::decode_from_slice(rdr, cfg)?;
        if used != rdr.len() {
            return Err(WorldError::TrailingBytes(rdr.len() - used));
        }
        TileWorld::from_parts(body.min, body.max, body.tiles)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WorldError> {
        let bytes = fs::read(path.as_ref())?;
        let world = Self::from_bytes(&bytes)?;
        tracing::info!(
            path = %path.as_ref().display(),
            width = world.width(),
            height = world.height(),
            "world loaded"
        );
        Ok(world)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), WorldError> {
        let bytes = self.to_bytes()?;
        fs::write(path.as_ref(), &bytes)?;
        tracing::info!(path = %path.as_ref().display(), bytes = bytes.len(), "world saved");
        Ok(())
    }
}
