//! Whole-state snapshots: the bytes a server broadcasts every tick.
//!
//! Two states that compare equal encode to the same bytes, so peers can
//! compare checksums instead of states.

use bincode::error::{DecodeError, EncodeError};
use thiserror::Error;

use super::state::SimState;
use crate::defs::wire_config;

/// Upper bound on a decoded snapshot.
const MAX_SNAPSHOT: usize = 16 << 20;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("encode: {0}")]
    Encode(#[from] EncodeError),

    #[error("decode: {0}")]
    Decode(#[from] DecodeError),

    #[error("{0} trailing bytes after snapshot")]
    TrailingBytes(usize),
}

impl SimState {
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::encode_to_vec(self, wire_config())?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let cfg = wire_config().with_limit::<MAX_SNAPSHOT>();
        let (state, used): (SimState, usize) = bincode::decode_from_slice(bytes, cfg)?;
        if used != bytes.len() {
            return Err(SnapshotError::TrailingBytes(bytes.len() - used));
        }
        Ok(state)
    }

    /// FNV-1a over the snapshot bytes.
    pub fn checksum(&self) -> Result<u64, SnapshotError> {
        Ok(fnv1a(&self.to_bytes()?))
    }
}

pub(crate) fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |h, &b| {
        (h ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}
