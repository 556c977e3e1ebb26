//! Replay files: a header followed by one snapshot per tick.
//!
//! Layout: `b"WDVR"`, `u32` LE version, then repeated frames of
//! `u32` LE length + snapshot bytes until end of file.

use byteorder::{LittleEndian as LE, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use thiserror::Error;

use super::snapshot::SnapshotError;
use super::state::SimState;

pub const REPLAY_VERSION: u32 = 1;
const MAGIC: &[u8; 4] = b"WDVR";
/// Frames larger than this are treated as corruption.
const MAX_FRAME: u32 = 16 << 20;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("file is not a replay")]
    BadMagic,

    #[error("unsupported replay version {0}")]
    BadVersion(u32),

    #[error("frame of {0} bytes exceeds the limit")]
    FrameTooLarge(u32),

    #[error("snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
}

pub struct ReplayWriter<W: Write> {
    out: W,
    frames: u64,
}

impl<W: Write> ReplayWriter<W> {
    pub fn new(mut out: W) -> Result<Self, ReplayError> {
        out.write_all(MAGIC)?;
        out.write_u32::<LE>(REPLAY_VERSION)?;
        Ok(Self { out, frames: 0 })
    }

    /// Append already-encoded snapshot bytes.
    pub fn push_bytes(&mut self, snapshot: &[u8]) -> Result<(), ReplayError> {
        let len = u32::try_from(snapshot.len()).unwrap_or(u32::MAX);
        if len > MAX_FRAME {
            return Err(ReplayError::FrameTooLarge(len));
        }
        self.out.write_u32::<LE>(len)?;
        self.out.write_all(snapshot)?;
        self.frames += 1;
        Ok(())
    }

    pub fn push(&mut self, state: &SimState) -> Result<(), ReplayError> {
        self.push_bytes(&state.to_bytes()?)
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Flush and hand back the sink.
    pub fn finish(mut self) -> Result<W, ReplayError> {
        self.out.flush()?;
        tracing::info!(frames = self.frames, "replay finished");
        Ok(self.out)
    }
}

/// Iterates decoded states; stops cleanly at end of input.
pub struct ReplayReader<R: Read> {
    input: R,
    done: bool,
}

impl<R: Read> ReplayReader<R> {
    pub fn new(mut input: R) -> Result<Self, ReplayError> {
        let mut magic = [0u8; 4];
        input.read_exact(&mut magic).map_err(|_| ReplayError::BadMagic)?;
        if &magic != MAGIC {
            return Err(ReplayError::BadMagic);
        }
        let version = input.read_u32::<LE>()?;
        if version != REPLAY_VERSION {
            return Err(ReplayError::BadVersion(version));
        }
        Ok(Self { input, done: false })
    }

    fn next_frame(&mut self) -> Result<Option<SimState>, ReplayError> {
        let len = match self.input.read_u32::<LE>() {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if len > MAX_FRAME {
            return Err(ReplayError::FrameTooLarge(len));
        }
        let mut buf = vec![0u8; len as usize];
        self.input.read_exact(&mut buf)?;
        Ok(Some(SimState::from_bytes(&buf)?))
    }
}

impl<R: Read> Iterator for ReplayReader<R> {
    type Item = Result<SimState, ReplayError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.next_frame().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}
