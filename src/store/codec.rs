//! Record encoding shared by every persistence mode.
//!
//! A record is bincode-encoded. On disk, sequences of records are framed as
//! a 4-byte little-endian payload length followed by the payload.

use std::io::{self, Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("record encoding error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("not a gene store: {path} (bad magic)")]
    BadMagic { path: String },
    #[error("store version mismatch: file={found}, binary={expected}")]
    VersionMismatch { found: String, expected: String },
    #[error("record of {0} bytes does not fit a frame")]
    FrameTooLarge(usize),
}

/// Outcome of reading one frame.
#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    Payload(Vec<u8>),
    /// Clean end of input: no byte of a new frame was present.
    End,
    /// Input ended inside a frame; `read` bytes of it were present.
    Torn { read: usize },
}

pub fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>, StoreError> {
    Ok(bincode::serialize(record)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Write one length-prefixed frame. Returns the number of bytes written.
pub fn write_frame<W: Write>(w: &mut W, payload: &[u8]) -> Result<u64, StoreError> {
    let len = u32::try_from(payload.len()).map_err(|_| StoreError::FrameTooLarge(payload.len()))?;
    w.write_all(&len.to_le_bytes())?;
    w.write_all(payload)?;
    Ok(4 + payload.len() as u64)
}

/// Read one length-prefixed frame.
pub fn read_frame<R: Read>(r: &mut R) -> Result<Frame, StoreError> {
    let mut len_buf = [0u8; 4];
    let got = read_full(r, &mut len_buf)?;
    if got == 0 {
        return Ok(Frame::End);
    }
    if got < len_buf.len() {
        return Ok(Frame::Torn { read: got });
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    let mut payload = vec![0u8; len];
    let got = read_full(r, &mut payload)?;
    if got < len {
        return Ok(Frame::Torn { read: 4 + got });
    }
    Ok(Frame::Payload(payload))
}

/// Like `read_exact`, but reports how much was read instead of failing at EOF.
fn read_full<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
