//! Length-prefixed text frames.
//!
//! ```text
//! +----------+------------------+
//! | Len(4)   | Payload(Len)     |
//! +----------+------------------+
//! ```
//!
//! `Len` is big-endian. The payload is UTF-8 text: a statement on the way
//! in, a reply on the way out.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::error::{ServerError, ServerResult};

/// Default maximum payload size (1 MiB).
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 4;

/// Encodes a payload into a frame.
pub fn encode(payload: &str, max: usize) -> ServerResult<Bytes> {
    let size = payload.len();
    if size > max || u32::try_from(size).is_err() {
        return Err(ServerError::FrameTooLarge { size, max });
    }

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + size);
    buf.put_u32(size as u32);
    buf.put_slice(payload.as_bytes());
    Ok(buf.freeze())
}

/// Returns the payload length announced by a buffered header.
///
/// Returns `None` while fewer than `HEADER_SIZE` bytes are buffered.
pub fn payload_len(data: &[u8]) -> Option<usize> {
    let header: [u8; HEADER_SIZE] = data.get(..HEADER_SIZE)?.try_into().ok()?;
    Some(u32::from_be_bytes(header) as usize)
}

/// Takes one complete frame off the front of `buf`.
///
/// Returns `Ok(None)` if more data is needed. An oversized length is
/// rejected as soon as the header arrives.
pub fn decode(buf: &mut BytesMut, max: usize) -> ServerResult<Option<String>> {
    let Some(len) = payload_len(buf) else {
        return Ok(None);
    };
    if len > max {
        return Err(ServerError::FrameTooLarge { size: len, max });
    }
    if buf.len() < HEADER_SIZE + len {
        buf.reserve(HEADER_SIZE + len - buf.len());
        return Ok(None);
    }

    buf.advance(HEADER_SIZE);
    let payload = buf.split_to(len);
    String::from_utf8(payload.to_vec())
        .map(Some)
        .map_err(|e| ServerError::InvalidPayload(e.to_string()))
}
