//! Length-prefixed message framing.
//!
//! A frame is a 4-byte big-endian unsigned length followed by exactly that
//! many bytes of a JSON-encoded record. End-of-stream before the first
//! prefix byte is the clean shutdown signal; end-of-stream anywhere else is
//! a truncated frame.

use std::io::{ErrorKind, Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{ProtocolError, MAX_MESSAGE_BYTES};

/// Read one framed message.
///
/// Returns `Ok(None)` on a clean end-of-stream, i.e. zero bytes available
/// where the next length prefix would start.
pub fn read_message<R: Read, T: DeserializeOwned>(
    reader: &mut R,
) -> Result<Option<T>, ProtocolError> {
    let mut prefix = [0u8; 4];
    let mut filled = 0;
    while filled < prefix.len() {
        match reader.read(&mut prefix[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(ProtocolError::TruncatedFrame {
                    got: filled,
                    expected: prefix.len(),
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    let len = u32::from_be_bytes(prefix);
    if len > MAX_MESSAGE_BYTES {
        return Err(ProtocolError::FrameTooLarge {
            len,
            limit: MAX_MESSAGE_BYTES,
        });
    }

    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            ProtocolError::TruncatedFrame {
                got: 0,
                expected: len as usize,
            }
        } else {
            ProtocolError::Io(e)
        }
    })?;

    Ok(Some(serde_json::from_slice(&body)?))
}

/// Write one framed message and flush the stream.
pub fn write_message<W: Write, T: Serialize>(
    writer: &mut W,
    message: &T,
) -> Result<(), ProtocolError> {
    let body = serde_json::to_vec(message)?;
    if body.len() > MAX_MESSAGE_BYTES as usize {
        return Err(ProtocolError::FrameTooLarge {
            len: body.len() as u32,
            limit: MAX_MESSAGE_BYTES,
        });
    }
    writer.write_all(&(body.len() as u32).to_be_bytes())?;
    writer.write_all(&body)?;
    writer.flush()?;
    Ok(())
}
