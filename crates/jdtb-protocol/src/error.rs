//! Error types for the framed worker protocol.
//!
//! Any of these on the request/response stream is unrecoverable for the
//! worker process: once framing is lost there is no way to resynchronize,
//! so callers escalate to a non-zero process exit rather than retry.

use std::io;

/// Errors reading or writing the framed protocol stream.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("I/O error on protocol stream: {0}")]
    Io(#[from] io::Error),

    #[error("stream ended inside a frame (read {got} of {expected} bytes)")]
    TruncatedFrame { got: usize, expected: usize },

    #[error("frame of {len} bytes exceeds the {limit} byte message limit")]
    FrameTooLarge { len: u32, limit: u32 },

    #[error("malformed message body: {0}")]
    Malformed(#[from] serde_json::Error),
}
