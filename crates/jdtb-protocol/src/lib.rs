//! Worker Protocol Types
//!
//! Defines the binary framed request/response records exchanged between the
//! build orchestrator and a persistent worker over the worker's standard
//! streams. Each message is a 4-byte big-endian length prefix followed by
//! exactly that many bytes of a JSON-encoded record.

pub mod error;
pub mod framing;
pub mod request;
pub mod response;

pub use error::ProtocolError;
pub use framing::{read_message, write_message};
pub use request::WorkRequest;
pub use response::WorkResponse;

/// Upper bound on a single framed message, request or response.
///
/// A length prefix above this is treated as protocol desynchronization
/// rather than an allocation request.
pub const MAX_MESSAGE_BYTES: u32 = 16 * 1024 * 1024;
