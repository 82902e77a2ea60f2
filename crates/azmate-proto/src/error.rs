//! Error types for the protocol library.
//!
//! Decoding itself is infallible; errors only come from I/O and codec
//! construction.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Protocol-level errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The configured charset label is not known.
    #[error("unknown charset: {0}")]
    UnknownCharset(String),
}
