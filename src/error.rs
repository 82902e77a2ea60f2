//! Error types for the client engine.
//!
//! Registration failures come back from [`crate::IrcClient::connect`] as
//! [`ConnectError`]. Failures after registration are never returned: the
//! reader tears the connection down and publishes
//! [`crate::Event::Disconnected`].

use std::io;

use azmate_proto::ProtocolError;
use thiserror::Error;

use crate::config::ValidationError;

// ============================================================================
// Connect Errors (registration handshake)
// ============================================================================

/// Errors that can occur while connecting and registering.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConnectError {
    #[error("invalid configuration: {}", join_errors(.0))]
    Configuration(Vec<ValidationError>),

    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    #[error("tls error: {0}")]
    Tls(String),

    /// The server refused the nickname (432 or 433).
    #[error("nickname {nick} rejected ({code}): {reason}")]
    Nickname {
        code: u16,
        nick: String,
        reason: String,
    },

    /// The server refused the password (464).
    #[error("password rejected: {0}")]
    Password(String),

    #[error("server closed the connection during registration")]
    ClosedDuringRegistration,

    #[error("registration did not complete within {0:?}")]
    RegistrationTimeout(std::time::Duration),

    #[error("already connected")]
    AlreadyConnected,
}

impl ConnectError {
    /// Get a static error code string for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Transport(_) => "transport",
            Self::Tls(_) => "tls",
            Self::Nickname { .. } => "nickname",
            Self::Password(_) => "password",
            Self::ClosedDuringRegistration => "closed",
            Self::RegistrationTimeout(_) => "timeout",
            Self::AlreadyConnected => "already_connected",
        }
    }
}

impl From<ProtocolError> for ConnectError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Io(e) => Self::Transport(e),
            other => Self::Transport(io::Error::new(io::ErrorKind::InvalidData, other)),
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Send Errors (outgoing commands)
// ============================================================================

/// Errors from the outgoing command operations.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SendError {
    #[error("not connected")]
    NotConnected,

    #[error("invalid target: {0:?}")]
    InvalidTarget(String),
}
