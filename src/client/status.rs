//! Connection lifecycle states.

use std::fmt;

/// Where the connection is in its lifecycle.
///
/// ```text
/// Disconnected → Connecting → AwaitingRegistration → Connected
///      ↑                                                 │
///      └────────────────── Disconnecting ◀───────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    /// Opening the socket.
    Connecting,
    /// Socket open, waiting for the server to accept the registration.
    AwaitingRegistration,
    Connected,
    /// QUIT sent or the socket failed; cleanup in progress.
    Disconnecting,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }

    pub fn is_disconnected(self) -> bool {
        self == Self::Disconnected
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::AwaitingRegistration => "awaiting_registration",
            Self::Connected => "connected",
            Self::Disconnecting => "disconnecting",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
