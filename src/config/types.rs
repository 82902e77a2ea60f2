//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Client configuration for one connection.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Server to connect to.
    pub server: ServerConfig,
    /// Who we register as.
    pub identity: IdentityConfig,
    /// Flood control, charset and protocol knobs.
    #[serde(default)]
    pub connection: ConnectionConfig,
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// A plaintext configuration with defaults for everything else.
    pub fn new(address: impl Into<String>, port: u16, nickname: impl Into<String>) -> Self {
        Self {
            server: ServerConfig {
                address: address.into(),
                port,
                password: None,
                tls: false,
                verify_tls: true,
            },
            identity: IdentityConfig {
                nickname: nickname.into(),
                username: None,
                realname: None,
            },
            connection: ConnectionConfig::default(),
        }
    }
}

/// Server endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Hostname or IP address.
    pub address: String,
    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Server password, sent as PASS before registering.
    pub password: Option<String>,
    /// Wrap the connection in TLS.
    #[serde(default)]
    pub tls: bool,
    /// Verify the server certificate against the system roots.
    #[serde(default = "default_true")]
    pub verify_tls: bool,
}

/// Registration identity.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Requested nickname. The server may hand back a different one.
    #[serde(default)]
    pub nickname: String,
    /// Ident username; defaults to the nickname.
    pub username: Option<String>,
    /// Real name; defaults to the nickname.
    pub realname: Option<String>,
}

impl IdentityConfig {
    /// Username to register with.
    pub fn username(&self) -> &str {
        self.username
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.nickname)
    }

    /// Real name to register with.
    pub fn realname(&self) -> &str {
        self.realname
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(&self.nickname)
    }
}

/// Connection behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Delay between queued lines in milliseconds. 0 disables flood control.
    #[serde(default = "default_message_delay_ms")]
    pub message_delay_ms: u64,
    /// Charset label understood by encoding_rs.
    #[serde(default = "default_charset")]
    pub charset: String,
    /// Follow RPL_BOUNCE redirects.
    #[serde(default)]
    pub allow_bounce: bool,
    /// Terminator appended to outgoing lines.
    #[serde(default = "default_line_ending")]
    pub line_ending: String,
    /// Give up on registration after this many seconds. 0 waits forever.
    #[serde(default = "default_registration_timeout_secs")]
    pub registration_timeout_secs: u64,
    /// How long to wait for the server to close after QUIT.
    #[serde(default = "default_quit_timeout_secs")]
    pub quit_timeout_secs: u64,
    /// Log every raw line in and out at debug level.
    #[serde(default)]
    pub log_raw_lines: bool,
    /// CTCP VERSION/FINGER reply.
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            message_delay_ms: default_message_delay_ms(),
            charset: default_charset(),
            allow_bounce: false,
            line_ending: default_line_ending(),
            registration_timeout_secs: default_registration_timeout_secs(),
            quit_timeout_secs: default_quit_timeout_secs(),
            log_raw_lines: false,
            version: default_version(),
        }
    }
}

impl ConnectionConfig {
    /// Inter-message delay.
    pub fn message_delay(&self) -> Duration {
        Duration::from_millis(self.message_delay_ms)
    }

    /// Registration timeout, if enabled.
    pub fn registration_timeout(&self) -> Option<Duration> {
        (self.registration_timeout_secs > 0)
            .then(|| Duration::from_secs(self.registration_timeout_secs))
    }

    /// Grace period after QUIT.
    pub fn quit_timeout(&self) -> Duration {
        Duration::from_secs(self.quit_timeout_secs)
    }
}
