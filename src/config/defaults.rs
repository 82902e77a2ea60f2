//! Default value functions for configuration.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_port() -> u16 {
    6667
}

// =============================================================================
// Connection Defaults
// =============================================================================

pub fn default_message_delay_ms() -> u64 {
    100
}

pub fn default_charset() -> String {
    "utf-8".to_string()
}

pub fn default_line_ending() -> String {
    "\r\n".to_string()
}

pub fn default_registration_timeout_secs() -> u64 {
    60
}

pub fn default_quit_timeout_secs() -> u64 {
    5
}

pub fn default_version() -> String {
    format!("Azmate IRC engine {}", env!("CARGO_PKG_VERSION"))
}
