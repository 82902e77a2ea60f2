//! Configuration validation.
//!
//! Catches mistakes before a socket is opened.

use azmate_proto::LineCodec;
use thiserror::Error;

use super::ClientConfig;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("server.address is required")]
    MissingAddress,
    #[error("server.port must not be 0")]
    InvalidPort,
    #[error("identity.nickname is required")]
    MissingNickname,
    #[error("identity.nickname must not contain spaces, got '{0}'")]
    InvalidNickname(String),
    #[error("connection.charset is not a known encoding: {0}")]
    UnknownCharset(String),
    #[error("connection.line_ending must not be empty")]
    EmptyLineEnding,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.address.trim().is_empty() {
        errors.push(ValidationError::MissingAddress);
    }
    if config.server.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }

    let nick = &config.identity.nickname;
    if nick.is_empty() {
        errors.push(ValidationError::MissingNickname);
    } else if nick.contains(char::is_whitespace) {
        errors.push(ValidationError::InvalidNickname(nick.clone()));
    }

    if !LineCodec::is_known_charset(&config.connection.charset) {
        errors.push(ValidationError::UnknownCharset(
            config.connection.charset.clone(),
        ));
    }
    if config.connection.line_ending.is_empty() {
        errors.push(ValidationError::EmptyLineEnding);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
