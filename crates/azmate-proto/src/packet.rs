//! Permissive packet decoding.
//!
//! A [`Packet`] is one server line split into its parts:
//!
//! ```text
//! [:<prefix> ]<command>[ <arguments>][ :<message>]
//! ```
//!
//! Decoding never fails. Missing parts come back as `None` and the
//! dispatcher decides what a half-formed line means.

use std::fmt;

use crate::ctcp::{Ctcp, CTCP_DELIM};
use crate::prefix::Prefix;

/// A decoded server line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Packet {
    /// Raw prefix text, without the leading `:`.
    pub prefix: Option<String>,
    /// Command word or numeric as received.
    pub command: String,
    /// Numeric reply code, when the command is all digits.
    pub numeric: Option<u16>,
    /// Space separated middle parameters.
    pub arguments: Option<String>,
    /// Trailing parameter, with CTCP delimiters removed.
    pub message: Option<String>,
    /// Whether the trailing parameter was CTCP-wrapped.
    pub ctcp: bool,
    /// Best-effort parse of the prefix.
    pub sender: Option<Prefix>,
}

impl Packet {
    /// Decode one line. Trailing CR/LF is ignored.
    ///
    /// Formatting codes should already be stripped; see
    /// [`crate::FormattedStringExt`].
    pub fn parse(line: &str) -> Self {
        let mut rest = line.trim_end_matches(['\r', '\n']);

        let prefix = match rest.strip_prefix(':') {
            Some(after) => {
                let (prefix, tail) = after.split_once(' ').unwrap_or((after, ""));
                rest = tail;
                Some(prefix.to_owned())
            }
            None => None,
        };

        let rest = rest.trim_start_matches(' ');
        let (command, rest) = rest.split_once(' ').unwrap_or((rest, ""));
        let rest = rest.trim_start_matches(' ');

        let (arguments, message) = if let Some(trailing) = rest.strip_prefix(':') {
            ("", Some(trailing))
        } else if let Some((args, trailing)) = rest.split_once(" :") {
            (args, Some(trailing))
        } else {
            (rest, None)
        };

        let mut ctcp = false;
        let message = message.map(|m| {
            if Ctcp::is_ctcp(m) {
                ctcp = true;
                m[CTCP_DELIM.len_utf8()..m.len() - CTCP_DELIM.len_utf8()].to_owned()
            } else {
                m.to_owned()
            }
        });

        let arguments = arguments.trim_end_matches(' ');
        let numeric = if !command.is_empty() && command.bytes().all(|b| b.is_ascii_digit()) {
            command.parse().ok()
        } else {
            None
        };

        Self {
            sender: prefix.as_deref().filter(|p| !p.is_empty()).map(Prefix::parse),
            prefix,
            command: command.to_owned(),
            numeric,
            arguments: (!arguments.is_empty()).then(|| arguments.to_owned()),
            message,
            ctcp,
        }
    }

    /// Build an outgoing-style packet with no prefix.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    /// Set the middle arguments.
    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }

    /// Set the trailing message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Middle arguments split on spaces.
    pub fn args(&self) -> Vec<&str> {
        self.arguments
            .as_deref()
            .map(|a| a.split(' ').filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    /// The `n`th middle argument.
    pub fn arg(&self, n: usize) -> Option<&str> {
        self.arguments
            .as_deref()?
            .split(' ')
            .filter(|s| !s.is_empty())
            .nth(n)
    }

    /// Middle arguments followed by the trailing message, if any.
    pub fn params(&self) -> Vec<&str> {
        let mut params = self.args();
        if let Some(message) = self.message.as_deref() {
            params.push(message);
        }
        params
    }

    /// Whether any middle arguments are present.
    pub fn has_arguments(&self) -> bool {
        self.arguments.as_deref().is_some_and(|a| !a.is_empty())
    }

    /// Whether a non-empty trailing message is present.
    pub fn has_message(&self) -> bool {
        self.message.as_deref().is_some_and(|m| !m.is_empty())
    }

    /// Whether the command matches `name`, ignoring ASCII case.
    pub fn is(&self, name: &str) -> bool {
        self.command.eq_ignore_ascii_case(name)
    }

    /// The sender's nickname, if a prefix was present.
    pub fn sender_nick(&self) -> Option<&str> {
        self.sender.as_ref().map(|p| p.nick.as_str())
    }

    /// The trailing message if present, otherwise the first argument.
    ///
    /// Servers disagree on whether JOIN and NICK carry their target as a
    /// middle or a trailing parameter.
    pub fn message_or_first_arg(&self) -> Option<&str> {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or_else(|| self.arg(0))
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = self.prefix.as_deref().filter(|p| !p.is_empty()) {
            write!(f, ":{prefix} ")?;
        }
        f.write_str(&self.command)?;
        if let Some(arguments) = self.arguments.as_deref().filter(|a| !a.is_empty()) {
            write!(f, " {arguments}")?;
        }
        if let Some(message) = self.message.as_deref() {
            if self.ctcp {
                write!(f, " :{CTCP_DELIM}{message}{CTCP_DELIM}")?;
            } else {
                write!(f, " :{message}")?;
            }
        }
        Ok(())
    }
}
