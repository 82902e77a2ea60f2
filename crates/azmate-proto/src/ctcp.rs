//! CTCP (Client-to-Client Protocol) handling.
//!
//! CTCP requests ride inside PRIVMSG bodies between `\x01` delimiters and
//! their replies inside NOTICE bodies. [`crate::Packet`] strips the
//! delimiters while decoding, so [`Ctcp::parse`] accepts both the wrapped
//! and the bare form.
//!
//! ```
//! use azmate_proto::ctcp::{Ctcp, CtcpKind};
//!
//! let ctcp = Ctcp::parse("PING 1700000000").unwrap();
//! assert_eq!(ctcp.kind, CtcpKind::Ping);
//! assert_eq!(ctcp.params, Some("1700000000"));
//!
//! assert_eq!(Ctcp::action("waves").to_string(), "\x01ACTION waves\x01");
//! ```

use std::fmt;

/// The CTCP delimiter character.
pub const CTCP_DELIM: char = '\x01';

/// Sub-commands this client answers, as advertised in CLIENTINFO replies.
pub const SUPPORTED_COMMANDS: &str = "ACTION AZMATE CLIENTINFO FINGER PING SOURCE TIME VERSION";

/// Body of the ERRMSG reply sent for unsupported requests.
pub const UNSUPPORTED_REPLY: &str =
    "CTCP Command not supported. Use CLIENTINFO to list supported commands.";

/// Known CTCP sub-commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CtcpKind {
    /// `/me` style action.
    Action,
    /// Client version request or reply.
    Version,
    /// Latency check; the token is echoed back.
    Ping,
    /// Local time request or reply.
    Time,
    /// User-defined info.
    Userinfo,
    /// List of supported sub-commands.
    Clientinfo,
    /// Source code location.
    Source,
    /// Legacy user info, answered like VERSION.
    Finger,
    /// Error reply to an unsupported request.
    Errmsg,
    /// The client's own identification token, `AZMATE`.
    Azmate,
    /// Anything else.
    Unknown(String),
}

impl CtcpKind {
    /// Parse a sub-command name, ignoring case.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "ACTION" => Self::Action,
            "VERSION" => Self::Version,
            "PING" => Self::Ping,
            "TIME" => Self::Time,
            "USERINFO" => Self::Userinfo,
            "CLIENTINFO" => Self::Clientinfo,
            "SOURCE" => Self::Source,
            "FINGER" => Self::Finger,
            "ERRMSG" => Self::Errmsg,
            "AZMATE" => Self::Azmate,
            _ => Self::Unknown(name.to_owned()),
        }
    }

    /// Canonical uppercase name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Action => "ACTION",
            Self::Version => "VERSION",
            Self::Ping => "PING",
            Self::Time => "TIME",
            Self::Userinfo => "USERINFO",
            Self::Clientinfo => "CLIENTINFO",
            Self::Source => "SOURCE",
            Self::Finger => "FINGER",
            Self::Errmsg => "ERRMSG",
            Self::Azmate => "AZMATE",
            Self::Unknown(s) => s,
        }
    }

    /// Whether a NOTICE carrying this sub-command is a reply to one of our
    /// requests rather than something to display.
    pub fn is_reply(&self) -> bool {
        !matches!(self, Self::Action | Self::Azmate | Self::Unknown(_))
    }
}

impl fmt::Display for CtcpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A CTCP request or reply borrowed from a message body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    /// The sub-command.
    pub kind: CtcpKind,
    /// Everything after the first space, if non-empty.
    pub params: Option<&'a str>,
}

impl<'a> Ctcp<'a> {
    /// Parse a CTCP body, with or without the surrounding delimiters.
    ///
    /// Returns `None` for an empty body.
    pub fn parse(text: &'a str) -> Option<Self> {
        let text = text.strip_prefix(CTCP_DELIM).unwrap_or(text);
        let text = text.strip_suffix(CTCP_DELIM).unwrap_or(text);

        let (command, params) = match text.split_once(' ') {
            Some((command, params)) => (command, Some(params).filter(|p| !p.is_empty())),
            None => (text, None),
        };
        if command.is_empty() {
            return None;
        }

        Some(Self {
            kind: CtcpKind::parse(command),
            params,
        })
    }

    /// Whether a message body is wrapped in CTCP delimiters.
    #[inline]
    pub fn is_ctcp(text: &str) -> bool {
        text.len() >= 2 && text.starts_with(CTCP_DELIM) && text.ends_with(CTCP_DELIM)
    }

    /// An ACTION carrying `text`.
    pub fn action(text: &'a str) -> Self {
        Self::new(CtcpKind::Action, Some(text))
    }

    /// A CTCP with the given kind and parameters.
    pub fn new(kind: CtcpKind, params: Option<&'a str>) -> Self {
        Self { kind, params }
    }

    /// A CTCP with an arbitrary command word.
    pub fn custom(command: &str, params: Option<&'a str>) -> Self {
        Self::new(CtcpKind::parse(command), params)
    }
}

impl fmt::Display for Ctcp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CTCP_DELIM}{}", self.kind)?;
        if let Some(params) = self.params {
            write!(f, " {params}")?;
        }
        write!(f, "{CTCP_DELIM}")
    }
}
