//! # azmate-proto
//!
//! Protocol primitives for the Azmate IRC client engine.
//!
//! ## Features
//!
//! - Permissive decoding of raw server lines into [`Packet`]s
//! - mIRC color/formatting stripping and color helpers
//! - CTCP request/reply handling
//! - Outgoing command construction with the 512-byte line limit in mind
//! - Channel role (voice, op, ...) mode parsing
//! - Optional Tokio line codec with charset support
//!
//! ## Quick Start
//!
//! ```rust
//! use azmate_proto::{command, FormattedStringExt, Packet};
//!
//! let line = ":nick!user@host PRIVMSG #chan :\x02hello\x02";
//! let packet = Packet::parse(&line.strip_formatting());
//!
//! assert_eq!(packet.command, "PRIVMSG");
//! assert_eq!(packet.arguments.as_deref(), Some("#chan"));
//! assert_eq!(packet.message.as_deref(), Some("hello"));
//! assert_eq!(packet.sender.as_ref().map(|p| p.nick.as_str()), Some("nick"));
//!
//! assert_eq!(command::privmsg("#chan", "hi"), "PRIVMSG #chan :hi");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod casemap;
pub mod chan;
pub mod colors;
pub mod command;
pub mod ctcp;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod mode;
pub mod numeric;
pub mod packet;
pub mod prefix;

pub use self::casemap::{irc_eq, irc_lower_char, irc_to_lower};
pub use self::chan::{is_channel_prefix, ChannelExt, CHANNEL_PREFIXES};
pub use self::colors::{colorize, colorize_bg, Color, FormattedStringExt};
pub use self::ctcp::{Ctcp, CtcpKind};
pub use self::error::ProtocolError;
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::mode::{parse_role_changes, split_prefix, Role, RoleChange};
pub use self::packet::Packet;
pub use self::prefix::Prefix;

/// Maximum length of an outgoing line, terminator included.
pub const MAX_LINE_LEN: usize = 512;

/// Maximum length of an outgoing line's payload, leaving room for `\r\n`.
pub const MAX_PAYLOAD_LEN: usize = MAX_LINE_LEN - 2;
