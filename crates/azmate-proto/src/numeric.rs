//! Numeric replies the engine acts on.

/// Welcome.
pub const RPL_WELCOME: u16 = 1;
/// Host and version.
pub const RPL_YOURHOST: u16 = 2;
/// Server creation date.
pub const RPL_CREATED: u16 = 3;
/// Server info; registration is complete once this arrives.
pub const RPL_MYINFO: u16 = 4;
/// Redirect to another server.
pub const RPL_BOUNCE: u16 = 10;
/// Channel topic.
pub const RPL_TOPIC: u16 = 332;
/// One page of a NAMES listing.
pub const RPL_NAMREPLY: u16 = 353;
/// End of a NAMES listing.
pub const RPL_ENDOFNAMES: u16 = 366;
/// One line of the message of the day.
pub const RPL_MOTD: u16 = 372;
/// End of the message of the day.
pub const RPL_ENDOFMOTD: u16 = 376;
/// Unknown command.
pub const ERR_UNKNOWNCOMMAND: u16 = 421;
/// Nickname contains invalid characters.
pub const ERR_ERRONEUSNICKNAME: u16 = 432;
/// Nickname already taken.
pub const ERR_NICKNAMEINUSE: u16 = 433;
/// Wrong server password.
pub const ERR_PASSWDMISMATCH: u16 = 464;

/// Whether a numeric rejects the requested nickname.
pub fn is_nick_rejection(code: u16) -> bool {
    matches!(code, ERR_ERRONEUSNICKNAME | ERR_NICKNAMEINUSE)
}
