//! Outgoing command construction.
//!
//! Each function returns one line without its terminator. The writer adds
//! the terminator and enforces the length limit via [`truncate`].

use crate::ctcp::Ctcp;
use crate::MAX_PAYLOAD_LEN;

/// `PASS <password>`
pub fn pass(password: &str) -> String {
    format!("PASS {password}")
}

/// `NICK <nick>`
pub fn nick(nick: &str) -> String {
    format!("NICK {nick}")
}

/// `USER <username> 0 * :<realname>`
pub fn user(username: &str, realname: &str) -> String {
    format!("USER {username} 0 * :{realname}")
}

/// `QUIT [:<message>]`
pub fn quit(message: Option<&str>) -> String {
    match message {
        Some(m) => format!("QUIT :{m}"),
        None => "QUIT".to_owned(),
    }
}

/// `JOIN <channel>[ <key>]`
pub fn join(channel: &str, key: Option<&str>) -> String {
    match key {
        Some(k) => format!("JOIN {channel} {k}"),
        None => format!("JOIN {channel}"),
    }
}

/// `PART <channel>[ :<reason>]`
pub fn part(channel: &str, reason: Option<&str>) -> String {
    match reason {
        Some(r) => format!("PART {channel} :{r}"),
        None => format!("PART {channel}"),
    }
}

/// `PRIVMSG <target> :<text>`
pub fn privmsg(target: &str, text: &str) -> String {
    format!("PRIVMSG {target} :{text}")
}

/// `NOTICE <target> :<text>`
pub fn notice(target: &str, text: &str) -> String {
    format!("NOTICE {target} :{text}")
}

/// A CTCP request, carried in a PRIVMSG.
pub fn ctcp(target: &str, ctcp: &Ctcp<'_>) -> String {
    privmsg(target, &ctcp.to_string())
}

/// A CTCP reply, carried in a NOTICE.
pub fn ctcp_reply(target: &str, ctcp: &Ctcp<'_>) -> String {
    notice(target, &ctcp.to_string())
}

/// `MODE <target> <modes>`
pub fn mode(target: &str, modes: &str) -> String {
    format!("MODE {target} {modes}")
}

/// `KICK <channel> <nick>[ :<reason>]`
pub fn kick(channel: &str, nick: &str, reason: Option<&str>) -> String {
    match reason {
        Some(r) => format!("KICK {channel} {nick} :{r}"),
        None => format!("KICK {channel} {nick}"),
    }
}

/// `TOPIC <channel>[ :<topic>]`; without a topic this queries it.
pub fn topic(channel: &str, topic: Option<&str>) -> String {
    match topic {
        Some(t) => format!("TOPIC {channel} :{t}"),
        None => format!("TOPIC {channel}"),
    }
}

/// `NAMES <channel>`
pub fn names(channel: &str) -> String {
    format!("NAMES {channel}")
}

/// `AWAY[ :<reason>]`; without a reason this clears the away status.
pub fn away(reason: Option<&str>) -> String {
    match reason {
        Some(r) => format!("AWAY :{r}"),
        None => "AWAY".to_owned(),
    }
}

/// `MOTD`
pub fn motd() -> String {
    "MOTD".to_owned()
}

/// `PONG <token>`, echoing the PING argument verbatim.
pub fn pong(token: &str) -> String {
    format!("PONG {token}")
}

/// Cut `line` to at most 510 bytes without splitting a character.
pub fn truncate(line: &str) -> &str {
    if line.len() <= MAX_PAYLOAD_LEN {
        return line;
    }
    let mut end = MAX_PAYLOAD_LEN;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}
