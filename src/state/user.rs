//! Known users.

use std::sync::Arc;

use azmate_proto::{irc_to_lower, split_prefix, Prefix};
use parking_lot::RwLock;

/// A user shared between the user cache and every roster listing it.
pub type SharedUser = Arc<RwLock<User>>;

/// A user seen on the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    nick: String,
    nick_lower: String,
    username: Option<String>,
    hostname: Option<String>,
    realname: Option<String>,
}

impl User {
    /// A user known only by nickname. NAMES-style prefixes are stripped.
    pub fn new(nick: &str) -> Self {
        let (_, bare) = split_prefix(nick);
        Self {
            nick: bare.to_owned(),
            nick_lower: irc_to_lower(bare),
            username: None,
            hostname: None,
            realname: None,
        }
    }

    /// A user built from a message prefix.
    pub fn from_prefix(prefix: &Prefix) -> Self {
        let mut user = Self::new(&prefix.nick);
        user.username = prefix.user.clone();
        user.hostname = prefix.host.clone();
        user
    }

    pub(crate) fn into_shared(self) -> SharedUser {
        Arc::new(RwLock::new(self))
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// Lowercased nickname, used as the roster key.
    pub fn nick_lower(&self) -> &str {
        &self.nick_lower
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// The real name, or the nickname when none is known.
    pub fn realname(&self) -> &str {
        self.realname.as_deref().unwrap_or(&self.nick)
    }

    pub fn set_realname(&mut self, realname: impl Into<String>) {
        self.realname = Some(realname.into());
    }

    /// Change the nickname, stripping any NAMES-style prefix.
    pub fn set_nick(&mut self, nick: &str) {
        let (_, bare) = split_prefix(nick);
        self.nick = bare.to_owned();
        self.nick_lower = irc_to_lower(bare);
    }

    /// Fill in ident and host from a newer sighting.
    pub(crate) fn absorb(&mut self, prefix: &Prefix) {
        if prefix.user.is_some() {
            self.username = prefix.user.clone();
        }
        if prefix.host.is_some() {
            self.hostname = prefix.host.clone();
        }
    }

    /// The `nick!user@host` mask, with `*` for unknown parts.
    pub fn mask(&self) -> String {
        format!(
            "{}!{}@{}",
            self.nick,
            self.username.as_deref().unwrap_or("*"),
            self.hostname.as_deref().unwrap_or("*")
        )
    }

    /// Ban mask: `*!*@host` when the host is known, otherwise `nick!*@*`.
    pub fn ban_mask(&self) -> String {
        match self.hostname.as_deref() {
            Some(host) => format!("*!*@{host}"),
            None => format!("{}!*@*", self.nick),
        }
    }
}

/// Target to use when sending to `nick`.
///
/// Without an override this is the nickname. An override starting with
/// `@` is appended to the nickname (`nick@server`); any other override
/// replaces the target entirely.
pub fn send_address(nick: &str, custom: Option<&str>) -> String {
    match custom {
        None => nick.to_owned(),
        Some(addr) if addr.starts_with('@') => format!("{nick}{addr}"),
        Some(addr) => addr.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_strips_names_prefix() {
        let user = User::new("@Alice");
        assert_eq!(user.nick(), "Alice");
        assert_eq!(user.nick_lower(), "alice");
    }

    #[test]
    fn from_prefix_keeps_ident_and_host() {
        let user = User::from_prefix(&Prefix::new("Bob", "~bob", "host.example"));
        assert_eq!(user.username(), Some("~bob"));
        assert_eq!(user.hostname(), Some("host.example"));
        assert_eq!(user.mask(), "Bob!~bob@host.example");
    }

    #[test]
    fn realname_falls_back_to_nick() {
        let mut user = User::new("carol");
        assert_eq!(user.realname(), "carol");
        user.set_realname("Carol C");
        assert_eq!(user.realname(), "Carol C");
    }

    #[test]
    fn send_addresses() {
        assert_eq!(send_address("dave", None), "dave");
        assert_eq!(
            send_address("dave", Some("@services.example")),
            "dave@services.example"
        );
        assert_eq!(
            send_address("dave", Some("NickServ@services.example")),
            "NickServ@services.example"
        );
    }

    #[test]
    fn ban_masks() {
        assert_eq!(User::new("eve").ban_mask(), "eve!*@*");
        let user = User::from_prefix(&Prefix::new("eve", "e", "evil.example"));
        assert_eq!(user.ban_mask(), "*!*@evil.example");
    }

    #[test]
    fn absorb_only_overwrites_known_parts() {
        let mut user = User::from_prefix(&Prefix::new("f", "ident", "host"));
        user.absorb(&Prefix::parse("f"));
        assert_eq!(user.hostname(), Some("host"));
        user.absorb(&Prefix::parse("f!other@elsewhere"));
        assert_eq!(user.username(), Some("other"));
        assert_eq!(user.hostname(), Some("elsewhere"));
    }
}
