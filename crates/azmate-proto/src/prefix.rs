//! Message source prefixes.
//!
//! A prefix is either `nick!user@host`, `nick@host`, or a bare name (a
//! server or a nickname with nothing else known). Parsing never fails.

use std::fmt;
use std::str::FromStr;

/// The resolved sender of a packet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Prefix {
    /// Nickname, or the server name for server-originated lines.
    pub nick: String,
    /// Username (ident), when present.
    pub user: Option<String>,
    /// Hostname, when present.
    pub host: Option<String>,
}

impl Prefix {
    /// Build a full `nick!user@host` prefix.
    pub fn new(nick: impl Into<String>, user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            user: Some(user.into()),
            host: Some(host.into()),
        }
    }

    /// Leniently parse a prefix string (without the leading `:`).
    pub fn parse(s: &str) -> Self {
        let (rest, host) = match s.split_once('@') {
            Some((rest, host)) if !rest.is_empty() => (rest, non_empty(host)),
            _ => (s, None),
        };
        let (nick, user) = match rest.split_once('!') {
            Some((nick, user)) if !nick.is_empty() => (nick, non_empty(user)),
            _ => (rest, None),
        };

        Self {
            nick: nick.to_owned(),
            user,
            host,
        }
    }

    /// True when only a name is known and it looks like a server.
    pub fn is_server(&self) -> bool {
        self.user.is_none() && self.host.is_none() && self.nick.contains('.')
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_owned())
}

impl FromStr for Prefix {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Prefix {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.nick)?;
        if let Some(user) = &self.user {
            write!(f, "!{user}")?;
        }
        if let Some(host) = &self.host {
            write!(f, "@{host}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_mask() {
        let p = Prefix::parse("nick!user@host.example");
        assert_eq!(p, Prefix::new("nick", "user", "host.example"));
        assert!(!p.is_server());
    }

    #[test]
    fn test_bare_nick() {
        let p = Prefix::parse("alice");
        assert_eq!(p.nick, "alice");
        assert_eq!(p.user, None);
        assert_eq!(p.host, None);
    }

    #[test]
    fn test_server() {
        let p = Prefix::parse("irc.example.net");
        assert_eq!(p.nick, "irc.example.net");
        assert!(p.is_server());
    }

    #[test]
    fn test_nick_at_host() {
        let p = Prefix::parse("bob@10.0.0.1");
        assert_eq!(p.nick, "bob");
        assert_eq!(p.user, None);
        assert_eq!(p.host.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_degenerate() {
        assert_eq!(Prefix::parse("").nick, "");
        assert_eq!(Prefix::parse("!u@h").nick, "!u");
        assert_eq!(Prefix::parse("@h").nick, "@h");
    }

    #[test]
    fn test_display() {
        for raw in ["nick!user@host", "server.net", "bob@host"] {
            assert_eq!(Prefix::parse(raw).to_string(), raw);
        }
    }
}
