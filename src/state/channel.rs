//! Channels and their rosters.

use azmate_proto::{irc_to_lower, Role};
use dashmap::DashMap;
use parking_lot::RwLock;

use super::dashmap_ext::DashMapExt;
use super::user::{SharedUser, User};

/// A roster entry: the shared user plus this channel's privilege prefix.
#[derive(Debug, Clone)]
pub struct Member {
    pub user: SharedUser,
    /// NAMES prefix character (`@`, `+`, ...), if any.
    pub prefix: Option<char>,
}

impl Member {
    pub fn nick(&self) -> String {
        self.user.read().nick().to_owned()
    }

    /// Snapshot of the underlying user.
    pub fn snapshot(&self) -> User {
        self.user.read().clone()
    }

    /// The role shown by the prefix.
    pub fn role(&self) -> Option<Role> {
        self.prefix.and_then(Role::from_prefix_char)
    }

    pub fn has_voice(&self) -> bool {
        self.role() == Some(Role::Voice)
    }

    pub fn has_half_op(&self) -> bool {
        self.role() == Some(Role::HalfOp)
    }

    pub fn has_operator(&self) -> bool {
        self.role() == Some(Role::Operator)
    }

    pub fn has_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    pub fn has_founder(&self) -> bool {
        self.role() == Some(Role::Founder)
    }
}

/// A channel, joined (with a roster) or merely referenced.
#[derive(Debug)]
pub struct Channel {
    name: String,
    key: String,
    topic: RwLock<Option<String>>,
    roster: Option<DashMap<String, Member>>,
}

impl Channel {
    /// A channel the local client has joined.
    pub fn joined(name: &str) -> Self {
        Self::build(name, Some(DashMap::new()))
    }

    /// A channel referenced for sending only (an invite target, a message
    /// destination). It has no roster and is not registered.
    pub fn reference(name: &str) -> Self {
        Self::build(name, None)
    }

    fn build(name: &str, roster: Option<DashMap<String, Member>>) -> Self {
        Self {
            name: name.to_owned(),
            key: irc_to_lower(name),
            topic: RwLock::new(None),
            roster,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercased name, used as the channel map key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether this channel carries a roster.
    pub fn is_joined(&self) -> bool {
        self.roster.is_some()
    }

    pub fn topic(&self) -> Option<String> {
        self.topic.read().clone()
    }

    pub fn set_topic(&self, topic: Option<String>) {
        *self.topic.write() = topic;
    }

    /// Add a user, or refresh the prefix of one already listed.
    ///
    /// Returns `true` if the user was not listed before. A `None` prefix
    /// never clears a stored one, since JOIN and message traffic carry no
    /// privilege information.
    pub fn upsert_member(&self, user: SharedUser, prefix: Option<char>) -> bool {
        let Some(roster) = &self.roster else {
            return false;
        };
        let key = user.read().nick_lower().to_owned();
        match roster.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(mut e) => {
                if prefix.is_some() {
                    e.get_mut().prefix = prefix;
                }
                false
            }
            dashmap::mapref::entry::Entry::Vacant(e) => {
                e.insert(Member { user, prefix });
                true
            }
        }
    }

    /// Overwrite a listed user's prefix (`None` clears it).
    pub fn set_prefix(&self, nick: &str, prefix: Option<char>) {
        if let Some(mut member) = self
            .roster
            .as_ref()
            .and_then(|r| r.get_mut(&irc_to_lower(nick)))
        {
            member.prefix = prefix;
        }
    }

    pub fn remove_member(&self, nick: &str) -> Option<Member> {
        self.roster
            .as_ref()?
            .remove(&irc_to_lower(nick))
            .map(|(_, m)| m)
    }

    /// Move a roster entry to a new key, keeping its prefix.
    ///
    /// Returns `false` if the old nickname was not listed.
    pub(crate) fn rekey_member(&self, old_lower: &str, new_lower: &str) -> bool {
        let Some(roster) = &self.roster else {
            return false;
        };
        match roster.remove(old_lower) {
            Some((_, member)) => {
                roster.insert(new_lower.to_owned(), member);
                true
            }
            None => false,
        }
    }

    pub fn member(&self, nick: &str) -> Option<Member> {
        self.roster.as_ref()?.get_cloned(&irc_to_lower(nick))
    }

    pub fn contains(&self, nick: &str) -> bool {
        self.roster
            .as_ref()
            .is_some_and(|r| r.contains_key(&irc_to_lower(nick)))
    }

    pub fn members(&self) -> Vec<Member> {
        self.roster
            .as_ref()
            .map(|r| r.values_cloned())
            .unwrap_or_default()
    }

    pub fn member_count(&self) -> usize {
        self.roster.as_ref().map_or(0, DashMap::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(nick: &str) -> SharedUser {
        User::new(nick).into_shared()
    }

    #[test]
    fn reference_has_no_roster() {
        let chan = Channel::reference("#Rust");
        assert!(!chan.is_joined());
        assert_eq!(chan.key(), "#rust");
        assert!(!chan.upsert_member(user("alice"), None));
        assert_eq!(chan.member_count(), 0);
    }

    #[test]
    fn upsert_keeps_prefix_on_plain_rejoin() {
        let chan = Channel::joined("#rust");
        assert!(chan.upsert_member(user("Alice"), Some('@')));
        assert!(!chan.upsert_member(user("alice"), None));
        assert_eq!(chan.member_count(), 1);
        assert!(chan.member("ALICE").unwrap().has_operator());

        chan.upsert_member(user("alice"), Some('+'));
        assert!(chan.member("alice").unwrap().has_voice());
    }

    #[test]
    fn rekey_preserves_prefix() {
        let chan = Channel::joined("#rust");
        chan.upsert_member(user("bob"), Some('%'));
        assert!(chan.rekey_member("bob", "robert"));
        assert!(!chan.contains("bob"));
        assert!(chan.member("robert").unwrap().has_half_op());
        assert!(!chan.rekey_member("nobody", "x"));
    }

    #[test]
    fn set_prefix_and_remove() {
        let chan = Channel::joined("#rust");
        chan.upsert_member(user("carol"), Some('~'));
        assert!(chan.member("carol").unwrap().has_founder());
        chan.set_prefix("carol", None);
        assert_eq!(chan.member("carol").unwrap().role(), None);

        assert!(chan.remove_member("CAROL").is_some());
        assert!(chan.remove_member("carol").is_none());
    }

    #[test]
    fn topic() {
        let chan = Channel::joined("#rust");
        assert_eq!(chan.topic(), None);
        chan.set_topic(Some("hello".into()));
        assert_eq!(chan.topic().as_deref(), Some("hello"));
    }
}
