//! Per-connection client state.
//!
//! [`ClientState`] holds the local identity, the joined channels and a
//! single user cache. Rosters reference cached users rather than copying
//! them, so a host or nickname change is seen everywhere at once. Only the
//! reader task mutates membership; any task may read.
//!
//! Send-address overrides are kept apart from the user cache: they are
//! host configuration, so they outlive reconnects and roster changes and
//! follow their user through NICK.

mod channel;
mod dashmap_ext;
mod user;

use std::sync::Arc;

use azmate_proto::{irc_eq, irc_to_lower, Prefix};
use dashmap::DashMap;
use parking_lot::RwLock;

pub use channel::{Channel, Member};
pub use user::{SharedUser, User};

use dashmap_ext::DashMapExt;
use user::send_address;

/// The local client's registration identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub nickname: String,
    pub username: String,
    pub realname: String,
}

/// Channels, users and identity for one connection.
#[derive(Debug)]
pub struct ClientState {
    identity: RwLock<ClientIdentity>,
    channels: DashMap<String, Arc<Channel>>,
    users: DashMap<String, SharedUser>,
    /// Send-address overrides keyed by lowercase nick.
    addresses: DashMap<String, String>,
}

impl ClientState {
    pub fn new(identity: ClientIdentity) -> Self {
        Self {
            identity: RwLock::new(identity),
            channels: DashMap::new(),
            users: DashMap::new(),
            addresses: DashMap::new(),
        }
    }

    // ========================================================================
    // Identity
    // ========================================================================

    pub fn identity(&self) -> ClientIdentity {
        self.identity.read().clone()
    }

    /// The current local nickname.
    pub fn nick(&self) -> String {
        self.identity.read().nickname.clone()
    }

    pub fn set_nick(&self, nick: &str) {
        self.identity.write().nickname = nick.to_owned();
    }

    /// Whether `nick` is the local client.
    pub fn is_us(&self, nick: &str) -> bool {
        irc_eq(nick, &self.identity.read().nickname)
    }

    // ========================================================================
    // Channels
    // ========================================================================

    /// A registered (joined) channel.
    pub fn channel(&self, name: &str) -> Option<Arc<Channel>> {
        self.channels.get_cloned(&irc_to_lower(name))
    }

    /// A registered channel, or an unregistered reference without roster.
    pub fn channel_or_reference(&self, name: &str) -> Arc<Channel> {
        self.channel(name)
            .unwrap_or_else(|| Arc::new(Channel::reference(name)))
    }

    /// Register a freshly joined channel, replacing any stale entry.
    pub fn add_channel(&self, name: &str) -> Arc<Channel> {
        let channel = Arc::new(Channel::joined(name));
        self.channels
            .insert(channel.key().to_owned(), Arc::clone(&channel));
        channel
    }

    /// Deregister a channel and forget users no longer seen anywhere.
    pub fn remove_channel(&self, name: &str) -> Option<Arc<Channel>> {
        let (_, channel) = self.channels.remove(&irc_to_lower(name))?;
        for member in channel.members() {
            let nick = member.nick();
            self.prune_user(&nick);
        }
        Some(channel)
    }

    /// Snapshot of every registered channel.
    pub fn channels(&self) -> Vec<Arc<Channel>> {
        self.channels.values_cloned()
    }

    /// Drop every channel and cached user. Send-address overrides stay.
    pub fn clear(&self) {
        self.channels.clear();
        self.users.clear();
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub fn user(&self, nick: &str) -> Option<SharedUser> {
        self.users.get_cloned(&irc_to_lower(nick))
    }

    /// The cached user for a message prefix, created if unknown. Ident and
    /// host are refreshed in place.
    pub fn user_from_prefix(&self, prefix: &Prefix) -> SharedUser {
        let key = irc_to_lower(&prefix.nick);
        if let Some(user) = self.users.get_cloned(&key) {
            user.write().absorb(prefix);
            return user;
        }
        self.users
            .entry(key)
            .or_insert_with(|| User::from_prefix(prefix).into_shared())
            .clone()
    }

    /// The cached user for a bare nickname, created if unknown.
    pub fn user_from_nick(&self, nick: &str) -> SharedUser {
        let user = User::new(nick);
        self.users
            .entry(user.nick_lower().to_owned())
            .or_insert_with(|| user.into_shared())
            .clone()
    }

    /// Rename a user in the cache and in every roster listing them.
    ///
    /// Privilege prefixes stay with the roster entry. Returns the channels
    /// the user was listed in.
    pub fn rename_user(&self, old: &str, new: &str) -> Vec<Arc<Channel>> {
        let old_lower = irc_to_lower(old);
        let user = match self.users.remove(&old_lower) {
            Some((_, user)) => user,
            None => User::new(old).into_shared(),
        };
        user.write().set_nick(new);
        let new_lower = user.read().nick_lower().to_owned();

        if let Some((_, address)) = self.addresses.remove(&old_lower) {
            self.addresses.insert(new_lower.clone(), address);
        }

        let touched: Vec<_> = self
            .channels()
            .into_iter()
            .filter(|chan| chan.rekey_member(&old_lower, &new_lower))
            .collect();

        if !touched.is_empty() || self.is_us(new) {
            self.users.insert(new_lower, user);
        }
        touched
    }

    /// Remove a user from every roster and from the cache.
    ///
    /// Returns the channels the user was listed in.
    pub fn remove_user(&self, nick: &str) -> Vec<Arc<Channel>> {
        let touched: Vec<_> = self
            .channels()
            .into_iter()
            .filter(|chan| chan.remove_member(nick).is_some())
            .collect();
        self.users.remove(&irc_to_lower(nick));
        touched
    }

    /// Forget a cached user who is in no roster.
    pub fn prune_user(&self, nick: &str) {
        if self.is_us(nick) {
            return;
        }
        if !self.channels.iter().any(|c| c.value().contains(nick)) {
            self.users.remove(&irc_to_lower(nick));
        }
    }

    /// Number of cached users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    // ========================================================================
    // Send addresses
    // ========================================================================

    /// Set or clear (`None` or empty) the send-address override for `nick`.
    pub fn set_custom_address(&self, nick: &str, address: Option<String>) {
        let key = irc_to_lower(nick);
        match address.filter(|a| !a.is_empty()) {
            Some(address) => {
                self.addresses.insert(key, address);
            }
            None => {
                self.addresses.remove(&key);
            }
        }
    }

    pub fn custom_address(&self, nick: &str) -> Option<String> {
        self.addresses.get_cloned(&irc_to_lower(nick))
    }

    /// Where messages for `nick` go, honouring any override.
    pub fn address_of(&self, nick: &str) -> String {
        send_address(nick, self.custom_address(nick).as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ClientState {
        ClientState::new(ClientIdentity {
            nickname: "me".into(),
            username: "me".into(),
            realname: "Me".into(),
        })
    }

    fn join(state: &ClientState, chan: &str, nick: &str, prefix: Option<char>) {
        let user = state.user_from_nick(nick);
        state.channel(chan).unwrap().upsert_member(user, prefix);
    }

    #[test]
    fn channel_keys_are_lowercase() {
        let s = state();
        s.add_channel("#Rust");
        assert!(s.channel("#RUST").is_some());
        assert_eq!(s.channels()[0].key(), "#rust");
    }

    #[test]
    fn reference_is_not_registered() {
        let s = state();
        let chan = s.channel_or_reference("#elsewhere");
        assert!(!chan.is_joined());
        assert!(s.channel("#elsewhere").is_none());
    }

    #[test]
    fn rosters_share_one_user() {
        let s = state();
        s.add_channel("#a");
        s.add_channel("#b");
        join(&s, "#a", "alice", None);
        join(&s, "#b", "alice", None);

        s.user_from_prefix(&Prefix::new("alice", "al", "new.host"));
        for chan in ["#a", "#b"] {
            let member = s.channel(chan).unwrap().member("alice").unwrap();
            assert_eq!(member.snapshot().hostname(), Some("new.host"));
        }
        assert_eq!(s.user_count(), 1);
    }

    #[test]
    fn rename_everywhere_preserves_prefix() {
        let s = state();
        s.add_channel("#a");
        s.add_channel("#b");
        s.add_channel("#c");
        join(&s, "#a", "alice", Some('@'));
        join(&s, "#b", "alice", Some('+'));
        join(&s, "#c", "bob", None);

        let touched = s.rename_user("Alice", "alicia");
        assert_eq!(touched.len(), 2);

        let a = s.channel("#a").unwrap();
        assert!(!a.contains("alice"));
        assert!(a.member("alicia").unwrap().has_operator());
        assert!(s.channel("#b").unwrap().member("alicia").unwrap().has_voice());
        assert!(!s.channel("#c").unwrap().contains("alicia"));
        assert!(s.user("alice").is_none());
        assert_eq!(s.user("alicia").unwrap().read().nick(), "alicia");
    }

    #[test]
    fn remove_user_touches_only_listing_channels() {
        let s = state();
        s.add_channel("#a");
        s.add_channel("#b");
        s.add_channel("#c");
        join(&s, "#a", "bob", None);
        join(&s, "#b", "bob", None);
        join(&s, "#c", "carol", None);

        let touched = s.remove_user("bob");
        let mut names: Vec<_> = touched.iter().map(|c| c.name().to_owned()).collect();
        names.sort();
        assert_eq!(names, vec!["#a", "#b"]);
        assert_eq!(s.channel("#c").unwrap().member_count(), 1);
        assert!(s.user("bob").is_none());
    }

    #[test]
    fn leaving_a_channel_prunes_unshared_users() {
        let s = state();
        s.add_channel("#a");
        s.add_channel("#b");
        join(&s, "#a", "alice", None);
        join(&s, "#a", "bob", None);
        join(&s, "#b", "bob", None);

        s.remove_channel("#a");
        assert!(s.user("alice").is_none());
        assert!(s.user("bob").is_some());
    }

    #[test]
    fn identity() {
        let s = state();
        assert!(s.is_us("ME"));
        s.set_nick("other");
        assert!(s.is_us("Other"));
        assert_eq!(s.identity().nickname, "other");
    }

    #[test]
    fn addresses_outlive_cache_and_follow_renames() {
        let s = state();
        s.set_custom_address("Bob", Some("@services.example".into()));
        assert_eq!(s.address_of("bob"), "bob@services.example");

        s.add_channel("#a");
        join(&s, "#a", "bob", None);
        s.remove_channel("#a");
        s.clear();
        assert!(s.user("bob").is_none());
        assert_eq!(s.address_of("bob"), "bob@services.example");

        s.rename_user("bob", "robert");
        assert_eq!(s.custom_address("bob"), None);
        assert_eq!(s.address_of("robert"), "robert@services.example");

        s.set_custom_address("robert", Some(String::new()));
        assert_eq!(s.address_of("robert"), "robert");
    }

    #[test]
    fn clear() {
        let s = state();
        s.add_channel("#a");
        join(&s, "#a", "alice", None);
        s.clear();
        assert!(s.channels().is_empty());
        assert_eq!(s.user_count(), 0);
    }
}
