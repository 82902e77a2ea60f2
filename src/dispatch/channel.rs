//! Membership and channel metadata: JOIN, PART, KICK, QUIT, NICK,
//! INVITE, TOPIC and NAMES.

use azmate_proto::{split_prefix, Packet};
use tracing::debug;

use super::Dispatcher;
use crate::event::Event;
use crate::state::User;

impl Dispatcher {
    pub(super) fn on_join(&mut self, packet: Packet) {
        let (Some(prefix), Some(name)) = (packet.sender.as_ref(), packet.message_or_first_arg())
        else {
            return self.unknown(packet);
        };

        let channel = if self.state.is_us(&prefix.nick) {
            debug!(channel = %name, "joined channel");
            self.state.add_channel(name)
        } else {
            self.state.channel_or_reference(name)
        };

        let user = if channel.is_joined() {
            let user = self.state.user_from_prefix(prefix);
            channel.upsert_member(user.clone(), None);
            let snapshot = user.read().clone();
            snapshot
        } else {
            User::from_prefix(prefix)
        };

        self.publish(Event::Join { channel, user });
    }

    pub(super) fn on_part(&mut self, packet: Packet) {
        let Some(user) = self.sender_snapshot(&packet) else {
            return self.unknown(packet);
        };
        // Some servers send the channel as the trailing parameter.
        let reason = match packet.arg(0) {
            Some(_) => packet.message.clone().filter(|r| !r.is_empty()),
            None => None,
        };
        let Some(name) = packet.arg(0).or(packet.message.as_deref()) else {
            return self.unknown(packet);
        };

        let channel = if self.state.is_us(user.nick()) {
            debug!(channel = %name, "left channel");
            self.state
                .remove_channel(name)
                .unwrap_or_else(|| self.state.channel_or_reference(name))
        } else {
            let channel = self.state.channel_or_reference(name);
            channel.remove_member(user.nick());
            self.state.prune_user(user.nick());
            channel
        };

        self.publish(Event::Part {
            channel,
            user,
            reason,
        });
    }

    pub(super) fn on_kick(&mut self, packet: Packet) {
        let (Some(kicker), Some(name), Some(kicked_nick)) = (
            self.sender_snapshot(&packet),
            packet.arg(0),
            packet.arg(1),
        ) else {
            return self.unknown(packet);
        };
        let kicked = self.user_snapshot(kicked_nick);

        let channel = if self.state.is_us(kicked_nick) {
            debug!(channel = %name, by = %kicker.nick(), "kicked from channel");
            self.state
                .remove_channel(name)
                .unwrap_or_else(|| self.state.channel_or_reference(name))
        } else {
            let channel = self.state.channel_or_reference(name);
            channel.remove_member(kicked_nick);
            self.state.prune_user(kicked_nick);
            channel
        };

        self.publish(Event::Kick {
            channel,
            kicker,
            kicked,
            reason: packet.message.clone().filter(|r| !r.is_empty()),
        });
    }

    /// Published before the user leaves the rosters, so handlers can still
    /// see which channels they were in.
    pub(super) fn on_quit(&mut self, packet: Packet) {
        let Some(user) = self.sender_snapshot(&packet) else {
            return self.unknown(packet);
        };
        let nick = user.nick().to_owned();

        self.publish(Event::Quit {
            user,
            message: packet.message.clone().filter(|m| !m.is_empty()),
        });
        if !self.state.is_us(&nick) {
            self.state.remove_user(&nick);
        }
    }

    pub(super) fn on_nick(&mut self, packet: Packet) {
        let (Some(user), Some(new_nick)) =
            (self.sender_snapshot(&packet), packet.message_or_first_arg())
        else {
            return self.unknown(packet);
        };

        if self.state.is_us(user.nick()) {
            debug!(old = %user.nick(), new = %new_nick, "local nickname changed");
            self.state.set_nick(new_nick);
        }
        self.state.rename_user(user.nick(), new_nick);

        self.publish(Event::NickChanged {
            user,
            new_nick: new_nick.to_owned(),
        });
    }

    pub(super) fn on_invite(&mut self, packet: Packet) {
        let name = packet
            .message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or_else(|| packet.arg(1));
        let (Some(sender), Some(invitee), Some(name)) =
            (self.sender_snapshot(&packet), packet.arg(0), name)
        else {
            return self.unknown(packet);
        };

        self.publish(Event::Invite {
            sender,
            invitee: self.user_snapshot(invitee),
            channel: self.state.channel_or_reference(name),
        });
    }

    /// `TOPIC <channel> :<topic>` from a user.
    pub(super) fn on_topic(&mut self, packet: Packet) {
        let (Some(setter), Some(name)) = (self.sender_snapshot(&packet), packet.arg(0)) else {
            return self.unknown(packet);
        };
        self.apply_topic(name, packet.message.clone(), Some(setter));
    }

    /// RPL_TOPIC: `332 <me> <channel> :<topic>`.
    pub(super) fn on_topic_reply(&mut self, packet: Packet) {
        let Some(name) = packet.arg(1) else {
            return self.unknown(packet);
        };
        self.apply_topic(name, packet.message.clone(), None);
    }

    fn apply_topic(&self, name: &str, topic: Option<String>, setter: Option<User>) {
        let topic = topic.unwrap_or_default();
        let channel = self.state.channel_or_reference(name);
        channel.set_topic((!topic.is_empty()).then(|| topic.clone()));
        self.publish(Event::TopicChanged {
            channel,
            setter,
            topic,
        });
    }

    /// RPL_NAMREPLY: `353 <me> [=*@] <channel> :<names>`.
    pub(super) fn on_names_reply(&mut self, packet: Packet) {
        let Some(name) = packet.args().last().copied() else {
            return self.unknown(packet);
        };
        let Some(channel) = self.state.channel(name) else {
            debug!(channel = %name, "names for a channel we are not in");
            return self.unknown(packet);
        };

        for entry in packet.message.as_deref().unwrap_or_default().split_whitespace() {
            let (prefix, nick) = split_prefix(entry);
            if nick.is_empty() {
                continue;
            }
            let user = self.state.user_from_nick(nick);
            channel.upsert_member(user, prefix);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::Harness;
    use crate::event::{Event, EventKind};

    async fn joined(h: &mut Harness, chan: &str) {
        h.feed(&format!(":me!me@local JOIN {chan}")).await;
        h.take_events();
    }

    #[tokio::test]
    async fn our_join_creates_rostered_channel() {
        let mut h = Harness::new();
        h.feed(":me!me@local JOIN :#Rust").await;

        let chan = h.state.channel("#rust").unwrap();
        assert!(chan.is_joined());
        assert_eq!(chan.name(), "#Rust");
        assert_eq!(h.kinds(), vec![EventKind::Join]);
    }

    #[tokio::test]
    async fn others_join_grows_roster_by_one() {
        let mut h = Harness::new();
        joined(&mut h, "#c").await;
        let chan = h.state.channel("#c").unwrap();
        let before = chan.member_count();

        h.feed(":alice!a@host JOIN #c").await;
        assert_eq!(chan.member_count(), before + 1);
        match h.take_events().as_slice() {
            [Event::Join { user, channel }] => {
                assert_eq!(user.nick(), "alice");
                assert_eq!(channel.name(), "#c");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn our_part_deregisters_channel() {
        let mut h = Harness::new();
        joined(&mut h, "#c").await;
        h.feed(":alice!a@host JOIN #c").await;

        h.feed(":me!me@local PART #c :bye").await;
        assert!(h.state.channel("#c").is_none());
        assert!(h.state.user("alice").is_none());
        match h.take_events().last() {
            Some(Event::Part { reason, .. }) => assert_eq!(reason.as_deref(), Some("bye")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn part_with_trailing_channel() {
        let mut h = Harness::new();
        joined(&mut h, "#c").await;
        h.feed(":alice!a@host JOIN #c").await;
        h.feed(":alice!a@host PART :#c").await;
        assert!(!h.state.channel("#c").unwrap().contains("alice"));
    }

    #[tokio::test]
    async fn kick_removes_target_or_channel() {
        let mut h = Harness::new();
        joined(&mut h, "#c").await;
        h.feed(":bob!b@host JOIN #c").await;

        h.feed(":op!o@host KICK #c bob :behave").await;
        assert!(!h.state.channel("#c").unwrap().contains("bob"));
        match h.take_events().last() {
            Some(Event::Kick {
                kicker,
                kicked,
                reason,
                ..
            }) => {
                assert_eq!(kicker.nick(), "op");
                assert_eq!(kicked.nick(), "bob");
                assert_eq!(reason.as_deref(), Some("behave"));
            }
            other => panic!("unexpected {other:?}"),
        }

        h.feed(":op!o@host KICK #c me").await;
        assert!(h.state.channel("#c").is_none());
    }

    #[tokio::test]
    async fn quit_removes_from_listing_channels_only() {
        let mut h = Harness::new();
        joined(&mut h, "#a").await;
        joined(&mut h, "#b").await;
        joined(&mut h, "#c").await;
        h.feed(":bob!b@host JOIN #a").await;
        h.feed(":bob!b@host JOIN #b").await;
        h.feed(":carol!c@host JOIN #c").await;
        h.take_events();

        let seen_during = std::sync::Arc::new(parking_lot::Mutex::new(0));
        let a = h.state.channel("#a").unwrap();
        let s = std::sync::Arc::clone(&seen_during);
        h.dispatcher
            .events
            .subscribe(EventKind::Quit, move |_| *s.lock() = a.member_count());

        h.feed(":bob!b@host QUIT :gone").await;
        assert_eq!(*seen_during.lock(), 2);
        assert!(!h.state.channel("#a").unwrap().contains("bob"));
        assert!(!h.state.channel("#b").unwrap().contains("bob"));
        assert!(h.state.channel("#c").unwrap().contains("carol"));
        assert_eq!(h.state.channel("#c").unwrap().member_count(), 2);
        assert!(h.state.user("bob").is_none());
    }

    #[tokio::test]
    async fn nick_change_preserves_prefix_everywhere() {
        let mut h = Harness::new();
        joined(&mut h, "#a").await;
        joined(&mut h, "#b").await;
        h.feed(":server 353 me = #a :@alice me").await;
        h.feed(":server 353 me = #b :+alice").await;

        h.feed(":alice!a@host NICK :alicia").await;
        let a = h.state.channel("#a").unwrap();
        let b = h.state.channel("#b").unwrap();
        assert!(a.member("alicia").unwrap().has_operator());
        assert!(b.member("alicia").unwrap().has_voice());
        assert!(!a.contains("alice"));
        match h.take_events().last() {
            Some(Event::NickChanged { user, new_nick }) => {
                assert_eq!(user.nick(), "alice");
                assert_eq!(new_nick, "alicia");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn own_nick_change_updates_identity() {
        let mut h = Harness::new();
        joined(&mut h, "#a").await;
        h.feed(":me!me@local NICK newme").await;
        assert_eq!(h.state.nick(), "newme");
        assert!(h.state.channel("#a").unwrap().contains("newme"));
    }

    #[tokio::test]
    async fn invite_references_unjoined_channel() {
        let mut h = Harness::new();
        h.feed(":bob!b@host INVITE me :#secret").await;
        match h.take_events().as_slice() {
            [Event::Invite {
                sender,
                invitee,
                channel,
            }] => {
                assert_eq!(sender.nick(), "bob");
                assert_eq!(invitee.nick(), "me");
                assert_eq!(channel.name(), "#secret");
                assert!(!channel.is_joined());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(h.state.channel("#secret").is_none());
    }

    #[tokio::test]
    async fn topic_command_and_reply() {
        let mut h = Harness::new();
        joined(&mut h, "#c").await;

        h.feed(":server 332 me #c :Welcome to #c").await;
        h.feed(":op!o@host TOPIC #c :New topic").await;
        let chan = h.state.channel("#c").unwrap();
        assert_eq!(chan.topic().as_deref(), Some("New topic"));

        match h.take_events().as_slice() {
            [Event::TopicChanged {
                setter: None,
                topic: first,
                ..
            }, Event::TopicChanged {
                setter: Some(setter),
                topic: second,
                ..
            }] => {
                assert_eq!(first, "Welcome to #c");
                assert_eq!(setter.nick(), "op");
                assert_eq!(second, "New topic");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn names_reply_fills_roster_with_prefixes() {
        let mut h = Harness::new();
        joined(&mut h, "#c").await;
        h.feed(":server 353 me @ #c :~founder &admin @op %half +voice plain")
            .await;

        let chan = h.state.channel("#c").unwrap();
        assert!(chan.member("founder").unwrap().has_founder());
        assert!(chan.member("admin").unwrap().has_admin());
        assert!(chan.member("op").unwrap().has_operator());
        assert!(chan.member("half").unwrap().has_half_op());
        assert!(chan.member("voice").unwrap().has_voice());
        assert_eq!(chan.member("plain").unwrap().role(), None);
        assert!(h.kinds().is_empty());
    }

    #[tokio::test]
    async fn names_for_unjoined_channel_is_unknown() {
        let mut h = Harness::new();
        h.feed(":server 353 me = #other :alice bob").await;
        assert_eq!(h.kinds(), vec![EventKind::Unknown]);
        assert_eq!(h.state.user_count(), 0);
    }
}
