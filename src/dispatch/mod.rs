//! Inbound packet dispatch.
//!
//! The [`Dispatcher`] runs on the reader task. It applies each packet to
//! the [`ClientState`], answers CTCP requests and publishes [`Event`]s.
//! Nothing here fails: lines it cannot make sense of become
//! [`Event::Unknown`].

mod channel;
mod messaging;
mod mode;
mod server;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use azmate_proto::numeric::{
    RPL_BOUNCE, RPL_ENDOFMOTD, RPL_ENDOFNAMES, RPL_MOTD, RPL_NAMREPLY, RPL_TOPIC,
};
use azmate_proto::Packet;
use tracing::trace;

use crate::event::{Event, EventBus};
use crate::network::outbox::Outbox;
use crate::state::{ClientState, User};

/// A server-issued redirect (RPL_BOUNCE).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Redirect {
    pub address: String,
    pub port: u16,
}

/// Applies packets to state and turns them into events.
pub(crate) struct Dispatcher {
    state: Arc<ClientState>,
    events: Arc<EventBus>,
    outbox: Arc<Outbox>,
    version: String,
    allow_bounce: Arc<AtomicBool>,
    /// MOTD lines collected until RPL_ENDOFMOTD.
    motd: String,
}

impl Dispatcher {
    pub fn new(
        state: Arc<ClientState>,
        events: Arc<EventBus>,
        outbox: Arc<Outbox>,
        version: String,
        allow_bounce: Arc<AtomicBool>,
    ) -> Self {
        Self {
            state,
            events,
            outbox,
            version,
            allow_bounce,
            motd: String::new(),
        }
    }

    /// Handle one packet. Returns a redirect when the server bounced us
    /// and bouncing is allowed.
    pub async fn dispatch(&mut self, packet: Packet) -> Option<Redirect> {
        trace!(command = %packet.command, "dispatching");

        if let Some(code) = packet.numeric {
            return self.dispatch_numeric(code, packet);
        }

        match packet.command.to_ascii_uppercase().as_str() {
            "PRIVMSG" => self.on_privmsg(packet).await,
            "NOTICE" => self.on_notice(packet),
            "JOIN" => self.on_join(packet),
            "PART" => self.on_part(packet),
            "KICK" => self.on_kick(packet),
            "QUIT" => self.on_quit(packet),
            "NICK" => self.on_nick(packet),
            "INVITE" => self.on_invite(packet),
            "TOPIC" => self.on_topic(packet),
            "MODE" => self.on_mode(packet),
            _ => self.unknown(packet),
        }
        None
    }

    fn dispatch_numeric(&mut self, code: u16, packet: Packet) -> Option<Redirect> {
        match code {
            RPL_BOUNCE => return self.on_bounce(packet),
            RPL_TOPIC => self.on_topic_reply(packet),
            RPL_NAMREPLY => self.on_names_reply(packet),
            RPL_ENDOFNAMES => {}
            RPL_MOTD => self.on_motd_line(packet),
            RPL_ENDOFMOTD => self.on_motd_end(),
            _ => self.unknown(packet),
        }
        None
    }

    fn publish(&self, event: Event) {
        self.events.publish(&event);
    }

    fn unknown(&self, packet: Packet) {
        self.publish(Event::Unknown { packet });
    }

    /// A snapshot of the packet's sender. Cached users are refreshed with
    /// the prefix; unknown senders are not added to the cache.
    fn sender_snapshot(&self, packet: &Packet) -> Option<User> {
        let prefix = packet.sender.as_ref()?;
        Some(match self.state.user(&prefix.nick) {
            Some(user) => {
                let mut user = user.write();
                user.absorb(prefix);
                user.clone()
            }
            None => User::from_prefix(prefix),
        })
    }

    /// A snapshot of a user named in arguments.
    fn user_snapshot(&self, nick: &str) -> User {
        self.state
            .user(nick)
            .map(|u| u.read().clone())
            .unwrap_or_else(|| User::new(nick))
    }

    fn bounce_allowed(&self) -> bool {
        self.allow_bounce.load(Ordering::Relaxed)
    }
}
