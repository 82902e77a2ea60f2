//! Domain events published by the engine.
//!
//! Every decoded packet produces zero or more [`Event`]s on the client's
//! [`EventBus`]. Subscribers register per [`EventKind`] or for everything.

mod bus;

use std::sync::Arc;

use azmate_proto::{Packet, Role};

use crate::state::{Channel, User};

pub use bus::{EventBus, SubscriptionId};

/// Something that happened on the connection.
///
/// Users are snapshots taken when the event was built. Channels are the
/// live objects, so a handler sees the roster as it stands after the
/// event was applied (QUIT is published before the user is removed).
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Event {
    /// Registration completed under `nick`.
    Connected { nick: String },
    /// The connection closed and all channel state was cleared.
    Disconnected,
    /// A PRIVMSG. `channel` is `None` for a private message.
    Message {
        sender: User,
        channel: Option<Arc<Channel>>,
        text: String,
    },
    /// A CTCP ACTION (`/me`).
    Action {
        sender: User,
        channel: Option<Arc<Channel>>,
        text: String,
    },
    /// A NOTICE. Server notices before registration may have no sender.
    Notice {
        sender: Option<User>,
        channel: Option<Arc<Channel>>,
        text: String,
    },
    /// A CTCP reply to one of our requests.
    CtcpReply {
        sender: User,
        command: String,
        args: Option<String>,
    },
    Join {
        channel: Arc<Channel>,
        user: User,
    },
    Part {
        channel: Arc<Channel>,
        user: User,
        reason: Option<String>,
    },
    Quit {
        user: User,
        message: Option<String>,
    },
    Kick {
        channel: Arc<Channel>,
        kicker: User,
        kicked: User,
        reason: Option<String>,
    },
    NickChanged {
        user: User,
        new_nick: String,
    },
    Invite {
        sender: User,
        invitee: User,
        channel: Arc<Channel>,
    },
    /// Any channel MODE change, with the raw mode string and arguments.
    ModeChanged {
        channel: Arc<Channel>,
        setter: Option<User>,
        modes: String,
    },
    RoleGranted {
        role: Role,
        channel: Arc<Channel>,
        setter: Option<User>,
        target: User,
    },
    RoleRevoked {
        role: Role,
        channel: Arc<Channel>,
        setter: Option<User>,
        target: User,
    },
    /// A topic change (`setter` present) or a topic reply on join (absent).
    TopicChanged {
        channel: Arc<Channel>,
        setter: Option<User>,
        topic: String,
    },
    /// The complete message of the day.
    Motd { text: String },
    /// Anything the dispatcher does not interpret.
    Unknown { packet: Packet },
}

/// Subscription key for [`Event`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connected,
    Disconnected,
    Message,
    Action,
    Notice,
    CtcpReply,
    Join,
    Part,
    Quit,
    Kick,
    NickChanged,
    Invite,
    ModeChanged,
    RoleGranted(Role),
    RoleRevoked(Role),
    TopicChanged,
    Motd,
    Unknown,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Connected { .. } => EventKind::Connected,
            Event::Disconnected => EventKind::Disconnected,
            Event::Message { .. } => EventKind::Message,
            Event::Action { .. } => EventKind::Action,
            Event::Notice { .. } => EventKind::Notice,
            Event::CtcpReply { .. } => EventKind::CtcpReply,
            Event::Join { .. } => EventKind::Join,
            Event::Part { .. } => EventKind::Part,
            Event::Quit { .. } => EventKind::Quit,
            Event::Kick { .. } => EventKind::Kick,
            Event::NickChanged { .. } => EventKind::NickChanged,
            Event::Invite { .. } => EventKind::Invite,
            Event::ModeChanged { .. } => EventKind::ModeChanged,
            Event::RoleGranted { role, .. } => EventKind::RoleGranted(*role),
            Event::RoleRevoked { role, .. } => EventKind::RoleRevoked(*role),
            Event::TopicChanged { .. } => EventKind::TopicChanged,
            Event::Motd { .. } => EventKind::Motd,
            Event::Unknown { .. } => EventKind::Unknown,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self.kind() {
            EventKind::Connected => "connected",
            EventKind::Disconnected => "disconnected",
            EventKind::Message => "message",
            EventKind::Action => "action",
            EventKind::Notice => "notice",
            EventKind::CtcpReply => "ctcp_reply",
            EventKind::Join => "join",
            EventKind::Part => "part",
            EventKind::Quit => "quit",
            EventKind::Kick => "kick",
            EventKind::NickChanged => "nick_changed",
            EventKind::Invite => "invite",
            EventKind::ModeChanged => "mode_changed",
            EventKind::RoleGranted(_) => "role_granted",
            EventKind::RoleRevoked(_) => "role_revoked",
            EventKind::TopicChanged => "topic_changed",
            EventKind::Motd => "motd",
            EventKind::Unknown => "unknown",
        }
    }
}
