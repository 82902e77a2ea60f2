//! Azmate - an asynchronous IRC client engine.
//!
//! One [`IrcClient`] drives one server connection: it registers, keeps a
//! live view of joined channels and their members, answers CTCP requests,
//! paces outgoing traffic, and publishes everything that happens as
//! [`Event`]s.
//!
//! ```no_run
//! use azmate::{ClientConfig, Event, EventKind, IrcClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = IrcClient::new(ClientConfig::new("irc.libera.chat", 6667, "azmate"));
//!
//! let replier = client.clone();
//! client.on(EventKind::Message, move |event| {
//!     if let Event::Message { sender, channel: Some(channel), text } = event {
//!         if text == "!ping" {
//!             let _ = replier.privmsg(channel.name(), &format!("{}: pong", sender.nick()));
//!         }
//!     }
//! });
//!
//! client.connect().await?;
//! client.join("#azmate", None)?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
mod dispatch;
pub mod error;
pub mod event;
mod network;
pub mod state;

pub use azmate_proto as proto;
pub use client::{ConnectionState, IrcClient};
pub use config::ClientConfig;
pub use error::{ConnectError, SendError};
pub use event::{Event, EventBus, EventKind, SubscriptionId};
pub use state::{Channel, ClientState, Member, User};
