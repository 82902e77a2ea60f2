//! PRIVMSG, NOTICE and CTCP.

use std::sync::Arc;

use azmate_proto::ctcp::{SUPPORTED_COMMANDS, UNSUPPORTED_REPLY};
use azmate_proto::{command, ChannelExt, Ctcp, CtcpKind, Packet};
use tracing::debug;

use super::Dispatcher;
use crate::event::Event;
use crate::state::{Channel, User};

/// Reply to `CTCP AZMATE`.
const CLIENT_ID: &str = concat!("Azmate IRC engine ", env!("CARGO_PKG_VERSION"));
/// Reply to `CTCP SOURCE`.
const SOURCE: &str = concat!("azmate ", env!("CARGO_PKG_VERSION"), " (Rust, tokio)");

impl Dispatcher {
    pub(super) async fn on_privmsg(&mut self, packet: Packet) {
        let Some(sender) = self.sender_snapshot(&packet) else {
            return self.unknown(packet);
        };
        let target = packet.arg(0).unwrap_or_default().to_owned();
        let text = packet.message.clone().unwrap_or_default();

        if packet.ctcp {
            let Some(ctcp) = Ctcp::parse(&text) else {
                return self.unknown(packet);
            };
            if ctcp.kind == CtcpKind::Action {
                let channel = self.message_channel(&packet, &target);
                self.publish(Event::Action {
                    sender,
                    channel,
                    text: ctcp.params.unwrap_or_default().to_owned(),
                });
            } else {
                self.answer_ctcp(&sender, &ctcp).await;
            }
            return;
        }

        let channel = self.message_channel(&packet, &target);
        self.publish(Event::Message {
            sender,
            channel,
            text,
        });
    }

    pub(super) fn on_notice(&mut self, packet: Packet) {
        let sender = self.sender_snapshot(&packet);
        let target = packet.arg(0).unwrap_or_default().to_owned();
        let text = packet.message.clone().unwrap_or_default();

        if packet.ctcp {
            // CTCP requests inside a NOTICE are never answered.
            match (Ctcp::parse(&text), sender) {
                (Some(ctcp), Some(sender)) if ctcp.kind.is_reply() => {
                    self.publish(Event::CtcpReply {
                        sender,
                        command: ctcp.kind.as_str().to_owned(),
                        args: ctcp.params.map(str::to_owned),
                    });
                }
                (Some(ctcp), Some(sender)) if ctcp.kind == CtcpKind::Action => {
                    let channel = self.message_channel(&packet, &target);
                    self.publish(Event::Action {
                        sender,
                        channel,
                        text: ctcp.params.unwrap_or_default().to_owned(),
                    });
                }
                _ => self.unknown(packet),
            }
            return;
        }

        let channel = self.message_channel(&packet, &target);
        self.publish(Event::Notice {
            sender,
            channel,
            text,
        });
    }

    /// The channel a message was sent to, if any. A joined channel gets
    /// the sender's roster entry refreshed.
    fn message_channel(&self, packet: &Packet, target: &str) -> Option<Arc<Channel>> {
        if !target.is_channel_name() {
            return None;
        }
        let channel = self.state.channel_or_reference(target);
        if channel.is_joined() {
            if let Some(prefix) = packet.sender.as_ref().filter(|p| !p.is_server()) {
                channel.upsert_member(self.state.user_from_prefix(prefix), None);
            }
        }
        Some(channel)
    }

    /// Answer a CTCP request with a NOTICE to the sender's address.
    async fn answer_ctcp(&self, sender: &User, ctcp: &Ctcp<'_>) {
        let to = self.state.address_of(sender.nick());
        debug!(from = %sender.nick(), command = %ctcp.kind, "answering CTCP request");

        let time;
        let reply = match &ctcp.kind {
            CtcpKind::Version | CtcpKind::Finger => {
                Ctcp::new(ctcp.kind.clone(), Some(self.version.as_str()))
            }
            CtcpKind::Azmate => Ctcp::new(CtcpKind::Azmate, Some(CLIENT_ID)),
            CtcpKind::Time => {
                time = chrono::Local::now().to_rfc2822();
                Ctcp::new(CtcpKind::Time, Some(time.as_str()))
            }
            CtcpKind::Ping => {
                let line = command::ctcp_reply(&to, &Ctcp::new(CtcpKind::Ping, ctcp.params));
                self.outbox.send_now_or_priority(line).await;
                return;
            }
            CtcpKind::Source => Ctcp::new(CtcpKind::Source, Some(SOURCE)),
            CtcpKind::Clientinfo => Ctcp::new(CtcpKind::Clientinfo, Some(SUPPORTED_COMMANDS)),
            _ => Ctcp::new(CtcpKind::Errmsg, Some(UNSUPPORTED_REPLY)),
        };
        self.outbox.enqueue(command::ctcp_reply(&to, &reply));
    }
}
