//! Channel MODE changes and role tracking.

use azmate_proto::{command, parse_role_changes, ChannelExt, Packet};

use super::Dispatcher;
use crate::event::Event;

impl Dispatcher {
    /// `MODE <channel> <modes> [args...]`.
    ///
    /// Publishes one [`Event::ModeChanged`], then a granted or revoked
    /// event per role change in order. Any role change triggers a NAMES
    /// refresh, since a revoke may uncover a lower role the server did not
    /// mention. User modes are passed through as unknown.
    pub(super) fn on_mode(&mut self, packet: Packet) {
        let is_channel_mode = {
            let params = packet.params();
            params.len() >= 2 && params[0].is_channel_name()
        };
        if !is_channel_mode {
            return self.unknown(packet);
        }
        let params = packet.params();
        let (target, rest) = (params[0], &params[1..]);

        let setter = self.sender_snapshot(&packet);
        let channel = self.state.channel_or_reference(target);
        let changes = parse_role_changes(rest[0], &rest[1..]);

        self.publish(Event::ModeChanged {
            channel: channel.clone(),
            setter: setter.clone(),
            modes: rest.join(" "),
        });

        for change in &changes {
            if change.granted {
                channel.set_prefix(&change.target, Some(change.role.prefix_char()));
            } else if channel
                .member(&change.target)
                .is_some_and(|m| m.role() == Some(change.role))
            {
                channel.set_prefix(&change.target, None);
            }

            let target = self.user_snapshot(&change.target);
            let (role, channel, setter) = (change.role, channel.clone(), setter.clone());
            self.publish(if change.granted {
                Event::RoleGranted {
                    role,
                    channel,
                    setter,
                    target,
                }
            } else {
                Event::RoleRevoked {
                    role,
                    channel,
                    setter,
                    target,
                }
            });
        }

        if !changes.is_empty() && channel.is_joined() {
            self.outbox.enqueue(command::names(channel.name()));
        }
    }
}
