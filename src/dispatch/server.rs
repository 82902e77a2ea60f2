//! Server numerics: MOTD and bounce.

use azmate_proto::Packet;
use tracing::{debug, info};

use super::{Dispatcher, Redirect};
use crate::event::Event;

impl Dispatcher {
    pub(super) fn on_motd_line(&mut self, packet: Packet) {
        if let Some(line) = packet.message.as_deref() {
            self.motd.push_str(line);
        }
        self.motd.push('\n');
    }

    pub(super) fn on_motd_end(&mut self) {
        let text = std::mem::take(&mut self.motd);
        self.publish(Event::Motd { text });
    }

    /// RPL_BOUNCE: `010 <me> <host> <port> :<text>`.
    ///
    /// The last two middle arguments name the new server.
    pub(super) fn on_bounce(&mut self, packet: Packet) -> Option<Redirect> {
        if !self.bounce_allowed() {
            debug!("ignoring redirect, bounce not allowed");
            return None;
        }

        let args = packet.args();
        let [.., address, port] = args.as_slice() else {
            debug!("redirect without host and port");
            return None;
        };
        let Ok(port) = port.parse::<u16>() else {
            debug!(port = %port, "redirect with invalid port");
            return None;
        };

        info!(address = %address, port, "server redirected us");
        Some(Redirect {
            address: (*address).to_owned(),
            port,
        })
    }
}
