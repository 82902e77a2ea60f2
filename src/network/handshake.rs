//! Registration handshake.
//!
//! Runs on the caller's task before the reader and writer exist, so every
//! line is written directly and every read happens here.

use azmate_proto::numeric::{
    is_nick_rejection, ERR_PASSWDMISMATCH, RPL_CREATED, RPL_MYINFO, RPL_WELCOME,
};
use azmate_proto::{command, FormattedStringExt, Packet};
use futures_util::StreamExt;
use tracing::{debug, info, warn};

use super::outbox::Outbox;
use super::LineStream;
use crate::config::ClientConfig;
use crate::dispatch::Dispatcher;
use crate::error::ConnectError;
use crate::state::ClientState;

/// Everything registration needs.
pub(crate) struct Handshake<'a> {
    pub lines: &'a mut LineStream,
    pub outbox: &'a Outbox,
    pub dispatcher: &'a mut Dispatcher,
    pub state: &'a ClientState,
    pub config: &'a ClientConfig,
}

impl Handshake<'_> {
    /// Register and return the nickname the server confirmed.
    ///
    /// On failure the socket is closed before returning.
    pub async fn run(self) -> Result<String, ConnectError> {
        let outbox = self.outbox;
        let timeout = self.config.connection.registration_timeout();

        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, self.negotiate())
                .await
                .unwrap_or(Err(ConnectError::RegistrationTimeout(limit))),
            None => self.negotiate().await,
        };

        if let Err(e) = &result {
            warn!(error = %e, code = e.error_code(), "registration failed");
            outbox.close().await;
        }
        result
    }

    async fn negotiate(self) -> Result<String, ConnectError> {
        let identity = &self.config.identity;
        let log_raw = self.config.connection.log_raw_lines;

        if let Some(password) = self.config.server.password.as_deref().filter(|p| !p.is_empty()) {
            self.outbox.send_now(&command::pass(password)).await?;
        }
        self.outbox
            .send_now(&command::user(identity.username(), identity.realname()))
            .await?;
        self.outbox.send_now(&command::nick(&identity.nickname)).await?;

        while let Some(line) = self.lines.next().await {
            let line = line?;
            if log_raw {
                debug!(line = %line, "<<<");
            }
            if let Some(token) = line.strip_prefix("PING ") {
                self.outbox.send_now(&command::pong(token)).await?;
                continue;
            }

            let packet = Packet::parse(&line.strip_formatting());
            match packet.numeric {
                Some(RPL_WELCOME..=RPL_CREATED) => {
                    if let Some(nick) = packet.arg(0).filter(|n| !self.state.is_us(n)) {
                        info!(requested = %identity.nickname, assigned = %nick, "server assigned a different nickname");
                        self.state.set_nick(nick);
                    }
                }
                Some(RPL_MYINFO) => {
                    let nick = self.state.nick();
                    info!(nick = %nick, "registered");
                    return Ok(nick);
                }
                Some(code) if is_nick_rejection(code) => {
                    return Err(ConnectError::Nickname {
                        code,
                        nick: packet.arg(1).unwrap_or(identity.nickname.as_str()).to_owned(),
                        reason: packet.message.unwrap_or_default(),
                    });
                }
                Some(ERR_PASSWDMISMATCH) => {
                    return Err(ConnectError::Password(packet.message.unwrap_or_default()));
                }
                _ => {
                    if self.dispatcher.dispatch(packet).await.is_some() {
                        debug!("ignoring redirect during registration");
                    }
                }
            }
        }

        Err(ConnectError::ClosedDuringRegistration)
    }
}
