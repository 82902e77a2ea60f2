//! Outgoing commands.
//!
//! Every operation formats one or more lines and appends them to the
//! flood-controlled queue. They fail only when no connection is open or
//! the target cannot be sent to.

use azmate_proto::{command, ChannelExt, Ctcp, CtcpKind, Role};

use super::IrcClient;
use crate::error::SendError;
use crate::state::User;

/// Reason used by [`IrcClient::ban`] when kicking without one.
const DEFAULT_BAN_REASON: &str = "Banned";

/// Reject targets that would break the line.
fn check_target(target: &str) -> Result<&str, SendError> {
    if target.is_empty() || target.contains([' ', '\r', '\n', '\0']) {
        return Err(SendError::InvalidTarget(target.to_owned()));
    }
    Ok(target)
}

impl IrcClient {
    fn enqueue(&self, line: String) -> Result<(), SendError> {
        if self.inner.outbox.enqueue(line) {
            Ok(())
        } else {
            Err(SendError::NotConnected)
        }
    }

    /// Where to send a message for `target`: channels as-is, users
    /// through their send-address override if one is set.
    pub fn resolve_address(&self, target: &str) -> String {
        if target.is_channel_name() {
            return target.to_owned();
        }
        self.inner.state.address_of(target)
    }

    /// Override the send address for `nick`.
    ///
    /// `None` resets to the nickname, `"@server"` sends to `nick@server`,
    /// anything else replaces the target verbatim. The override may be set
    /// before connecting, survives reconnects and follows the user's NICK.
    pub fn set_custom_address(&self, nick: &str, address: Option<String>) {
        self.inner.state.set_custom_address(nick, address);
    }

    // ========================================================================
    // Channels
    // ========================================================================

    pub fn join(&self, channel: &str, key: Option<&str>) -> Result<(), SendError> {
        self.enqueue(command::join(check_target(channel)?, key))
    }

    pub fn part(&self, channel: &str, reason: Option<&str>) -> Result<(), SendError> {
        self.enqueue(command::part(check_target(channel)?, reason))
    }

    /// Set the topic, or ask for it with `None`.
    pub fn topic(&self, channel: &str, topic: Option<&str>) -> Result<(), SendError> {
        self.enqueue(command::topic(check_target(channel)?, topic))
    }

    pub fn names(&self, channel: &str) -> Result<(), SendError> {
        self.enqueue(command::names(check_target(channel)?))
    }

    pub fn kick(&self, channel: &str, nick: &str, reason: Option<&str>) -> Result<(), SendError> {
        self.enqueue(command::kick(
            check_target(channel)?,
            check_target(nick)?,
            reason,
        ))
    }

    pub fn mode(&self, target: &str, modes: &str) -> Result<(), SendError> {
        self.enqueue(command::mode(check_target(target)?, modes))
    }

    /// Give (`grant`) or take a channel role.
    pub fn set_role(
        &self,
        channel: &str,
        nick: &str,
        role: Role,
        grant: bool,
    ) -> Result<(), SendError> {
        let sign = if grant { '+' } else { '-' };
        let modes = format!("{sign}{} {}", role.mode_char(), check_target(nick)?);
        self.mode(channel, &modes)
    }

    /// Ban `nick` by host mask when the host is known, by nick mask
    /// otherwise, and optionally kick them.
    pub fn ban(
        &self,
        channel: &str,
        nick: &str,
        kick: bool,
        reason: Option<&str>,
    ) -> Result<(), SendError> {
        let nick = check_target(nick)?;
        let mask = match self.inner.state.user(nick) {
            Some(user) => user.read().ban_mask(),
            None => User::new(nick).ban_mask(),
        };
        self.mode(channel, &format!("+b {mask}"))?;
        if kick {
            self.kick(channel, nick, Some(reason.unwrap_or(DEFAULT_BAN_REASON)))?;
        }
        Ok(())
    }

    // ========================================================================
    // Messages
    // ========================================================================

    pub fn privmsg(&self, target: &str, text: &str) -> Result<(), SendError> {
        let to = self.resolve_address(check_target(target)?);
        self.enqueue(command::privmsg(&to, text))
    }

    pub fn notice(&self, target: &str, text: &str) -> Result<(), SendError> {
        let to = self.resolve_address(check_target(target)?);
        self.enqueue(command::notice(&to, text))
    }

    /// `/me` style action.
    pub fn action(&self, target: &str, text: &str) -> Result<(), SendError> {
        self.send_ctcp(target, &Ctcp::action(text))
    }

    /// Send a CTCP request.
    pub fn ctcp(&self, target: &str, name: &str, params: Option<&str>) -> Result<(), SendError> {
        self.send_ctcp(target, &Ctcp::custom(name, params))
    }

    /// Send a CTCP reply.
    pub fn ctcp_reply(
        &self,
        target: &str,
        name: &str,
        params: Option<&str>,
    ) -> Result<(), SendError> {
        let to = self.resolve_address(check_target(target)?);
        self.enqueue(command::ctcp_reply(&to, &Ctcp::custom(name, params)))
    }

    /// Send a CTCP PING and return the timestamp (milliseconds since the
    /// epoch) carried in it.
    pub fn ctcp_ping(&self, target: &str) -> Result<i64, SendError> {
        let stamp = chrono::Utc::now().timestamp_millis();
        let token = stamp.to_string();
        self.send_ctcp(target, &Ctcp::new(CtcpKind::Ping, Some(&token)))?;
        Ok(stamp)
    }

    pub fn ctcp_version(&self, target: &str) -> Result<(), SendError> {
        self.send_ctcp(target, &Ctcp::new(CtcpKind::Version, None))
    }

    pub fn ctcp_clientinfo(&self, target: &str) -> Result<(), SendError> {
        self.send_ctcp(target, &Ctcp::new(CtcpKind::Clientinfo, None))
    }

    fn send_ctcp(&self, target: &str, ctcp: &Ctcp<'_>) -> Result<(), SendError> {
        let to = self.resolve_address(check_target(target)?);
        self.enqueue(command::ctcp(&to, ctcp))
    }

    // ========================================================================
    // Self
    // ========================================================================

    /// Request a nickname change. Local state follows the server's NICK.
    pub fn nick(&self, nick: &str) -> Result<(), SendError> {
        self.enqueue(command::nick(check_target(nick)?))
    }

    /// Mark away, or back with `None`.
    pub fn away(&self, reason: Option<&str>) -> Result<(), SendError> {
        self.enqueue(command::away(reason))
    }

    pub fn motd(&self) -> Result<(), SendError> {
        self.enqueue(command::motd())
    }

    /// Queue a line verbatim.
    pub fn send_raw(&self, line: &str) -> Result<(), SendError> {
        self.enqueue(line.to_owned())
    }
}
