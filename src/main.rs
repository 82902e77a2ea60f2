//! azmate - console IRC client built on the azmate engine.
//!
//! Usage: `azmate [config.toml]`
//!
//! Lines typed on stdin are sent to the last joined channel. Commands:
//! `/join <channel> [key]`, `/part <channel> [reason]`, `/msg <target> <text>`,
//! `/me <text>`, `/nick <nick>`, `/raw <line>`, `/quit [message]`.

use std::sync::Arc;

use anyhow::Context;
use azmate::{ClientConfig, Event, EventKind, IrcClient};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = ClientConfig::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        server = %config.server.address,
        port = config.server.port,
        nick = %config.identity.nickname,
        "Starting azmate"
    );

    let client = IrcClient::new(config);
    let current_channel = Arc::new(Mutex::new(None::<String>));
    log_events(&client, Arc::clone(&current_channel));

    client
        .connect()
        .await
        .with_context(|| format!("connecting to {}", client.config().server.address))?;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut state_changes = client.state_changes();
    let mut quit_message = "Leaving".to_owned();

    loop {
        tokio::select! {
            line = stdin.next_line() => {
                let Some(line) = line? else { break };
                if let Some(message) = handle_input(&client, &current_channel, line.trim()) {
                    quit_message = message;
                    break;
                }
            }
            changed = state_changes.changed() => {
                if changed.is_err() || state_changes.borrow().is_disconnected() {
                    info!("Connection closed");
                    return Ok(());
                }
            }
        }
    }

    client.disconnect(Some(&quit_message)).await;
    info!("Shutdown complete");
    Ok(())
}

/// Log every event and track the channel plain text goes to.
fn log_events(client: &IrcClient, current_channel: Arc<Mutex<Option<String>>>) {
    let me = client.clone();
    client.on(EventKind::Join, move |event| {
        if let Event::Join { channel, user } = event {
            if me.state().is_us(user.nick()) {
                *current_channel.lock() = Some(channel.name().to_owned());
            }
        }
    });

    client.on_any(|event| match event {
        Event::Connected { nick } => info!(nick = %nick, "Registered"),
        Event::Disconnected => warn!("Disconnected"),
        Event::Message {
            sender,
            channel,
            text,
        } => info!(
            from = %sender.nick(),
            to = channel.as_ref().map_or("(private)", |c| c.name()),
            "{text}"
        ),
        Event::Action {
            sender,
            channel,
            text,
        } => info!(
            to = channel.as_ref().map_or("(private)", |c| c.name()),
            "* {} {text}",
            sender.nick()
        ),
        Event::Notice { sender, text, .. } => info!(
            from = sender.as_ref().map_or("(server)", |s| s.nick()),
            "-{text}-"
        ),
        Event::Join { channel, user } => {
            info!(channel = %channel.name(), nick = %user.nick(), "Join")
        }
        Event::Part {
            channel,
            user,
            reason,
        } => info!(channel = %channel.name(), nick = %user.nick(), reason = ?reason, "Part"),
        Event::Quit { user, message } => {
            info!(nick = %user.nick(), message = ?message, "Quit")
        }
        Event::Kick {
            channel,
            kicker,
            kicked,
            reason,
        } => info!(
            channel = %channel.name(),
            by = %kicker.nick(),
            nick = %kicked.nick(),
            reason = ?reason,
            "Kick"
        ),
        Event::NickChanged { user, new_nick } => {
            info!(old = %user.nick(), new = %new_nick, "Nick change")
        }
        Event::TopicChanged { channel, topic, .. } => {
            info!(channel = %channel.name(), "Topic: {topic}")
        }
        Event::Motd { text } => {
            for line in text.lines() {
                info!("MOTD {line}");
            }
        }
        Event::Unknown { packet } => tracing::debug!(line = %packet, "Unhandled"),
        other => info!(event = other.name(), "{other:?}"),
    });
}

/// Act on one stdin line. Returns the quit message on `/quit`.
fn handle_input(
    client: &IrcClient,
    current_channel: &Mutex<Option<String>>,
    line: &str,
) -> Option<String> {
    if line.is_empty() {
        return None;
    }

    let result = match line.strip_prefix('/') {
        None => match current_channel.lock().clone() {
            Some(channel) => client.privmsg(&channel, line),
            None => {
                warn!("Join a channel first: /join #channel");
                return None;
            }
        },
        Some(input) => {
            let (cmd, rest) = input.split_once(' ').unwrap_or((input, ""));
            let rest = rest.trim();
            let (first, tail) = rest.split_once(' ').unwrap_or((rest, ""));
            let tail = Some(tail.trim()).filter(|t| !t.is_empty());

            match cmd.to_ascii_lowercase().as_str() {
                "join" => client.join(first, tail),
                "part" => client.part(first, tail),
                "msg" => client.privmsg(first, tail.unwrap_or_default()),
                "me" => match current_channel.lock().clone() {
                    Some(channel) => client.action(&channel, rest),
                    None => {
                        warn!("Join a channel first: /join #channel");
                        return None;
                    }
                },
                "nick" => client.nick(first),
                "raw" => client.send_raw(rest),
                "quit" => {
                    return Some(if rest.is_empty() { "Leaving" } else { rest }.to_owned())
                }
                other => {
                    warn!(command = %other, "Unknown command");
                    return None;
                }
            }
        }
    };

    if let Err(e) = result {
        warn!(error = %e, "Command failed");
    }
    None
}
