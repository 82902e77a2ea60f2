//! Integration test common infrastructure.
//!
//! A scripted in-memory server and helpers for driving an [`IrcClient`]
//! through registration and waiting on its events.

pub mod server;

use std::time::Duration;

use azmate::{ClientConfig, Event, EventKind, IrcClient};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

#[allow(unused_imports)]
pub use server::FakeServer;

/// How long any single expectation may take.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Config for nick `me` with flood control off.
pub fn config() -> ClientConfig {
    let mut config = ClientConfig::new("irc.test", 6667, "me");
    config.connection.message_delay_ms = 0;
    config
}

/// Register `config` against a fresh [`FakeServer`].
#[allow(dead_code)]
pub async fn connect(config: ClientConfig) -> (IrcClient, FakeServer, UnboundedReceiver<Event>) {
    let client = IrcClient::new(config);
    let events = client.event_stream();
    let server = attach(&client).await;
    (client, server, events)
}

/// Register an existing client against a fresh [`FakeServer`].
#[allow(dead_code)]
pub async fn attach(client: &IrcClient) -> FakeServer {
    let nick = client.config().identity.nickname;
    let (io, mut server) = FakeServer::pair();

    let connecting = {
        let client = client.clone();
        tokio::spawn(async move { client.connect_with_stream(io).await })
    };
    server.accept_registration(&nick).await;
    connecting
        .await
        .expect("connect task panicked")
        .expect("registration failed");
    server
}

/// Skip events until one of `kind` arrives.
#[allow(dead_code)]
pub async fn next_event(events: &mut UnboundedReceiver<Event>, kind: EventKind) -> Event {
    timeout(STEP_TIMEOUT, async {
        loop {
            let event = events.recv().await.expect("event stream closed");
            if event.kind() == kind {
                return event;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {kind:?}"))
}
