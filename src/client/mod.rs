//! The engine handle.
//!
//! [`IrcClient`] owns one connection: its configuration, state store,
//! event bus, outgoing queue and the reader and writer tasks. Clones share
//! the same connection.

mod commands;
mod status;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use azmate_proto::command;
use parking_lot::{Mutex, RwLock};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::config::{validate, ClientConfig};
use crate::dispatch::Dispatcher;
use crate::error::ConnectError;
use crate::event::{Event, EventBus, EventKind, SubscriptionId};
use crate::network::handshake::Handshake;
use crate::network::outbox::Outbox;
use crate::network::reader::{self, ReaderExit};
use crate::network::{transport, writer, BoxedRead, BoxedWrite, LineStream};
use crate::state::{Channel, ClientIdentity, ClientState};

pub use status::ConnectionState;

/// An IRC client connection.
#[derive(Clone)]
pub struct IrcClient {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Tasks {
    /// Reader loop plus cleanup; survives bounce redirects.
    session: Option<JoinHandle<()>>,
    writer: Option<JoinHandle<()>>,
}

struct Inner {
    config: RwLock<ClientConfig>,
    state: Arc<ClientState>,
    events: Arc<EventBus>,
    outbox: Arc<Outbox>,
    status: watch::Sender<ConnectionState>,
    delay_ms: Arc<AtomicU64>,
    allow_bounce: Arc<AtomicBool>,
    /// Set once registration succeeds, cleared by the teardown that
    /// publishes `Disconnected`.
    live: AtomicBool,
    tasks: Mutex<Tasks>,
}

impl IrcClient {
    pub fn new(config: ClientConfig) -> Self {
        let identity = ClientIdentity {
            nickname: config.identity.nickname.clone(),
            username: config.identity.username().to_owned(),
            realname: config.identity.realname().to_owned(),
        };
        let (status, _) = watch::channel(ConnectionState::Disconnected);

        Self {
            inner: Arc::new(Inner {
                state: Arc::new(ClientState::new(identity)),
                events: Arc::new(EventBus::new()),
                outbox: Arc::new(Outbox::new()),
                status,
                delay_ms: Arc::new(AtomicU64::new(config.connection.message_delay_ms)),
                allow_bounce: Arc::new(AtomicBool::new(config.connection.allow_bounce)),
                live: AtomicBool::new(false),
                tasks: Mutex::new(Tasks::default()),
                config: RwLock::new(config),
            }),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Connect to the configured server and register.
    ///
    /// Returns once the server has accepted the registration (numeric 004).
    /// The reader and writer tasks only start on success.
    #[instrument(skip(self), fields(server = %self.inner.config.read().server.address))]
    pub async fn connect(&self) -> Result<(), ConnectError> {
        let config = self.inner.begin_connect()?;
        let (read, write) = match transport::open(&config.server).await {
            Ok(halves) => halves,
            Err(e) => {
                warn!(error = %e, "failed to open connection");
                self.inner.set_status(ConnectionState::Disconnected);
                return Err(e);
            }
        };
        Arc::clone(&self.inner).start(read, write).await
    }

    /// Register over an already connected stream.
    ///
    /// Server address, port and TLS settings are ignored. Bounce redirects
    /// still open a fresh TCP connection.
    pub async fn connect_with_stream<S>(&self, stream: S) -> Result<(), ConnectError>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        self.inner.begin_connect()?;
        let (read, write) = transport::split(stream);
        Arc::clone(&self.inner).start(read, write).await
    }

    /// Leave the server.
    ///
    /// When connected, queues a QUIT and waits up to the configured quit
    /// timeout for the server to close the stream, then forces the close.
    /// Otherwise closes whatever is open and clears channel state.
    pub async fn disconnect(&self, message: Option<&str>) {
        let session = self.inner.tasks.lock().session.take();

        if let Some(mut session) = session {
            if self.is_connected() {
                self.inner.set_status(ConnectionState::Disconnecting);
                self.inner.outbox.enqueue(command::quit(message));

                let grace = self.inner.config.read().connection.quit_timeout();
                if tokio::time::timeout(grace, &mut session).await.is_ok() {
                    return;
                }
                warn!(timeout = ?grace, "server did not close after QUIT");
            }
            session.abort();
            let _ = session.await;
        }
        self.inner.teardown().await;
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn connection_state(&self) -> ConnectionState {
        *self.inner.status.borrow()
    }

    /// Receive every lifecycle transition.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.inner.status.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.connection_state().is_connected()
    }

    /// The channel, user and identity store.
    pub fn state(&self) -> &Arc<ClientState> {
        &self.inner.state
    }

    /// The current local nickname.
    pub fn current_nick(&self) -> String {
        self.inner.state.nick()
    }

    pub fn channel(&self, name: &str) -> Option<Arc<Channel>> {
        self.inner.state.channel(name)
    }

    pub fn channels(&self) -> Vec<Arc<Channel>> {
        self.inner.state.channels()
    }

    /// A copy of the current configuration.
    pub fn config(&self) -> ClientConfig {
        self.inner.config.read().clone()
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub fn events(&self) -> &Arc<EventBus> {
        &self.inner.events
    }

    /// Run `handler` for every event of `kind`.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.inner.events.subscribe(kind, handler)
    }

    /// Run `handler` for every event.
    pub fn on_any<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.inner.events.subscribe_all(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.events.unsubscribe(id)
    }

    /// Receive every event on a channel.
    pub fn event_stream(&self) -> mpsc::UnboundedReceiver<Event> {
        self.inner.events.stream()
    }

    // ========================================================================
    // Runtime settings
    // ========================================================================

    /// Change the flood-control delay. Takes effect before the next line.
    pub fn set_message_delay(&self, delay: Duration) {
        let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.inner.delay_ms.store(ms, Ordering::Relaxed);
        self.inner.config.write().connection.message_delay_ms = ms;
    }

    /// Follow or ignore RPL_BOUNCE redirects.
    pub fn set_allow_bounce(&self, allow: bool) {
        self.inner.allow_bounce.store(allow, Ordering::Relaxed);
        self.inner.config.write().connection.allow_bounce = allow;
    }

    /// Server used by the next [`connect`](Self::connect).
    pub fn set_server(&self, address: impl Into<String>, port: u16) {
        let mut config = self.inner.config.write();
        config.server.address = address.into();
        config.server.port = port;
    }

    /// Nickname requested by the next registration.
    pub fn set_nickname(&self, nickname: impl Into<String>) {
        self.inner.config.write().identity.nickname = nickname.into();
    }
}

impl Inner {
    fn set_status(&self, next: ConnectionState) {
        let previous = self.status.send_replace(next);
        if previous != next {
            debug!(from = %previous, to = %next, "connection state");
        }
    }

    /// Validate the configuration and claim the connection.
    fn begin_connect(&self) -> Result<ClientConfig, ConnectError> {
        let config = self.config.read().clone();
        validate(&config).map_err(ConnectError::Configuration)?;

        let claimed = self.status.send_if_modified(|state| {
            if state.is_disconnected() {
                *state = ConnectionState::Connecting;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Err(ConnectError::AlreadyConnected);
        }
        Ok(config)
    }

    /// Register on a fresh socket and start the session task.
    async fn start(self: Arc<Self>, read: BoxedRead, write: BoxedWrite) -> Result<(), ConnectError> {
        let (lines, dispatcher) = self.establish(read, write).await?;
        let session = tokio::spawn(Arc::clone(&self).run_session(lines, dispatcher));
        self.tasks.lock().session = Some(session);
        Ok(())
    }

    /// Frame the socket, register, and start the writer.
    async fn establish(
        &self,
        read: BoxedRead,
        write: BoxedWrite,
    ) -> Result<(LineStream, Dispatcher), ConnectError> {
        let result = self.register(read, write).await;
        if result.is_err() {
            self.outbox.close().await;
            self.state.clear();
            self.set_status(ConnectionState::Disconnected);
        }
        result
    }

    async fn register(
        &self,
        read: BoxedRead,
        write: BoxedWrite,
    ) -> Result<(LineStream, Dispatcher), ConnectError> {
        let config = self.config.read().clone();
        self.set_status(ConnectionState::AwaitingRegistration);

        let (mut lines, sink) = transport::frame(read, write, &config.connection)?;
        self.outbox.install(sink, config.connection.log_raw_lines).await;
        self.state.clear();
        self.state.set_nick(&config.identity.nickname);

        let mut dispatcher = Dispatcher::new(
            Arc::clone(&self.state),
            Arc::clone(&self.events),
            Arc::clone(&self.outbox),
            config.connection.version.clone(),
            Arc::clone(&self.allow_bounce),
        );
        let nick = Handshake {
            lines: &mut lines,
            outbox: &self.outbox,
            dispatcher: &mut dispatcher,
            state: &self.state,
            config: &config,
        }
        .run()
        .await?;

        let writer = tokio::spawn(writer::run(
            Arc::clone(&self.outbox),
            Arc::clone(&self.delay_ms),
        ));
        self.tasks.lock().writer = Some(writer);
        self.live.store(true, Ordering::SeqCst);
        self.set_status(ConnectionState::Connected);
        self.events.publish(&Event::Connected { nick });

        Ok((lines, dispatcher))
    }

    /// Read until the connection ends, following redirects.
    async fn run_session(self: Arc<Self>, mut lines: LineStream, mut dispatcher: Dispatcher) {
        let log_raw = self.config.read().connection.log_raw_lines;
        loop {
            let exit = reader::run(lines, dispatcher, Arc::clone(&self.outbox), log_raw).await;
            if exit == ReaderExit::Closed {
                self.set_status(ConnectionState::Disconnecting);
            }
            self.teardown().await;

            let ReaderExit::Redirect(redirect) = exit else {
                break;
            };
            info!(address = %redirect.address, port = redirect.port, "following redirect");
            let server = {
                let mut config = self.config.write();
                config.server.address = redirect.address;
                config.server.port = redirect.port;
                config.server.clone()
            };

            self.set_status(ConnectionState::Connecting);
            let reconnected = match transport::open(&server).await {
                Ok((read, write)) => self.establish(read, write).await,
                Err(e) => {
                    self.set_status(ConnectionState::Disconnected);
                    Err(e)
                }
            };
            match reconnected {
                Ok((l, d)) => {
                    lines = l;
                    dispatcher = d;
                }
                Err(e) => {
                    warn!(error = %e, "redirect failed");
                    break;
                }
            }
        }
    }

    /// Close the socket, stop the writer and clear channel state.
    ///
    /// Safe to call more than once; `Disconnected` is published once per
    /// registered session.
    async fn teardown(&self) {
        self.outbox.close().await;
        let writer = self.tasks.lock().writer.take();
        if let Some(writer) = writer {
            let _ = writer.await;
        }
        self.state.clear();
        self.set_status(ConnectionState::Disconnected);

        if self.live.swap(false, Ordering::SeqCst) {
            info!("disconnected");
            self.events.publish(&Event::Disconnected);
        }
    }
}
