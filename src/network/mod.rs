//! Network module.
//!
//! Each connection runs as:
//!
//! ```text
//! Phase 1: Registration (caller's task, direct writes, sequential)
//!    ↓
//! Phase 2: Two tasks for the life of the connection
//!
//!   socket ─▶ [Reader] ─▶ strip ─▶ decode ─▶ [Dispatcher] ─▶ state + events
//!                │ PING                          │ CTCP PING
//!                ▼                               ▼
//!            direct write ◀──────────────── direct write
//!
//!   send ops ─▶ [OutgoingQueue] ─▶ [Writer] (delay, take, write) ─▶ socket
//! ```

pub(crate) mod handshake;
pub(crate) mod outbox;
pub(crate) mod queue;
pub(crate) mod reader;
mod tls;
pub(crate) mod transport;
pub(crate) mod writer;

use azmate_proto::LineCodec;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};

pub(crate) type BoxedRead = Box<dyn AsyncRead + Send + Unpin>;
pub(crate) type BoxedWrite = Box<dyn AsyncWrite + Send + Unpin>;

/// Inbound line stream.
pub(crate) type LineStream = FramedRead<BoxedRead, LineCodec>;
/// Outbound line sink.
pub(crate) type LineSink = FramedWrite<BoxedWrite, LineCodec>;
