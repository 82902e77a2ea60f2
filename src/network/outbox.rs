//! The two write paths: the flood-controlled queue and the direct sink.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::SinkExt;
use tokio::sync::Mutex;
use tracing::debug;

use super::queue::{OutgoingQueue, Taken};
use super::LineSink;

/// Owns the outgoing queue and the socket's write half.
///
/// Queued lines go out through the writer task; `send_now*` write straight
/// to the socket for handshake traffic, PONG and CTCP PING replies.
pub(crate) struct Outbox {
    queue: OutgoingQueue,
    sink: Mutex<Option<LineSink>>,
    log_raw: AtomicBool,
}

impl Outbox {
    pub fn new() -> Self {
        let queue = OutgoingQueue::new();
        queue.close();
        Self {
            queue,
            sink: Mutex::new(None),
            log_raw: AtomicBool::new(false),
        }
    }

    /// Start a new session on `sink`. The queue is reopened empty.
    pub async fn install(&self, sink: LineSink, log_raw: bool) {
        self.log_raw.store(log_raw, Ordering::Relaxed);
        *self.sink.lock().await = Some(sink);
        self.queue.close();
        self.queue.reopen();
    }

    /// Queue a line behind everything else.
    pub fn enqueue(&self, line: String) -> bool {
        self.queue.push_back(line)
    }

    /// Queue a line ahead of everything else.
    pub fn enqueue_priority(&self, line: String) -> bool {
        self.queue.push_front(line)
    }

    /// Next queued line, for the writer.
    pub async fn take(&self) -> Taken {
        self.queue.take().await
    }

    /// Write immediately, propagating I/O failures.
    pub async fn send_now(&self, line: &str) -> io::Result<()> {
        let mut guard = self.sink.lock().await;
        let sink = guard
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "not connected"))?;
        if self.log_raw.load(Ordering::Relaxed) {
            debug!(line = %line, ">>>");
        }
        sink.send(line.to_owned()).await.map_err(|e| match e {
            azmate_proto::ProtocolError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        })
    }

    /// Write immediately, ignoring failures (PONG, keepalive).
    pub async fn send_now_quiet(&self, line: &str) {
        if let Err(e) = self.send_now(line).await {
            debug!(error = %e, "direct write failed");
        }
    }

    /// Write immediately; if that fails, fall back to the head of the queue.
    pub async fn send_now_or_priority(&self, line: String) {
        if self.send_now(&line).await.is_err() {
            self.enqueue_priority(line);
        }
    }

    /// Close the queue and shut the write half down.
    pub async fn close(&self) {
        self.queue.close();
        if let Some(mut sink) = self.sink.lock().await.take() {
            let _ = sink.close().await;
        }
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        !self.queue.is_closed()
    }

    #[cfg(test)]
    pub fn reopen_for_tests(&self) {
        self.queue.reopen();
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
