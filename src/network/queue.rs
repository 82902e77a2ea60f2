//! Outgoing line queue.
//!
//! A mutex-guarded deque with an async wakeup. Any task may push; the
//! writer is the sole consumer. Closing wakes the writer with
//! [`Taken::Closed`] instead of leaving it parked forever.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Result of [`OutgoingQueue::take`].
#[derive(Debug, PartialEq, Eq)]
pub enum Taken {
    Line(String),
    Closed,
}

#[derive(Default)]
struct Inner {
    lines: VecDeque<String>,
    closed: bool,
}

/// FIFO of formatted lines with head insertion for priority traffic.
#[derive(Default)]
pub struct OutgoingQueue {
    inner: Mutex<Inner>,
    notify: Notify,
}

impl OutgoingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail. Returns `false` if the queue is closed.
    pub fn push_back(&self, line: String) -> bool {
        self.push(line, false)
    }

    /// Insert at the head. Returns `false` if the queue is closed.
    pub fn push_front(&self, line: String) -> bool {
        self.push(line, true)
    }

    fn push(&self, line: String, front: bool) -> bool {
        {
            let mut inner = self.inner.lock();
            if inner.closed {
                return false;
            }
            if front {
                inner.lines.push_front(line);
            } else {
                inner.lines.push_back(line);
            }
        }
        self.notify.notify_one();
        true
    }

    /// Wait for the next line, or for the queue to close.
    pub async fn take(&self) -> Taken {
        loop {
            let notified = self.notify.notified();
            {
                let mut inner = self.inner.lock();
                if inner.closed {
                    return Taken::Closed;
                }
                if let Some(line) = inner.lines.pop_front() {
                    return Taken::Line(line);
                }
            }
            notified.await;
        }
    }

    /// Close the queue, discarding pending lines and waking the consumer.
    pub fn close(&self) {
        {
            let mut inner = self.inner.lock();
            inner.closed = true;
            inner.lines.clear();
        }
        self.notify.notify_one();
    }

    /// Accept lines again after a close.
    pub fn reopen(&self) {
        self.inner.lock().closed = false;
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().lines.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
