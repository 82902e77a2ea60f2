//! Flood-controlled writer task.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use super::outbox::Outbox;
use super::queue::Taken;

/// Drain the queue until it closes or a write fails.
///
/// Sleeps `delay_ms` before every take, so consecutive queued lines are at
/// least that far apart. The delay is re-read each round and may be changed
/// while running.
#[instrument(skip_all, name = "writer")]
pub(crate) async fn run(outbox: Arc<Outbox>, delay_ms: Arc<AtomicU64>) {
    loop {
        let delay = delay_ms.load(Ordering::Relaxed);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        match outbox.take().await {
            Taken::Line(line) => {
                if let Err(e) = outbox.send_now(&line).await {
                    warn!(error = %e, "write failed, stopping writer");
                    outbox.close().await;
                    break;
                }
            }
            Taken::Closed => break,
        }
    }
    debug!("writer finished");
}
