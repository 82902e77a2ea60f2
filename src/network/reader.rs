//! Input reader task.

use std::sync::Arc;

use azmate_proto::{command, FormattedStringExt, Packet};
use futures_util::StreamExt;
use tracing::{debug, info, instrument, warn};

use super::outbox::Outbox;
use super::LineStream;
use crate::dispatch::{Dispatcher, Redirect};

/// Why the reader stopped.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ReaderExit {
    /// End of stream or a read error.
    Closed,
    /// The server bounced us elsewhere.
    Redirect(Redirect),
}

/// Read and dispatch lines until the stream ends.
///
/// `PING` is answered before decoding. Malformed lines never stop the
/// loop; they surface as unknown events.
#[instrument(skip_all, name = "reader")]
pub(crate) async fn run(
    mut lines: LineStream,
    mut dispatcher: Dispatcher,
    outbox: Arc<Outbox>,
    log_raw: bool,
) -> ReaderExit {
    while let Some(result) = lines.next().await {
        let line = match result {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "read failed");
                break;
            }
        };
        if log_raw {
            debug!(line = %line, "<<<");
        }

        if let Some(token) = line.strip_prefix("PING ") {
            outbox.send_now_quiet(&command::pong(token)).await;
            continue;
        }

        let packet = Packet::parse(&line.strip_formatting());
        if let Some(redirect) = dispatcher.dispatch(packet).await {
            return ReaderExit::Redirect(redirect);
        }
    }

    info!("connection closed");
    ReaderExit::Closed
}
