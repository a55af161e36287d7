//! Hand-off from background tasks to the UI loop.

use tokio::sync::mpsc;
use tracing::trace;

use crate::events::UiEvent;

pub type UiReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Cloneable "run later on the UI loop" handle.
///
/// Sending never blocks, so timers and workers can dispatch from any context.
#[derive(Debug, Clone)]
pub struct UiDispatcher {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl UiDispatcher {
    /// Queues `event` for the UI loop. Returns `false` once the loop has shut down.
    pub fn dispatch(&self, event: UiEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(mpsc::error::SendError(event)) => {
                trace!(?event, "ui loop closed; dropping event");
                false
            }
        }
    }
}

pub fn channel() -> (UiDispatcher, UiReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiDispatcher { tx }, rx)
}
