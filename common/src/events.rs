//! # Scan Events
//!
//! Everything the scanner announces to the rest of the application. Consumers
//! implement [`NotificationSink`], or take the receiving end of a tokio
//! channel, for which the sink is already implemented.

use tokio::sync::mpsc::UnboundedSender;

use crate::lookup::{LookupKind, TaskKey, TaskOutcome};
use crate::network::ItemKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A lookup was admitted and its process is about to start.
    AboutToStart { key: TaskKey },
    /// A lookup ended, successfully or not.
    Finished { key: TaskKey, outcome: TaskOutcome },
    /// Fired when the first lookup starts and when the last one ends.
    RunStateChanged { busy: bool },
    /// The model was updated with the results for `target`.
    ModelChanged { kind: LookupKind, target: ItemKey },
    /// A lookup could not be started because its tool is missing.
    ToolNotFound { kind: LookupKind, tool: String },
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: ScanEvent);
}

impl NotificationSink for UnboundedSender<ScanEvent> {
    fn notify(&self, event: ScanEvent) {
        // A dropped receiver means nobody is listening any more.
        let _ = self.send(event);
    }
}
