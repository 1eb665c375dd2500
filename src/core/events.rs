// src/core/events.rs

use crate::models::{LogKind, ProcessEvent, ProcessId};
use tokio::sync::mpsc;

/// Creates a connected sink/stream pair.
pub fn channel() -> (EventSink, EventStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSink { tx }, EventStream { rx })
}

/// Sending half of the notification channel. Cheap to clone; every watcher task holds one.
///
/// Sends never fail from the caller's point of view: once the subscriber is gone events
/// are simply dropped.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<ProcessEvent>,
}

impl EventSink {
    pub fn log(&self, id: ProcessId, kind: LogKind, data: impl Into<String>) {
        self.emit(ProcessEvent::Log {
            id,
            kind,
            data: data.into(),
        });
    }

    pub fn exit(&self, id: ProcessId, code: Option<i32>) {
        self.emit(ProcessEvent::Exit { id, code });
    }

    fn emit(&self, event: ProcessEvent) {
        if self.tx.send(event).is_err() {
            log::trace!("Event subscriber is gone; dropping notification.");
        }
    }
}

/// Receiving half, owned by the presentation layer.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::UnboundedReceiver<ProcessEvent>,
}

impl EventStream {
    /// Waits for the next event. Returns `None` once every sink has been dropped.
    pub async fn recv(&mut self) -> Option<ProcessEvent> {
        self.rx.recv().await
    }

    /// Returns an event if one is already queued.
    pub fn try_recv(&mut self) -> Option<ProcessEvent> {
        self.rx.try_recv().ok()
    }
}
