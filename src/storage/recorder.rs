//! Background persistence of engine events
//!
//! [`Recorder`] is the storage-side [`EventSink`]. `emit` only pushes onto an
//! unbounded channel; a tokio task drains it and writes each event through
//! `spawn_blocking`. Write failures are logged and never reach the engine.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{HistoryStore, SharedDatabase, UsageStore};
use crate::engine::{EngineEvent, EventSink};
use crate::types::Result;

enum Message {
    Event(EngineEvent),
    Flush(oneshot::Sender<()>),
}

#[derive(Debug, Clone)]
pub struct Recorder {
    tx: mpsc::UnboundedSender<Message>,
}

impl Recorder {
    /// Start the writer task. Must be called inside a tokio runtime.
    pub fn spawn(db: SharedDatabase) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(Self::run(db, rx));
        (Self { tx }, handle)
    }

    async fn run(db: SharedDatabase, mut rx: mpsc::UnboundedReceiver<Message>) {
        while let Some(message) = rx.recv().await {
            match message {
                Message::Event(event) => {
                    let db = db.clone();
                    match tokio::task::spawn_blocking(move || persist(&db, &event)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => warn!("Failed to record event: {}", e),
                        Err(e) => warn!("Recorder write task failed: {}", e),
                    }
                }
                Message::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
        debug!("Recorder stopped");
    }

    /// Wait until every event emitted before this call has been written
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Message::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

impl EventSink for Recorder {
    fn emit(&self, event: EngineEvent) {
        if self.tx.send(Message::Event(event)).is_err() {
            warn!("Recorder is not running; event dropped");
        }
    }
}

fn persist(db: &SharedDatabase, event: &EngineEvent) -> Result<()> {
    match event {
        EngineEvent::Usage(usage) => {
            UsageStore::new(db).append(usage)?;
        }
        EngineEvent::PromptGenerated(record) => {
            let id = HistoryStore::new(db).save(record)?;
            debug!("Saved prompt {} to history", id);
        }
    }
    Ok(())
}
