//! Coalescing background writer
//!
//! Mutations hand over fully encoded collection snapshots. Snapshots of
//! the same collection arriving within the window replace each other, so
//! a burst of meal logs costs one file write.

use super::{Collection, JsonStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, warn};

enum WriteCommand {
    Write(Collection, Vec<u8>),
    Flush(oneshot::Sender<()>),
}

/// Handle to the background writer task
#[derive(Clone)]
pub struct DebouncedWriter {
    tx: mpsc::UnboundedSender<WriteCommand>,
    files_written: Arc<AtomicU64>,
}

impl DebouncedWriter {
    /// Spawn the writer task on the current runtime
    pub fn spawn(store: Arc<JsonStore>, window: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let files_written = Arc::new(AtomicU64::new(0));
        tokio::spawn(run(store, window, rx, files_written.clone()));
        Self { tx, files_written }
    }

    /// Queue a snapshot for writing
    pub fn submit(&self, collection: Collection, bytes: Vec<u8>) {
        if self.tx.send(WriteCommand::Write(collection, bytes)).is_err() {
            warn!(file = collection.file_name(), "Writer stopped; snapshot dropped");
        }
    }

    /// Write everything pending and wait for it to land
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(WriteCommand::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Number of files written since start
    pub fn files_written(&self) -> u64 {
        self.files_written.load(Ordering::Relaxed)
    }
}

async fn run(
    store: Arc<JsonStore>,
    window: Duration,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
    files_written: Arc<AtomicU64>,
) {
    let mut pending: HashMap<Collection, Vec<u8>> = HashMap::new();
    let mut deadline: Option<Instant> = None;

    loop {
        let command = match deadline {
            Some(at) => tokio::select! {
                command = rx.recv() => command,
                _ = tokio::time::sleep_until(at) => {
                    write_pending(&store, &mut pending, &files_written).await;
                    deadline = None;
                    continue;
                }
            },
            None => rx.recv().await,
        };

        match command {
            Some(WriteCommand::Write(collection, bytes)) => {
                pending.insert(collection, bytes);
                deadline.get_or_insert_with(|| Instant::now() + window);
            }
            Some(WriteCommand::Flush(ack)) => {
                write_pending(&store, &mut pending, &files_written).await;
                deadline = None;
                let _ = ack.send(());
            }
            None => {
                write_pending(&store, &mut pending, &files_written).await;
                debug!("Writer channel closed");
                break;
            }
        }
    }
}

async fn write_pending(
    store: &JsonStore,
    pending: &mut HashMap<Collection, Vec<u8>>,
    files_written: &AtomicU64,
) {
    for (collection, bytes) in pending.drain() {
        match store.write(collection, &bytes).await {
            Ok(()) => {
                files_written.fetch_add(1, Ordering::Relaxed);
            }
            // The next mutation resubmits a full snapshot
            Err(e) => warn!(file = collection.file_name(), error = %e, "Failed to persist collection"),
        }
    }
}
