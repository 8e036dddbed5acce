//! Ordered write queue mirroring the cart to storage.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::storage::{KeyValueStorage, StorageError};

/// Work for the writer task.
pub(super) enum WriteRequest {
    /// Store `blob`, then report the outcome on `done`.
    Write {
        seq: u64,
        blob: String,
        done: oneshot::Sender<Result<(), StorageError>>,
    },
    /// Signal `done` once every earlier request has been processed.
    Flush(oneshot::Sender<()>),
}

/// Shared record of the most recent failed write.
pub(super) type LastError = Arc<Mutex<Option<StorageError>>>;

/// Completion handle for one queued storage write.
///
/// Await it (it implements [`IntoFuture`]) to learn whether the write
/// succeeded. Dropping it does not cancel the write.
#[derive(Debug)]
pub struct PendingWrite {
    rx: oneshot::Receiver<Result<(), StorageError>>,
}

impl PendingWrite {
    pub(super) const fn new(rx: oneshot::Receiver<Result<(), StorageError>>) -> Self {
        Self { rx }
    }
}

impl IntoFuture for PendingWrite {
    type Output = Result<(), StorageError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.rx.await.unwrap_or(Err(StorageError::WriterClosed)) })
    }
}

/// Spawn the writer task and return the queue feeding it.
///
/// The task exits once every sender is dropped, after draining what is queued.
pub(super) fn spawn_writer(
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    last_error: LastError,
) -> mpsc::UnboundedSender<WriteRequest> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(writer_loop(rx, storage, key, last_error));
    tx
}

async fn writer_loop(
    mut rx: mpsc::UnboundedReceiver<WriteRequest>,
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    last_error: LastError,
) {
    while let Some(request) = rx.recv().await {
        match request {
            WriteRequest::Write { seq, blob, done } => {
                let result = storage.set(&key, blob).await;
                match &result {
                    Ok(()) => debug!(seq, key = %key, "Cart persisted"),
                    Err(e) => {
                        warn!(seq, key = %key, error = %e, "Failed to persist cart");
                        *last_error.lock().unwrap_or_else(PoisonError::into_inner) =
                            Some(e.clone());
                    }
                }
                // The caller may have dropped its handle; that is fine.
                let _ = done.send(result);
            }
            WriteRequest::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!(key = %key, "Cart writer stopped");
}
