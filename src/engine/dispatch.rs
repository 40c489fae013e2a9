//! Blocking work submission
//!
//! Each unit of work runs on the runtime's blocking pool and reports
//! through a oneshot channel. The sender is consumed by the single send,
//! so a completion is delivered at most once; if the work is dropped
//! before it runs (runtime shutdown) or panics, the sender is dropped and
//! the caller sees `KEYFILE_CANCELLED`.

use tokio::sync::oneshot;

use crate::error::{DatasetError, DatasetResult};

/// Runs `work` on the blocking pool and awaits its single completion.
pub(crate) async fn submit<T, F>(work: F) -> DatasetResult<T>
where
    F: FnOnce() -> DatasetResult<T> + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    tokio::task::spawn_blocking(move || {
        // Receiver gone means the caller stopped waiting
        let _ = tx.send(work());
    });
    rx.await.unwrap_or_else(|_| Err(DatasetError::cancelled()))
}
