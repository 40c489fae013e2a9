//! Async session over a keyed file
//!
//! Every per-record method takes `&mut self`, so at most one operation is
//! awaited per session and awaited operations apply in submission order.
//!
//! Dropping a future after its work was submitted does not stop that work;
//! it still runs on the blocking pool and the handle mutex keeps it from
//! overlapping other requests. The mutex is not fair, so work from an
//! abandoned future may run before or after the next submitted request.
//! Ordering holds only for futures that are awaited to completion.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::dispatch::submit;
use super::request::{Completion, Request};
use crate::error::{DatasetError, DatasetResult, ErrorCode};
use crate::handle::KeyedFile;
use crate::layout::{KeyArgument, Record, RecordLayout};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::store::{Catalog, EqualityMode};

/// Async front end of a [`KeyedFile`].
#[derive(Debug)]
pub struct AsyncKeyedFile {
    inner: Arc<Mutex<KeyedFile>>,
    path: String,
    metrics: Arc<MetricsRegistry>,
}

impl AsyncKeyedFile {
    /// Wraps an already opened handle.
    pub fn new(handle: KeyedFile) -> Self {
        let path = handle.path().to_string();
        let metrics = Arc::clone(handle.metrics());
        Self {
            inner: Arc::new(Mutex::new(handle)),
            path,
            metrics,
        }
    }

    /// Opens an existing dataset. Errors are returned directly.
    pub fn open_existing(
        catalog: Arc<dyn Catalog>,
        path: impl Into<String>,
        layout: RecordLayout,
    ) -> DatasetResult<Self> {
        KeyedFile::open_existing(catalog, path, layout).map(Self::new)
    }

    /// Allocates and opens a new dataset. Errors are returned directly.
    pub fn create_new(
        catalog: Arc<dyn Catalog>,
        path: impl Into<String>,
        layout: RecordLayout,
    ) -> DatasetResult<Self> {
        KeyedFile::create_new(catalog, path, layout).map(Self::new)
    }

    /// Dataset name
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Operation counters of the underlying handle
    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Whether the underlying handle is open
    pub fn is_open(&self) -> bool {
        self.lock().is_open()
    }

    /// Reads the next record.
    pub async fn read(&mut self) -> DatasetResult<Option<Record>> {
        self.run(Request::Read).await.map(Completion::into_record)
    }

    /// Locates per `mode` and reads the record found.
    pub async fn find(
        &mut self,
        key: Option<KeyArgument>,
        mode: EqualityMode,
    ) -> DatasetResult<Option<Record>> {
        self.run(Request::Find { key, mode })
            .await
            .map(Completion::into_record)
    }

    /// Inserts a record.
    pub async fn write(&mut self, record: Record) -> DatasetResult<()> {
        self.run(Request::Write(record)).await.map(|_| ())
    }

    /// Rewrites the current record.
    pub async fn update(&mut self, record: Record) -> DatasetResult<()> {
        self.run(Request::Update(record)).await.map(|_| ())
    }

    /// Deletes the current record.
    pub async fn delete(&mut self) -> DatasetResult<()> {
        self.run(Request::Delete).await.map(|_| ())
    }

    /// Closes the handle. Runs on the caller's thread.
    pub fn close(&mut self) -> DatasetResult<()> {
        self.lock().close()
    }

    /// Removes the dataset. The open-state check happens before any work
    /// is submitted.
    pub async fn deallocate(&mut self) -> DatasetResult<()> {
        if self.is_open() {
            return Err(DatasetError::still_open().with_details(format!("dataset: {}", self.path)));
        }
        self.dispatch(Request::Deallocate).await.map(|_| ())
    }

    /// Submits one request. A closed handle is rejected before submission.
    pub async fn run(&mut self, request: Request) -> DatasetResult<Completion> {
        if !self.is_open() {
            return Err(DatasetError::not_open());
        }
        self.dispatch(request).await
    }

    async fn dispatch(&mut self, request: Request) -> DatasetResult<Completion> {
        let operation = request.name();
        let inner = Arc::clone(&self.inner);
        let result = submit(move || {
            let mut handle = inner.lock().unwrap_or_else(PoisonError::into_inner);
            handle.execute(request)
        })
        .await;

        // Handle-level failures are logged by the handle; a lost unit of work is not.
        if let Err(e) = &result {
            if e.code() == ErrorCode::Cancelled {
                self.metrics.increment_failures();
                log_event_with_fields(
                    Event::OperationFailed,
                    &[
                        ("code", e.code().code()),
                        ("dataset", self.path.as_str()),
                        ("operation", operation),
                    ],
                );
            }
        }
        result
    }

    fn lock(&self) -> MutexGuard<'_, KeyedFile> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
