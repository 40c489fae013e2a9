//! Keyed file handle lifecycle
//!
//! ```text
//! open_existing / create_new          close
//!   Closed ──────────────────▶ Open ─────────▶ Closed ──▶ deallocate
//! ```
//!
//! The handle owns its stream exclusively. Dropping an open handle closes
//! the stream.

use std::fmt;
use std::sync::Arc;

use crate::error::{DatasetError, DatasetResult};
use crate::layout::RecordLayout;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::store::{Catalog, ContainerSpec, KeyedStream, StoreError};

/// An open (or closed, awaiting deallocation) keyed dataset.
pub struct KeyedFile {
    path: String,
    layout: RecordLayout,
    record_length: usize,
    key_length: usize,
    catalog: Arc<dyn Catalog>,
    stream: Option<Box<dyn KeyedStream>>,
    metrics: Arc<MetricsRegistry>,
}

impl KeyedFile {
    /// Opens an existing dataset.
    ///
    /// # Errors
    ///
    /// - `KEYFILE_DATASET_NOT_FOUND` if the dataset does not exist
    /// - `KEYFILE_FORMAT_MISMATCH` if its geometry disagrees with `layout`
    /// - `KEYFILE_OPEN_FAILED` for an invalid name, corruption or I/O failure
    pub fn open_existing(
        catalog: Arc<dyn Catalog>,
        path: impl Into<String>,
        layout: RecordLayout,
    ) -> DatasetResult<Self> {
        let path = path.into();
        let stream = catalog
            .open(&path)
            .map_err(|e| open_error(&path, e))?;
        let handle = Self::attach(catalog, path, layout, stream)?;
        log_event_with_fields(Event::DatasetOpened, &handle.log_fields());
        Ok(handle)
    }

    /// Allocates a new dataset sized to `layout` and opens it.
    ///
    /// # Errors
    ///
    /// - `KEYFILE_DATASET_EXISTS` if the dataset already exists
    /// - `KEYFILE_PROVISIONING_FAILED` if the container cannot be allocated
    /// - any error of [`KeyedFile::open_existing`]
    pub fn create_new(
        catalog: Arc<dyn Catalog>,
        path: impl Into<String>,
        layout: RecordLayout,
    ) -> DatasetResult<Self> {
        let path = path.into();
        catalog
            .allocate(&path, layout.container_spec())
            .map_err(|e| match e {
                StoreError::AlreadyExists(_) => DatasetError::already_exists(&path),
                StoreError::InvalidName(_) => DatasetError::open_failed(&path).with_source(e),
                other => DatasetError::provisioning(&path).with_source(other),
            })?;

        let stream = catalog
            .open(&path)
            .map_err(|e| open_error(&path, e))?;
        let handle = Self::attach(catalog, path, layout, stream)?;
        log_event_with_fields(Event::DatasetCreated, &handle.log_fields());
        Ok(handle)
    }

    /// Whether a dataset can be opened. Any open failure reads as absent.
    /// The dataset is read but never modified.
    pub fn exists(catalog: &dyn Catalog, path: &str) -> bool {
        catalog.contains(path)
    }

    fn attach(
        catalog: Arc<dyn Catalog>,
        path: String,
        layout: RecordLayout,
        stream: Box<dyn KeyedStream>,
    ) -> DatasetResult<Self> {
        let spec = stream.spec();
        if let Err(e) = check_geometry(&spec, &layout) {
            let _ = stream.close();
            log_event_with_fields(
                Event::OpenFailed,
                &[("dataset", path.as_str()), ("code", e.code().code())],
            );
            return Err(e.with_details(format!("dataset: {}", path)));
        }

        Ok(Self {
            path,
            layout,
            record_length: spec.record_length,
            key_length: spec.key_length,
            catalog,
            stream: Some(stream),
            metrics: Arc::new(MetricsRegistry::new()),
        })
    }

    /// Releases the stream.
    ///
    /// # Errors
    ///
    /// `KEYFILE_NOT_OPEN` if the handle is already closed, or
    /// `KEYFILE_CLOSE_FAILED` if the stream could not be released cleanly.
    /// The handle is closed either way.
    pub fn close(&mut self) -> DatasetResult<()> {
        let stream = self.stream.take().ok_or_else(DatasetError::not_open)?;
        stream.close().map_err(|e| {
            DatasetError::close_failed()
                .with_details(format!("dataset: {}", self.path))
                .with_source(e)
        })?;
        log_event_with_fields(Event::DatasetClosed, &self.log_fields());
        Ok(())
    }

    /// Removes the dataset and all its records. The handle must be closed.
    pub fn deallocate(&mut self) -> DatasetResult<()> {
        if self.is_open() {
            return Err(DatasetError::still_open().with_details(format!("dataset: {}", self.path)));
        }
        self.catalog
            .remove(&self.path)
            .map_err(|e| DatasetError::deallocate_failed(&self.path).with_source(e))?;
        log_event_with_fields(Event::DatasetDeallocated, &[("dataset", self.path.as_str())]);
        Ok(())
    }

    /// Whether the handle holds an open stream
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Dataset name
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Record layout
    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Record width reported by the container
    pub fn record_length(&self) -> usize {
        self.record_length
    }

    /// Key width reported by the container
    pub fn key_length(&self) -> usize {
        self.key_length
    }

    /// Operation counters for this handle
    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    pub(crate) fn stream_mut(&mut self) -> DatasetResult<&mut (dyn KeyedStream + 'static)> {
        self.stream.as_deref_mut().ok_or_else(DatasetError::not_open)
    }

    fn log_fields(&self) -> [(&str, &str); 2] {
        [("dataset", self.path.as_str()), ("charset", self.layout.codec().charset().name())]
    }
}

fn check_geometry(spec: &ContainerSpec, layout: &RecordLayout) -> DatasetResult<()> {
    if spec.key_length != layout.key_length() {
        return Err(DatasetError::format(format!(
            "Incorrect key length: dataset has {}, layout has {}",
            spec.key_length,
            layout.key_length()
        )));
    }
    if spec.record_length != layout.record_length() {
        return Err(DatasetError::format(format!(
            "Incorrect record length: dataset has {}, layout has {}",
            spec.record_length,
            layout.record_length()
        )));
    }
    if spec.key_offset != layout.key_offset() {
        return Err(DatasetError::format(format!(
            "Incorrect key offset: dataset has {}, layout has {}",
            spec.key_offset,
            layout.key_offset()
        )));
    }
    Ok(())
}

fn open_error(path: &str, err: StoreError) -> DatasetError {
    let mapped = match err {
        StoreError::NotFound(_) => DatasetError::not_found(path),
        StoreError::Corrupt { offset, .. } => {
            let offset = offset.to_string();
            log_event_with_fields(
                Event::CorruptionDetected,
                &[("dataset", path), ("offset", offset.as_str())],
            );
            DatasetError::open_failed(path).with_source(err)
        }
        other => DatasetError::open_failed(path).with_source(other),
    };
    log_event_with_fields(
        Event::OpenFailed,
        &[("dataset", path), ("code", mapped.code().code())],
    );
    mapped
}

impl Drop for KeyedFile {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.close();
        }
    }
}

impl fmt::Debug for KeyedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedFile")
            .field("path", &self.path)
            .field("record_length", &self.record_length)
            .field("key_length", &self.key_length)
            .field("open", &self.is_open())
            .finish()
    }
}
