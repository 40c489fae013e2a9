//! Per-record operations on an open keyed file
//!
//! Each operation is one blocking unit of work. No record found is a
//! normal outcome (`None`), not an error. A failed operation leaves the
//! handle open and usable.

use super::request::{Completion, Request};
use crate::error::{DatasetError, DatasetResult};
use crate::handle::KeyedFile;
use crate::layout::{KeyArgument, Record};
use crate::observability::{Event, Logger};
use crate::store::EqualityMode;

impl KeyedFile {
    /// Reads the record at the current position and advances past it.
    ///
    /// Returns `None` at end of data. The record read becomes the current
    /// record for [`update`](Self::update) and [`delete`](Self::delete).
    pub fn read(&mut self) -> DatasetResult<Option<Record>> {
        self.metrics().increment_reads();
        let result = self.read_next();
        self.observe("read", result)
    }

    /// Positions the stream per `mode` and reads the record found.
    ///
    /// `Equal` and `GreaterOrEqual` need a key; `First` and `Last` ignore it.
    pub fn find(
        &mut self,
        key: Option<&KeyArgument>,
        mode: EqualityMode,
    ) -> DatasetResult<Option<Record>> {
        self.metrics().increment_finds();
        let result = self.locate_and_read(key, mode);
        self.observe("find", result)
    }

    /// Positions at the lowest key and reads it.
    pub fn find_first(&mut self) -> DatasetResult<Option<Record>> {
        self.find(None, EqualityMode::First)
    }

    /// Positions at the highest key and reads it.
    pub fn find_last(&mut self) -> DatasetResult<Option<Record>> {
        self.find(None, EqualityMode::Last)
    }

    /// Inserts a record.
    ///
    /// # Errors
    ///
    /// `KEYFILE_FIELD_TYPE` if a field value is missing or not a string,
    /// `KEYFILE_WRITE_FAILED` if the container does not accept the full
    /// record (duplicate key, I/O failure).
    pub fn write(&mut self, record: &Record) -> DatasetResult<()> {
        let result = self.write_record(record);
        self.observe("write", result)
    }

    /// Rewrites the current record. The key may not change.
    pub fn update(&mut self, record: &Record) -> DatasetResult<()> {
        let result = self.update_record(record);
        self.observe("update", result)
    }

    /// Deletes the current record.
    pub fn delete(&mut self) -> DatasetResult<()> {
        let result = self.delete_record();
        self.observe("delete", result)
    }

    /// Runs one request to its single completion.
    pub fn execute(&mut self, request: Request) -> DatasetResult<Completion> {
        match request {
            Request::Read => self.read().map(Completion::from),
            Request::Find { key, mode } => self.find(key.as_ref(), mode).map(Completion::from),
            Request::Write(record) => self.write(&record).map(|_| Completion::Done),
            Request::Update(record) => self.update(&record).map(|_| Completion::Done),
            Request::Delete => self.delete().map(|_| Completion::Done),
            Request::Deallocate => self.deallocate().map(|_| Completion::Done),
        }
    }

    fn read_next(&mut self) -> DatasetResult<Option<Record>> {
        let bytes = self
            .stream_mut()?
            .read_next()
            .map_err(|e| DatasetError::read_failed().with_source(e))?;
        let record = match bytes {
            Some(bytes) => Some(self.layout().decode_record(&bytes)?),
            None => None,
        };
        self.metrics().record_lookup(record.is_some());
        Ok(record)
    }

    fn locate_and_read(
        &mut self,
        key: Option<&KeyArgument>,
        mode: EqualityMode,
    ) -> DatasetResult<Option<Record>> {
        self.stream_mut()?;

        let key_bytes = if mode.requires_key() {
            let key = key.ok_or_else(|| {
                DatasetError::field_type(
                    &self.layout().key_field().name,
                    format!("Mode '{}' requires a key", mode),
                )
            })?;
            self.layout().encode_key(key)?
        } else {
            Vec::new()
        };

        let found = self
            .stream_mut()?
            .locate(&key_bytes, mode)
            .map_err(|e| DatasetError::read_failed().with_source(e))?;
        if !found {
            self.metrics().record_lookup(false);
            return Ok(None);
        }
        self.read_next()
    }

    fn write_record(&mut self, record: &Record) -> DatasetResult<()> {
        self.stream_mut()?;
        let buffer = self.layout().encode_record(record)?;
        let expected = self.record_length();

        let accepted = self
            .stream_mut()?
            .write(&buffer)
            .map_err(|e| DatasetError::write_failed().with_source(e))?;
        if accepted < expected {
            return Err(DatasetError::write_failed()
                .with_details(format!("accepted {} of {} bytes", accepted, expected)));
        }
        self.metrics().record_write(accepted as u64);
        Ok(())
    }

    fn update_record(&mut self, record: &Record) -> DatasetResult<()> {
        self.stream_mut()?;
        let buffer = self.layout().encode_record(record)?;
        self.stream_mut()?
            .update(&buffer)
            .map_err(|e| DatasetError::update_failed().with_source(e))?;
        self.metrics().record_update(buffer.len() as u64);
        Ok(())
    }

    fn delete_record(&mut self) -> DatasetResult<()> {
        self.stream_mut()?
            .delete_current()
            .map_err(|e| DatasetError::delete_failed().with_source(e))?;
        self.metrics().increment_deletes();
        Ok(())
    }

    /// Counts and logs the outcome of one operation.
    fn observe<T>(&self, operation: &str, result: DatasetResult<T>) -> DatasetResult<T> {
        match &result {
            Ok(_) => {
                let event = Event::OperationCompleted;
                Logger::log(
                    event.severity(),
                    event.as_str(),
                    &[("dataset", self.path()), ("operation", operation)],
                );
            }
            Err(e) => {
                self.metrics().increment_failures();
                let event = Event::OperationFailed;
                Logger::log(
                    event.severity(),
                    event.as_str(),
                    &[
                        ("code", e.code().code()),
                        ("dataset", self.path()),
                        ("operation", operation),
                    ],
                );
            }
        }
        result
    }
}
