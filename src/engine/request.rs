//! Operation requests and completions

use crate::layout::{KeyArgument, Record};
use crate::store::EqualityMode;

/// One unit of work against a keyed file. Owns everything it needs.
#[derive(Debug, Clone)]
pub enum Request {
    /// Next record in key order
    Read,
    /// Locate per mode, then read
    Find {
        key: Option<KeyArgument>,
        mode: EqualityMode,
    },
    /// Insert a record
    Write(Record),
    /// Rewrite the current record
    Update(Record),
    /// Delete the current record
    Delete,
    /// Remove the dataset (handle must be closed)
    Deallocate,
}

impl Request {
    /// Short operation name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Request::Read => "read",
            Request::Find { .. } => "find",
            Request::Write(_) => "write",
            Request::Update(_) => "update",
            Request::Delete => "delete",
            Request::Deallocate => "deallocate",
        }
    }
}

/// The single result delivered for a request
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// A record was read
    Record(Record),
    /// End of data, or no record matched
    NoRecord,
    /// The mutation was applied
    Done,
}

impl Completion {
    /// The record, if one was read
    pub fn into_record(self) -> Option<Record> {
        match self {
            Completion::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl From<Option<Record>> for Completion {
    fn from(record: Option<Record>) -> Self {
        record.map_or(Completion::NoRecord, Completion::Record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_completion_from_option() {
        assert_eq!(Completion::from(None), Completion::NoRecord);

        let mut record = Record::new();
        record.insert("key".into(), Value::String("K1".into()));
        let completion = Completion::from(Some(record.clone()));
        assert_eq!(completion.into_record(), Some(record));
        assert_eq!(Completion::Done.into_record(), None);
    }

    #[test]
    fn test_request_names() {
        let find = Request::Find {
            key: Some(KeyArgument::text("K1")),
            mode: EqualityMode::Equal,
        };
        assert_eq!(find.name(), "find");
        assert_eq!(Request::Deallocate.name(), "deallocate");
    }
}
