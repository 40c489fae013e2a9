//! Catalog and stream traits
//!
//! A catalog names and provisions keyed containers; a stream is one open
//! container with a position and a current record.

use std::fmt;

use super::errors::StoreResult;

/// Geometry of a keyed container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerSpec {
    /// Fixed record width in bytes
    pub record_length: usize,
    /// Key width in bytes
    pub key_length: usize,
    /// Byte offset of the key inside each record
    pub key_offset: usize,
}

impl ContainerSpec {
    /// Checks that the key lies inside the record.
    pub fn is_valid(&self) -> bool {
        self.record_length > 0
            && self.key_length > 0
            && self.key_offset + self.key_length <= self.record_length
    }

    /// Key bytes of a record laid out with this geometry
    pub fn key_of<'a>(&self, record: &'a [u8]) -> &'a [u8] {
        &record[self.key_offset..self.key_offset + self.key_length]
    }
}

/// Which record a locate targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqualityMode {
    /// Key equal to the argument (prefix match for short keys)
    Equal,
    /// First key greater than or equal to the argument
    GreaterOrEqual,
    /// First record in key order; takes no key
    First,
    /// Last record in key order; takes no key
    Last,
}

impl EqualityMode {
    /// Whether the mode needs a key argument
    pub fn requires_key(&self) -> bool {
        matches!(self, EqualityMode::Equal | EqualityMode::GreaterOrEqual)
    }

    /// Short name used in logs and the CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            EqualityMode::Equal => "eq",
            EqualityMode::GreaterOrEqual => "ge",
            EqualityMode::First => "first",
            EqualityMode::Last => "last",
        }
    }
}

impl fmt::Display for EqualityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One open keyed container.
pub trait KeyedStream: Send + fmt::Debug {
    /// Geometry reported by the container
    fn spec(&self) -> ContainerSpec;

    /// Positions the stream. Returns `false` if no record matches.
    fn locate(&mut self, key: &[u8], mode: EqualityMode) -> StoreResult<bool>;

    /// Returns the record at the position and advances past it.
    fn read_next(&mut self) -> StoreResult<Option<Vec<u8>>>;

    /// Inserts a record, returning the number of bytes accepted.
    fn write(&mut self, record: &[u8]) -> StoreResult<usize>;

    /// Rewrites the current record. The key may not change.
    fn update(&mut self, record: &[u8]) -> StoreResult<()>;

    /// Deletes the current record.
    fn delete_current(&mut self) -> StoreResult<()>;

    /// Releases the stream.
    fn close(self: Box<Self>) -> StoreResult<()>;
}

/// Names, provisions and removes keyed containers.
pub trait Catalog: Send + Sync + fmt::Debug {
    /// Opens an existing container.
    fn open(&self, name: &str) -> StoreResult<Box<dyn KeyedStream>>;

    /// Whether a container exists and its contents can be read. Never
    /// modifies the container.
    fn contains(&self, name: &str) -> bool;

    /// Allocates a new, empty container.
    fn allocate(&self, name: &str, spec: ContainerSpec) -> StoreResult<()>;

    /// Removes a container and all of its records.
    fn remove(&self, name: &str) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_validity() {
        let spec = ContainerSpec { record_length: 10, key_length: 4, key_offset: 6 };
        assert!(spec.is_valid());
        assert!(!ContainerSpec { key_offset: 7, ..spec }.is_valid());
        assert!(!ContainerSpec { key_length: 0, ..spec }.is_valid());
    }

    #[test]
    fn test_key_of() {
        let spec = ContainerSpec { record_length: 5, key_length: 2, key_offset: 1 };
        assert_eq!(spec.key_of(&[9, 1, 2, 9, 9]), &[1, 2]);
    }

    #[test]
    fn test_mode_requires_key() {
        assert!(EqualityMode::Equal.requires_key());
        assert!(EqualityMode::GreaterOrEqual.requires_key());
        assert!(!EqualityMode::First.requires_key());
        assert!(!EqualityMode::Last.requires_key());
    }
}
