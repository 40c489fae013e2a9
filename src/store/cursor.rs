//! Ordered record set and stream position
//!
//! Records are kept in a `BTreeMap` keyed by their key bytes, so iteration
//! order is unsigned lexicographic key order.

use std::collections::BTreeMap;
use std::ops::Bound;

use super::backend::{ContainerSpec, EqualityMode};
use super::errors::{StoreError, StoreResult};

/// All live records of one container.
#[derive(Debug)]
pub struct RecordSet {
    spec: ContainerSpec,
    records: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl RecordSet {
    /// Creates an empty record set
    pub fn new(spec: ContainerSpec) -> Self {
        Self {
            spec,
            records: BTreeMap::new(),
        }
    }

    /// Container geometry
    pub fn spec(&self) -> ContainerSpec {
        self.spec
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in key order
    pub fn iter(&self) -> impl Iterator<Item = &Vec<u8>> {
        self.records.values()
    }

    fn check_length(&self, record: &[u8]) -> StoreResult<()> {
        if record.len() != self.spec.record_length {
            return Err(StoreError::RecordLength {
                expected: self.spec.record_length,
                actual: record.len(),
            });
        }
        Ok(())
    }

    /// Checks that a record may be inserted.
    pub fn check_insert(&self, record: &[u8]) -> StoreResult<()> {
        self.check_length(record)?;
        if self.records.contains_key(self.spec.key_of(record)) {
            return Err(StoreError::DuplicateKey);
        }
        Ok(())
    }

    /// Checks that `record` may replace the record stored under `current`.
    pub fn check_replace(&self, current: &[u8], record: &[u8]) -> StoreResult<()> {
        self.check_length(record)?;
        if self.spec.key_of(record) != current {
            return Err(StoreError::KeyChanged);
        }
        if !self.records.contains_key(current) {
            return Err(StoreError::NoCurrentRecord);
        }
        Ok(())
    }

    /// Stores a record under its key, replacing any previous one.
    pub fn put(&mut self, record: Vec<u8>) {
        let key = self.spec.key_of(&record).to_vec();
        self.records.insert(key, record);
    }

    /// Removes the record with the given key.
    pub fn erase(&mut self, key: &[u8]) -> bool {
        self.records.remove(key).is_some()
    }

    fn first_from(&self, lower: Bound<&[u8]>) -> Option<(&Vec<u8>, &Vec<u8>)> {
        self.records
            .range::<[u8], _>((lower, Bound::Unbounded))
            .next()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Position {
    /// Before the first record
    Start,
    /// At the first record with key >= the given key
    From(Vec<u8>),
    /// Just past the given key
    After(Vec<u8>),
    /// Past the last record
    End,
}

/// Position and current record of one open stream.
#[derive(Debug, Clone)]
pub struct Cursor {
    position: Position,
    current: Option<Vec<u8>>,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            position: Position::Start,
            current: None,
        }
    }
}

impl Cursor {
    /// Key of the record last returned by `next`
    pub fn current(&self) -> Option<&[u8]> {
        self.current.as_deref()
    }

    /// Forgets the current record (after a delete).
    pub fn clear_current(&mut self) {
        self.current = None;
    }

    /// Positions the cursor per mode. Returns `false` if nothing matches,
    /// leaving the cursor at end of data.
    pub fn locate(&mut self, set: &RecordSet, key: &[u8], mode: EqualityMode) -> bool {
        self.current = None;
        let target = match mode {
            EqualityMode::First => set.records.keys().next().cloned(),
            EqualityMode::Last => set.records.keys().next_back().cloned(),
            EqualityMode::GreaterOrEqual => set
                .first_from(Bound::Included(key))
                .map(|(k, _)| k.clone()),
            EqualityMode::Equal => set
                .first_from(Bound::Included(key))
                .filter(|(k, _)| k.starts_with(key))
                .map(|(k, _)| k.clone()),
        };

        match target {
            Some(k) => {
                self.position = Position::From(k);
                true
            }
            None => {
                self.position = Position::End;
                false
            }
        }
    }

    /// Returns the record at the position and advances past it.
    pub fn next(&mut self, set: &RecordSet) -> Option<Vec<u8>> {
        let found = match &self.position {
            Position::Start => set.first_from(Bound::Unbounded),
            Position::From(k) => set.first_from(Bound::Included(k.as_slice())),
            Position::After(k) => set.first_from(Bound::Excluded(k.as_slice())),
            Position::End => None,
        };

        match found {
            Some((key, record)) => {
                self.position = Position::After(key.clone());
                self.current = Some(key.clone());
                Some(record.clone())
            }
            None => {
                self.position = Position::End;
                self.current = None;
                None
            }
        }
    }
}
