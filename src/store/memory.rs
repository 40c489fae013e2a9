//! In-memory catalog
//!
//! Containers live for the lifetime of the catalog. Every stream opened on
//! a container shares its records but keeps its own position.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use super::backend::{Catalog, ContainerSpec, EqualityMode, KeyedStream};
use super::cursor::{Cursor, RecordSet};
use super::errors::{StoreError, StoreResult};

type SharedSet = Arc<Mutex<RecordSet>>;

/// Process-local catalog of keyed containers.
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    containers: Arc<RwLock<HashMap<String, SharedSet>>>,
}

impl MemoryCatalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of containers
    pub fn len(&self) -> usize {
        self.containers.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Whether the catalog holds no containers
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Internal("catalog lock poisoned".into())
}

impl Catalog for MemoryCatalog {
    fn open(&self, name: &str) -> StoreResult<Box<dyn KeyedStream>> {
        let containers = self.containers.read().map_err(poisoned)?;
        let set = containers
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let spec = set.lock().map_err(poisoned)?.spec();
        Ok(Box::new(MemoryStream {
            spec,
            set,
            cursor: Cursor::default(),
        }))
    }

    fn contains(&self, name: &str) -> bool {
        self.containers
            .read()
            .map(|containers| containers.contains_key(name))
            .unwrap_or(false)
    }

    fn allocate(&self, name: &str, spec: ContainerSpec) -> StoreResult<()> {
        if name.is_empty() {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        if !spec.is_valid() {
            return Err(StoreError::InvalidSpec(format!("{:?}", spec)));
        }
        let mut containers = self.containers.write().map_err(poisoned)?;
        if containers.contains_key(name) {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        containers.insert(name.to_string(), Arc::new(Mutex::new(RecordSet::new(spec))));
        Ok(())
    }

    fn remove(&self, name: &str) -> StoreResult<()> {
        let mut containers = self.containers.write().map_err(poisoned)?;
        containers
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}

/// Stream over an in-memory container.
#[derive(Debug)]
struct MemoryStream {
    spec: ContainerSpec,
    set: SharedSet,
    cursor: Cursor,
}

impl MemoryStream {
    fn records(&self) -> StoreResult<MutexGuard<'_, RecordSet>> {
        self.set.lock().map_err(poisoned)
    }
}

impl KeyedStream for MemoryStream {
    fn spec(&self) -> ContainerSpec {
        self.spec
    }

    fn locate(&mut self, key: &[u8], mode: EqualityMode) -> StoreResult<bool> {
        let set = self.set.lock().map_err(poisoned)?;
        Ok(self.cursor.locate(&set, key, mode))
    }

    fn read_next(&mut self) -> StoreResult<Option<Vec<u8>>> {
        let set = self.set.lock().map_err(poisoned)?;
        Ok(self.cursor.next(&set))
    }

    fn write(&mut self, record: &[u8]) -> StoreResult<usize> {
        let mut set = self.records()?;
        set.check_insert(record)?;
        set.put(record.to_vec());
        Ok(record.len())
    }

    fn update(&mut self, record: &[u8]) -> StoreResult<()> {
        let current = self.cursor.current().ok_or(StoreError::NoCurrentRecord)?;
        let mut set = self.set.lock().map_err(poisoned)?;
        set.check_replace(current, record)?;
        set.put(record.to_vec());
        Ok(())
    }

    fn delete_current(&mut self) -> StoreResult<()> {
        let current = self
            .cursor
            .current()
            .ok_or(StoreError::NoCurrentRecord)?
            .to_vec();
        let mut set = self.set.lock().map_err(poisoned)?;
        if !set.erase(&current) {
            return Err(StoreError::NoCurrentRecord);
        }
        self.cursor.clear_current();
        Ok(())
    }

    fn close(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
