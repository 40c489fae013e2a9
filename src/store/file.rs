//! File-backed catalog
//!
//! Each container is one file `<root>/<name>.ksds` holding a header and an
//! append-only entry log (see `entry`). Opening a container replays the log
//! into memory; every mutation appends one entry before it becomes visible.
//! Closing compacts the log once superseded entries outnumber live records.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::backend::{Catalog, ContainerSpec, EqualityMode, KeyedStream};
use super::cursor::{Cursor, RecordSet};
use super::entry::{deserialize_header, serialize_header, Entry, HEADER_LEN};
use super::errors::{StoreError, StoreResult};

/// Container file extension
pub const CONTAINER_EXTENSION: &str = "ksds";

const MAX_NAME_LEN: usize = 128;

/// Catalog of containers stored as files under one directory.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    root: PathBuf,
    sync_writes: bool,
}

impl FileCatalog {
    /// Creates a catalog rooted at `root`. With `sync_writes`, every
    /// appended entry is fsynced before the operation completes.
    pub fn new(root: impl Into<PathBuf>, sync_writes: bool) -> Self {
        Self {
            root: root.into(),
            sync_writes,
        }
    }

    /// File path of a container
    pub fn container_path(&self, name: &str) -> StoreResult<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(format!("{}.{}", name, CONTAINER_EXTENSION)))
    }
}

/// Container names: 1..=128 characters from `[A-Za-z0-9._-@#$]`, not
/// starting with a dot.
fn validate_name(name: &str) -> StoreResult<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '@' | '#' | '$'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}

impl Catalog for FileCatalog {
    fn open(&self, name: &str) -> StoreResult<Box<dyn KeyedStream>> {
        let path = self.container_path(name)?;
        let stream = FileStream::open(&path, self.sync_writes).map_err(|e| match e {
            StoreError::Io(io) if io.kind() == io::ErrorKind::NotFound => {
                StoreError::NotFound(name.to_string())
            }
            other => other,
        })?;
        Ok(Box::new(stream))
    }

    fn contains(&self, name: &str) -> bool {
        self.container_path(name)
            .and_then(|path| replay(&path))
            .is_ok()
    }

    fn allocate(&self, name: &str, spec: ContainerSpec) -> StoreResult<()> {
        let path = self.container_path(name)?;
        if !spec.is_valid() {
            return Err(StoreError::InvalidSpec(format!("{:?}", spec)));
        }
        fs::create_dir_all(&self.root)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::AlreadyExists {
                    StoreError::AlreadyExists(name.to_string())
                } else {
                    StoreError::Io(e)
                }
            })?;
        file.write_all(&serialize_header(&spec))?;
        file.sync_all()?;
        Ok(())
    }

    fn remove(&self, name: &str) -> StoreResult<()> {
        let path = self.container_path(name)?;
        fs::remove_file(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound(name.to_string())
            } else {
                StoreError::Io(e)
            }
        })
    }
}

/// Stream over a container file.
#[derive(Debug)]
struct FileStream {
    path: PathBuf,
    file: File,
    set: RecordSet,
    cursor: Cursor,
    /// Entries in the log that no longer describe a live record
    superseded: usize,
    sync_writes: bool,
}

/// Reads a container file and replays its log without modifying it.
///
/// Returns the live records and the number of entries in the log.
fn replay(path: &Path) -> StoreResult<(RecordSet, usize)> {
    let data = fs::read(path)?;
    let spec = deserialize_header(&data)?;

    let mut set = RecordSet::new(spec);
    let mut entries = 0usize;
    let mut offset = HEADER_LEN;
    while offset < data.len() {
        let (entry, used) = Entry::deserialize(&data[offset..], &spec, offset as u64)?;
        match entry {
            Entry::Put(record) => set.put(record),
            Entry::Erase(key) => {
                set.erase(&key);
            }
        }
        entries += 1;
        offset += used;
    }
    Ok((set, entries))
}

impl FileStream {
    fn open(path: &Path, sync_writes: bool) -> StoreResult<Self> {
        let (set, entries) = replay(path)?;
        let file = OpenOptions::new().append(true).open(path)?;
        let superseded = entries.saturating_sub(set.len());

        Ok(Self {
            path: path.to_path_buf(),
            file,
            set,
            cursor: Cursor::default(),
            superseded,
            sync_writes,
        })
    }

    fn append(&mut self, entry: &Entry) -> StoreResult<()> {
        self.file.write_all(&entry.serialize())?;
        if self.sync_writes {
            self.file.sync_data()?;
        }
        Ok(())
    }

    fn needs_compaction(&self) -> bool {
        self.superseded > 0 && self.superseded > self.set.len()
    }

    /// Rewrites the log with one put entry per live record.
    fn compact(&self) -> StoreResult<()> {
        let tmp = self.path.with_extension(format!("{}.tmp", CONTAINER_EXTENSION));
        {
            let mut out = File::create(&tmp)?;
            out.write_all(&serialize_header(&self.set.spec()))?;
            for record in self.set.iter() {
                out.write_all(&Entry::Put(record.clone()).serialize())?;
            }
            out.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyedStream for FileStream {
    fn spec(&self) -> ContainerSpec {
        self.set.spec()
    }

    fn locate(&mut self, key: &[u8], mode: EqualityMode) -> StoreResult<bool> {
        Ok(self.cursor.locate(&self.set, key, mode))
    }

    fn read_next(&mut self) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.cursor.next(&self.set))
    }

    fn write(&mut self, record: &[u8]) -> StoreResult<usize> {
        self.set.check_insert(record)?;
        self.append(&Entry::Put(record.to_vec()))?;
        self.set.put(record.to_vec());
        Ok(record.len())
    }

    fn update(&mut self, record: &[u8]) -> StoreResult<()> {
        let current = self.cursor.current().ok_or(StoreError::NoCurrentRecord)?;
        self.set.check_replace(current, record)?;
        self.append(&Entry::Put(record.to_vec()))?;
        self.set.put(record.to_vec());
        self.superseded += 1;
        Ok(())
    }

    fn delete_current(&mut self) -> StoreResult<()> {
        let current = self
            .cursor
            .current()
            .ok_or(StoreError::NoCurrentRecord)?
            .to_vec();
        self.append(&Entry::Erase(current.clone()))?;
        self.set.erase(&current);
        self.cursor.clear_current();
        // the put that created the record and this erase
        self.superseded += 2;
        Ok(())
    }

    fn close(self: Box<Self>) -> StoreResult<()> {
        if self.needs_compaction() {
            self.compact()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn spec() -> ContainerSpec {
        ContainerSpec {
            record_length: 4,
            key_length: 2,
            key_offset: 0,
        }
    }

    #[test]
    fn test_name_validation() {
        assert!(validate_name("HLQ.TEST.KSDS").is_ok());
        assert!(validate_name("user_data-1").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("../escape").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name(".hidden").is_err());
        assert!(validate_name(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_allocate_creates_header_only_file() {
        let dir = TempDir::new().unwrap();
        let catalog = FileCatalog::new(dir.path(), true);
        catalog.allocate("A", spec()).unwrap();

        let path = catalog.container_path("A").unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), HEADER_LEN as u64);
        assert!(matches!(
            catalog.allocate("A", spec()),
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_open_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let catalog = FileCatalog::new(dir.path(), false);
        assert!(matches!(catalog.open("NOPE"), Err(StoreError::NotFound(_))));
        assert!(matches!(catalog.remove("NOPE"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let catalog = FileCatalog::new(dir.path(), false);
        catalog.allocate("A", spec()).unwrap();

        let mut stream = catalog.open("A").unwrap();
        stream.write(b"k2bb").unwrap();
        stream.write(b"k1aa").unwrap();
        stream.write(b"k3cc").unwrap();
        assert!(stream.locate(b"k3", EqualityMode::Equal).unwrap());
        stream.read_next().unwrap();
        stream.delete_current().unwrap();
        assert!(stream.locate(b"k1", EqualityMode::Equal).unwrap());
        stream.read_next().unwrap();
        stream.update(b"k1zz").unwrap();
        stream.close().unwrap();

        let mut stream = catalog.open("A").unwrap();
        assert_eq!(stream.read_next().unwrap(), Some(b"k1zz".to_vec()));
        assert_eq!(stream.read_next().unwrap(), Some(b"k2bb".to_vec()));
        assert_eq!(stream.read_next().unwrap(), None);
    }

    #[test]
    fn test_close_compacts_superseded_entries() {
        let dir = TempDir::new().unwrap();
        let catalog = FileCatalog::new(dir.path(), false);
        catalog.allocate("A", spec()).unwrap();
        let path = catalog.container_path("A").unwrap();

        let mut stream = catalog.open("A").unwrap();
        stream.write(b"k1aa").unwrap();
        for _ in 0..5 {
            assert!(stream.locate(b"k1", EqualityMode::Equal).unwrap());
            stream.read_next().unwrap();
            stream.update(b"k1bb").unwrap();
        }
        stream.close().unwrap();

        let put_len = Entry::Put(vec![0; 4]).serialize().len() as u64;
        assert_eq!(fs::metadata(&path).unwrap().len(), HEADER_LEN as u64 + put_len);

        let mut stream = catalog.open("A").unwrap();
        assert_eq!(stream.read_next().unwrap(), Some(b"k1bb".to_vec()));
    }

    #[test]
    fn test_corrupt_entry_fails_open() {
        let dir = TempDir::new().unwrap();
        let catalog = FileCatalog::new(dir.path(), false);
        catalog.allocate("A", spec()).unwrap();
        let mut stream = catalog.open("A").unwrap();
        stream.write(b"k1aa").unwrap();
        stream.close().unwrap();

        let path = catalog.container_path("A").unwrap();
        let mut contents = fs::read(&path).unwrap();
        let last = contents.len() - 6;
        contents[last] ^= 0xFF;
        fs::write(&path, contents).unwrap();

        let err = catalog.open("A").unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_contains_leaves_log_untouched() {
        let dir = TempDir::new().unwrap();
        let catalog = FileCatalog::new(dir.path(), false);
        assert!(!catalog.contains("A"));
        assert!(!catalog.contains("../A"));
        catalog.allocate("A", spec()).unwrap();
        let path = catalog.container_path("A").unwrap();

        // Superseded entries left behind as if the writer never closed
        let mut stream = catalog.open("A").unwrap();
        stream.write(b"k1aa").unwrap();
        for _ in 0..3 {
            assert!(stream.locate(b"k1", EqualityMode::Equal).unwrap());
            stream.read_next().unwrap();
            stream.update(b"k1bb").unwrap();
        }
        let uncompacted = fs::read(&path).unwrap();
        stream.close().unwrap();
        fs::write(&path, &uncompacted).unwrap();

        assert!(catalog.contains("A"));
        assert_eq!(fs::read(&path).unwrap(), uncompacted);

        let mut bad = uncompacted.clone();
        let last = bad.len() - 6;
        bad[last] ^= 0xFF;
        fs::write(&path, &bad).unwrap();
        assert!(!catalog.contains("A"));
        assert_eq!(fs::read(&path).unwrap(), bad);
    }

    #[test]
    fn test_remove_deletes_file() {
        let dir = TempDir::new().unwrap();
        let catalog = FileCatalog::new(dir.path(), false);
        catalog.allocate("A", spec()).unwrap();
        catalog.remove("A").unwrap();
        assert!(!catalog.container_path("A").unwrap().exists());
    }
}
