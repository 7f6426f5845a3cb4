//! Byte store abstractions for cache persistence.
//!
//! The metadata cache never touches the filesystem directly. It receives a
//! [`ByteStore`] at construction, so tests can substitute
//! [`MemoryByteStore`] for the real [`FsByteStore`].

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Abstraction over a text file store.
///
/// Implementations are used from a single thread and need not be `Sync`.
pub trait ByteStore {
    /// Returns `true` if a file exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Reads the whole file at `path` as UTF-8.
    fn read_text(&self, path: &Path) -> io::Result<String>;

    /// Writes `contents` to `path`, replacing any existing file.
    fn write_text(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Creates `path` and any missing parents.
    fn ensure_dir(&self, path: &Path) -> io::Result<()>;
}

impl<B: ByteStore + ?Sized> ByteStore for &B {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn read_text(&self, path: &Path) -> io::Result<String> {
        (**self).read_text(path)
    }

    fn write_text(&self, path: &Path, contents: &str) -> io::Result<()> {
        (**self).write_text(path, contents)
    }

    fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        (**self).ensure_dir(path)
    }
}

impl<B: ByteStore + ?Sized> ByteStore for Rc<B> {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn read_text(&self, path: &Path) -> io::Result<String> {
        (**self).read_text(path)
    }

    fn write_text(&self, path: &Path, contents: &str) -> io::Result<()> {
        (**self).write_text(path, contents)
    }

    fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        (**self).ensure_dir(path)
    }
}

// === Real implementation ===

/// Filesystem store. Relative paths resolve against `root`.
#[derive(Debug, Clone)]
pub struct FsByteStore {
    root: PathBuf,
}

impl FsByteStore {
    /// Creates a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsByteStore { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl ByteStore for FsByteStore {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }

    fn read_text(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(self.resolve(path))
    }

    fn write_text(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(self.resolve(path), contents)
    }

    fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(self.resolve(path))
    }
}

// === Mock implementation for testing ===

/// In-memory store for tests.
///
/// Counts reads and writes and can be told to fail writes, which lets tests
/// observe whether a cache was served from the store or rebuilt.
#[derive(Debug, Default)]
pub struct MemoryByteStore {
    files: RefCell<BTreeMap<PathBuf, String>>,
    dirs: RefCell<BTreeSet<PathBuf>>,
    reads: Cell<usize>,
    writes: Cell<usize>,
    fail_writes: bool,
}

impl MemoryByteStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects every write.
    pub fn failing_writes() -> Self {
        MemoryByteStore {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Adds a file.
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.borrow_mut().insert(path.into(), contents.into());
        self
    }

    /// Returns the contents of a file, if present.
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }

    /// Removes a file. Returns `true` if it existed.
    pub fn remove(&self, path: &Path) -> bool {
        self.files.borrow_mut().remove(path).is_some()
    }

    /// Returns `true` if `ensure_dir` created `path`.
    pub fn has_dir(&self, path: &Path) -> bool {
        self.dirs.borrow().contains(path)
    }

    /// Number of successful reads so far.
    pub fn read_count(&self) -> usize {
        self.reads.get()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl ByteStore for MemoryByteStore {
    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn read_text(&self, path: &Path) -> io::Result<String> {
        let contents = self.files.borrow().get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, path.display().to_string())
        })?;
        self.reads.set(self.reads.get() + 1);
        Ok(contents)
    }

    fn write_text(&self, path: &Path, contents: &str) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "writes disabled",
            ));
        }
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        self.dirs.borrow_mut().insert(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryByteStore::new();
        let path = Path::new("cache/v1/meta.json");
        assert!(!store.exists(path));
        assert!(store.read_text(path).is_err());

        store.write_text(path, "[]").unwrap();
        assert!(store.exists(path));
        assert_eq!(store.read_text(path).unwrap(), "[]");
        assert_eq!(store.read_count(), 1);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn memory_store_failing_writes() {
        let store = MemoryByteStore::failing_writes();
        let err = store.write_text(Path::new("x"), "y").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(!store.exists(Path::new("x")));
    }

    #[test]
    fn memory_store_tracks_dirs() {
        let store = MemoryByteStore::new();
        store.ensure_dir(Path::new("cache/v1")).unwrap();
        assert!(store.has_dir(Path::new("cache/v1")));
    }

    #[test]
    fn reference_forwards() {
        fn read_via<B: ByteStore>(store: B) -> String {
            store.read_text(Path::new("a")).unwrap()
        }

        let store = MemoryByteStore::new().with_file("a", "b");
        assert_eq!(read_via(&store), "b");
        assert_eq!(read_via(Rc::new(store)), "b");
    }

    #[test]
    fn fs_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsByteStore::new(dir.path());
        let sub = Path::new("cache").join("v1");
        store.ensure_dir(&sub).unwrap();

        let file = sub.join("meta.json");
        assert!(!store.exists(&file));
        store.write_text(&file, "[1]").unwrap();
        assert!(store.exists(&file));
        assert_eq!(store.read_text(&file).unwrap(), "[1]");
        assert!(dir.path().join("cache/v1/meta.json").is_file());
    }
}
