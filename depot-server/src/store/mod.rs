//! File store for the upload directory
//!
//! The store is the sole mutator of the flat upload directory. Uploads go
//! through conflict resolution and a `.part`-then-rename write so that a
//! partial file is never visible under its final name; the upload lock
//! spans resolution and creation so concurrent uploads of the same desired
//! name always end up as distinct files.

pub mod path;
pub mod resolver;

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio::sync::Mutex;

use depot_common::validators::{PARTIAL_UPLOAD_SUFFIX, validate_file_name};

use crate::constants::{
    DATA_DIR_NAME, ERR_NO_DATA_DIR, ERR_UPLOAD_ROOT_CANONICALIZE, ERR_UPLOAD_ROOT_CREATE,
    UPLOADS_DIR_NAME,
};

/// Error type for store operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Name failed validation or resolved outside the upload directory
    InvalidName,
    /// No stored file with that name exists
    NotFound,
    /// Disk I/O failed
    Io(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "invalid file name"),
            Self::NotFound => write!(f, "file not found"),
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<StoreError> for io::Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidName => io::Error::new(io::ErrorKind::InvalidInput, e.to_string()),
            StoreError::NotFound => io::Error::new(io::ErrorKind::NotFound, e.to_string()),
            StoreError::Io(_) => io::Error::other(e.to_string()),
        }
    }
}

/// A file currently present in the upload directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Final stored name, unique within the directory
    pub name: String,
    /// Size in bytes at the time of observation
    pub size_bytes: u64,
    /// Absolute path under the upload root
    pub path: PathBuf,
}

/// Owns the upload directory
///
/// `root` is absolute and canonical; all name-to-path resolution is checked
/// against it.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    /// Serializes conflict resolution + file creation for this directory
    upload_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store over an existing, canonicalized upload directory
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            upload_lock: Mutex::new(()),
        }
    }

    /// The canonical upload root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write an incoming byte stream to the directory under `desired_name`,
    /// renaming on conflict
    ///
    /// Holds the upload lock from conflict resolution through the final
    /// rename. The stream is written to a `.part` file first; on any write
    /// failure the partial file is removed and `Io` returned, so a failed
    /// upload never leaves a visible result. Stored names can never end in
    /// `.part` (validation reserves the suffix), so the temp path is never
    /// an existing stored file.
    ///
    /// # Errors
    ///
    /// `InvalidName` if the desired name fails validation, `Io` if the
    /// write cannot complete.
    pub async fn save<R>(&self, mut reader: R, desired_name: &str) -> Result<StoredFile, StoreError>
    where
        R: AsyncRead + Unpin,
    {
        validate_file_name(desired_name).map_err(|_| StoreError::InvalidName)?;

        let _guard = self.upload_lock.lock().await;

        let final_name = resolver::resolve_conflict(&self.root, desired_name);
        let target = path::new_file_path(&self.root, &final_name);
        let part = part_path(&target);

        let size_bytes = match write_stream(&part, &mut reader).await {
            Ok(size) => size,
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await;
                return Err(StoreError::Io(e.to_string()));
            }
        };

        if let Err(e) = tokio::fs::rename(&part, &target).await {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(StoreError::Io(e.to_string()));
        }

        Ok(StoredFile {
            name: final_name,
            size_bytes,
            path: target,
        })
    }

    /// Snapshot of the files currently stored
    ///
    /// In-flight `.part` files are never listed. Entries may appear or
    /// disappear concurrently; ones that vanish mid-listing are skipped.
    ///
    /// # Errors
    ///
    /// `Io` if the directory itself cannot be read.
    pub async fn list(&self) -> Result<Vec<StoredFile>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.ends_with(PARTIAL_UPLOAD_SUFFIX) {
                continue;
            }
            // The entry can vanish between readdir and stat; skip it then
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            files.push(StoredFile {
                path: self.root.join(&name),
                size_bytes: metadata.len(),
                name,
            });
        }

        Ok(files)
    }

    /// Resolve a stored file name to its on-disk path
    ///
    /// # Errors
    ///
    /// `InvalidName` for traversal attempts, `NotFound` if absent.
    pub fn resolve_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        path::resolve_existing(&self.root, name)
    }

    /// Remove a single stored file
    ///
    /// # Errors
    ///
    /// `InvalidName` for traversal attempts; `NotFound` if the file is
    /// absent at call time, including when a concurrent delete got there
    /// first.
    pub async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let target = self.resolve_path(name)?;
        tokio::fs::remove_file(&target).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound
            } else {
                StoreError::Io(e.to_string())
            }
        })
    }

    /// Remove every currently stored file, returning the count removed
    ///
    /// `Ok(0)` is the distinguished "nothing to delete" result, not an
    /// error. In-flight `.part` files are left alone.
    ///
    /// # Errors
    ///
    /// `Io` if the directory cannot be read or a removal fails for a
    /// reason other than the file already being gone.
    pub async fn delete_all(&self) -> Result<usize, StoreError> {
        let files = self.list().await?;
        let mut removed = 0;

        for file in files {
            match tokio::fs::remove_file(&file.path).await {
                Ok(()) => removed += 1,
                // Lost a race with a concurrent delete; not an error
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::Io(e.to_string())),
            }
        }

        Ok(removed)
    }
}

/// The `.part` path for an upload target
fn part_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(PARTIAL_UPLOAD_SUFFIX);
    PathBuf::from(name)
}

/// Stream `reader` into a freshly created file, returning the byte count
async fn write_stream<R>(part: &Path, reader: &mut R) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut file = tokio::fs::File::create(part).await?;
    let size = tokio::io::copy(reader, &mut file).await?;
    file.flush().await?;
    Ok(size)
}

/// Get the default upload root for the platform
///
/// - **Linux**: `~/.local/share/depotd/uploads/`
/// - **macOS**: `~/Library/Application Support/depotd/uploads/`
/// - **Windows**: `%APPDATA%\depotd\uploads\`
///
/// # Errors
///
/// Returns an error if the platform's data directory cannot be determined.
pub fn default_upload_root() -> Result<PathBuf, String> {
    let data_dir = dirs::data_dir().ok_or_else(|| ERR_NO_DATA_DIR.to_string())?;
    Ok(data_dir.join(DATA_DIR_NAME).join(UPLOADS_DIR_NAME))
}

/// Create the upload directory if needed and return its canonical path
///
/// Canonicalization matters for security: containment checks in
/// `resolve_path` compare against this path.
///
/// # Errors
///
/// Returns an error if creation or canonicalization fails.
pub fn init_upload_root(root: &Path) -> Result<PathBuf, String> {
    std::fs::create_dir_all(root)
        .map_err(|e| format!("{}{}: {}", ERR_UPLOAD_ROOT_CREATE, root.display(), e))?;
    root.canonicalize()
        .map_err(|e| format!("{}{}", ERR_UPLOAD_ROOT_CANONICALIZE, e))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    async fn setup_store() -> (TempDir, FileStore) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        (temp_dir, FileStore::new(root))
    }

    // =========================================================================
    // save tests
    // =========================================================================

    #[tokio::test]
    async fn test_save_stores_bytes_under_name() {
        let (_temp, store) = setup_store().await;

        let stored = store.save(&b"hello"[..], "hello.txt").await.unwrap();
        assert_eq!(stored.name, "hello.txt");
        assert_eq!(stored.size_bytes, 5);
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_save_resolves_conflicts() {
        let (_temp, store) = setup_store().await;

        let first = store.save(&b"one"[..], "a.txt").await.unwrap();
        let second = store.save(&b"two"[..], "a.txt").await.unwrap();

        assert_eq!(first.name, "a.txt");
        assert_eq!(second.name, "a(1).txt");
        assert_eq!(std::fs::read(&first.path).unwrap(), b"one");
        assert_eq!(std::fs::read(&second.path).unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_name() {
        let (_temp, store) = setup_store().await;

        let result = store.save(&b"x"[..], "../escape.txt").await;
        assert_eq!(result, Err(StoreError::InvalidName));

        let result = store.save(&b"x"[..], "").await;
        assert_eq!(result, Err(StoreError::InvalidName));
    }

    #[tokio::test]
    async fn test_save_rejects_reserved_suffix_name() {
        let (_temp, store) = setup_store().await;

        // A stored name ending in .part would collide with upload temp
        // paths: a later save of the base name would truncate it and
        // rename it away
        let result = store.save(&b"precious"[..], "notes.txt.part").await;
        assert_eq!(result, Err(StoreError::InvalidName));

        let stored = store.save(&b"other"[..], "notes.txt").await.unwrap();
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"other");

        let files = store.list().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "notes.txt");
    }

    #[tokio::test]
    async fn test_save_leaves_no_part_file() {
        let (_temp, store) = setup_store().await;

        store.save(&b"data"[..], "f.bin").await.unwrap();
        assert!(!store.root().join("f.bin.part").exists());
    }

    #[tokio::test]
    async fn test_concurrent_saves_same_name_get_distinct_files() {
        let (_temp, store) = setup_store().await;
        let store = std::sync::Arc::new(store);

        let mut handles = Vec::new();
        for i in 0..8u8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let content = vec![i; 16];
                store.save(&content[..], "a.txt").await.unwrap()
            }));
        }

        let mut names = std::collections::HashSet::new();
        for handle in handles {
            let stored = handle.await.unwrap();
            // Each writer's content survived intact under its own name
            assert_eq!(std::fs::read(&stored.path).unwrap().len(), 16);
            assert!(names.insert(stored.name));
        }
        assert_eq!(names.len(), 8);
        assert_eq!(store.list().await.unwrap().len(), 8);
    }

    // =========================================================================
    // list tests
    // =========================================================================

    #[tokio::test]
    async fn test_list_empty_directory() {
        let (_temp, store) = setup_store().await;
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_skips_part_files_and_directories() {
        let (_temp, store) = setup_store().await;

        store.save(&b"x"[..], "real.txt").await.unwrap();
        std::fs::write(store.root().join("ghost.bin.part"), b"partial").unwrap();
        std::fs::create_dir(store.root().join("subdir")).unwrap();

        let files = store.list().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "real.txt");
    }

    // =========================================================================
    // delete tests
    // =========================================================================

    #[tokio::test]
    async fn test_delete_removes_file() {
        let (_temp, store) = setup_store().await;

        store.save(&b"x"[..], "gone.txt").await.unwrap();
        store.delete("gone.txt").await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let (_temp, store) = setup_store().await;

        assert_eq!(store.delete("missing.txt").await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_rejects_traversal() {
        let (_temp, store) = setup_store().await;

        assert_eq!(
            store.delete("../outside.txt").await,
            Err(StoreError::InvalidName)
        );
    }

    #[tokio::test]
    async fn test_delete_all_returns_count() {
        let (_temp, store) = setup_store().await;

        store.save(&b"1"[..], "a.txt").await.unwrap();
        store.save(&b"2"[..], "b.txt").await.unwrap();
        store.save(&b"3"[..], "c.txt").await.unwrap();

        assert_eq!(store.delete_all().await.unwrap(), 3);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_all_twice_is_benign() {
        let (_temp, store) = setup_store().await;

        store.save(&b"1"[..], "a.txt").await.unwrap();
        assert_eq!(store.delete_all().await.unwrap(), 1);
        assert_eq!(store.delete_all().await.unwrap(), 0);
    }

    // =========================================================================
    // init tests
    // =========================================================================

    #[test]
    fn test_init_upload_root_creates_and_canonicalizes() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("uploads");

        let canonical = init_upload_root(&root).unwrap();
        assert!(canonical.is_absolute());
        assert!(canonical.exists());

        // Idempotent
        assert_eq!(init_upload_root(&root).unwrap(), canonical);
    }
}
