//! Safe path resolution for the upload directory
//!
//! The upload directory is flat: every stored file lives directly under the
//! canonical root. Client-supplied names are funneled through
//! [`resolve_existing`] before any read or delete, which is mandatory —
//! without it download/delete would be an arbitrary-file-access vector.

use std::io;
use std::path::{Path, PathBuf};

use depot_common::validators::validate_file_name;

use super::StoreError;

/// Safely resolve a stored file name within the upload root
///
/// Three layers of defense against directory traversal:
///
/// 1. **Name validation**: rejects separators, `..`, null bytes, and
///    control characters before touching the filesystem
/// 2. **Canonicalization**: resolves symlinks to detect escape attempts
/// 3. **Containment check**: verifies the final path is under the root
///
/// `root` must be an absolute, canonical path (from `fs::canonicalize()`).
///
/// # Errors
///
/// `InvalidName` for names that fail validation or escape the root,
/// `NotFound` if no such file exists.
pub fn resolve_existing(root: &Path, name: &str) -> Result<PathBuf, StoreError> {
    validate_file_name(name).map_err(|_| StoreError::InvalidName)?;

    let candidate = root.join(name);

    let canonical = candidate.canonicalize().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound
        } else {
            StoreError::Io(e.to_string())
        }
    })?;

    // A symlink stored in the directory could still point outside it
    if canonical.parent() != Some(root) {
        return Err(StoreError::InvalidName);
    }

    if !canonical.is_file() {
        return Err(StoreError::NotFound);
    }

    Ok(canonical)
}

/// Build the path where a new file with an already-resolved name will be
/// written
///
/// The name must have passed validation and conflict resolution; this just
/// joins it under the root. The file does not exist yet, so the result is
/// not canonicalized.
#[must_use]
pub fn new_file_path(root: &Path, resolved_name: &str) -> PathBuf {
    root.join(resolved_name)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn setup_root() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir
            .path()
            .canonicalize()
            .expect("Failed to canonicalize");
        fs::write(root.join("readme.txt"), "test").expect("Failed to create file");
        (temp_dir, root)
    }

    #[test]
    fn test_resolve_valid_file() {
        let (_temp, root) = setup_root();

        let result = resolve_existing(&root, "readme.txt");
        assert_eq!(result, Ok(root.join("readme.txt")));
    }

    #[test]
    fn test_resolve_missing_file() {
        let (_temp, root) = setup_root();

        let result = resolve_existing(&root, "missing.txt");
        assert_eq!(result, Err(StoreError::NotFound));
    }

    #[test]
    fn test_reject_parent_traversal() {
        let (_temp, root) = setup_root();

        assert_eq!(
            resolve_existing(&root, "../readme.txt"),
            Err(StoreError::InvalidName)
        );
        assert_eq!(resolve_existing(&root, ".."), Err(StoreError::InvalidName));
    }

    #[test]
    fn test_reject_absolute_path() {
        let (_temp, root) = setup_root();

        assert_eq!(
            resolve_existing(&root, "/etc/passwd"),
            Err(StoreError::InvalidName)
        );
    }

    #[test]
    fn test_reject_nested_path() {
        let (_temp, root) = setup_root();

        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub/inner.txt"), "x").unwrap();

        assert_eq!(
            resolve_existing(&root, "sub/inner.txt"),
            Err(StoreError::InvalidName)
        );
    }

    #[test]
    fn test_directory_is_not_a_stored_file() {
        let (_temp, root) = setup_root();

        fs::create_dir(root.join("subdir")).unwrap();
        assert_eq!(
            resolve_existing(&root, "subdir"),
            Err(StoreError::NotFound)
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let (_temp, root) = setup_root();

        let outside = TempDir::new().unwrap();
        let secret = outside.path().join("secret.txt");
        fs::write(&secret, "secret").unwrap();
        std::os::unix::fs::symlink(&secret, root.join("escape.txt")).unwrap();

        assert_eq!(
            resolve_existing(&root, "escape.txt"),
            Err(StoreError::InvalidName)
        );
    }

    #[test]
    fn test_unicode_name_resolves() {
        let (_temp, root) = setup_root();

        fs::write(root.join("文件.txt"), "x").unwrap();
        assert_eq!(
            resolve_existing(&root, "文件.txt"),
            Ok(root.join("文件.txt"))
        );
    }

    #[test]
    fn test_new_file_path_joins_under_root() {
        let (_temp, root) = setup_root();
        assert_eq!(new_file_path(&root, "a.txt"), root.join("a.txt"));
    }
}
