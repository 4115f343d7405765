//! File name validation
//!
//! Validates names for files in the flat upload directory. The directory has
//! no subdirectories, so path separators are rejected outright; this is the
//! first line of defense against traversal, backed by the server-side
//! containment check.

/// Maximum length for file names in bytes
pub const MAX_FILE_NAME_LENGTH: usize = 255;

/// Suffix reserved for in-flight upload temp files
///
/// Names ending in this suffix are rejected at validation so a stored file
/// can never share a name with a temp file, which would let a later upload
/// truncate and rename it away.
pub const PARTIAL_UPLOAD_SUFFIX: &str = ".part";

/// Validation error for file names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileNameError {
    /// Name is empty
    Empty,
    /// Name exceeds maximum length
    TooLong,
    /// Name contains path separators (/ or \)
    ContainsPathSeparator,
    /// Name is a parent directory reference (..)
    ContainsParentRef,
    /// Name contains null bytes
    ContainsNull,
    /// Name contains control characters
    InvalidCharacters,
    /// Name ends in the reserved partial-upload suffix
    ReservedSuffix,
}

impl std::fmt::Display for FileNameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Self::Empty => "file name is empty",
            Self::TooLong => "file name is too long",
            Self::ContainsPathSeparator => "file name contains path separators",
            Self::ContainsParentRef => "file name is a parent directory reference",
            Self::ContainsNull => "file name contains null bytes",
            Self::InvalidCharacters => "file name contains control characters",
            Self::ReservedSuffix => "file name uses a reserved suffix",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for FileNameError {}

/// Validate a client-supplied file name
///
/// Checks:
/// - Not empty
/// - Does not exceed maximum length (255 bytes)
/// - No path separators (/ or \)
/// - Not "." or ".." (directory references)
/// - Does not end in the reserved `.part` suffix
/// - No null bytes
/// - No control characters
///
/// Unicode names are allowed; the checks operate on characters, not bytes,
/// so multi-byte names pass through untouched.
///
/// # Errors
///
/// Returns a `FileNameError` variant describing the validation failure.
pub fn validate_file_name(name: &str) -> Result<(), FileNameError> {
    if name.is_empty() {
        return Err(FileNameError::Empty);
    }

    if name.len() > MAX_FILE_NAME_LENGTH {
        return Err(FileNameError::TooLong);
    }

    if name == ".." || name == "." {
        return Err(FileNameError::ContainsParentRef);
    }

    if name.ends_with(PARTIAL_UPLOAD_SUFFIX) {
        return Err(FileNameError::ReservedSuffix);
    }

    for ch in name.chars() {
        if ch == '/' || ch == '\\' {
            return Err(FileNameError::ContainsPathSeparator);
        }

        if ch == '\0' {
            return Err(FileNameError::ContainsNull);
        }

        if ch.is_control() {
            return Err(FileNameError::InvalidCharacters);
        }
    }

    Ok(())
}
