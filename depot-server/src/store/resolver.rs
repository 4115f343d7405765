//! Filename conflict resolution
//!
//! When an uploaded name already exists in the directory, a counter suffix
//! is inserted between the base name and the extension: `report.pdf`
//! becomes `report(1).pdf`, then `report(2).pdf`, and so on. The first
//! unused candidate wins.
//!
//! Resolution is check-then-use and therefore racy on its own; `FileStore`
//! holds the upload lock across resolve + create so that two concurrent
//! uploads of the same name cannot both claim the same candidate.

use std::path::Path;

/// Split a file name into base and extension
///
/// The extension is the substring from the last `.` inclusive. A name whose
/// only `.` is the leading character (e.g. `.bashrc`) is treated as all
/// base with an empty extension, as is a name with no `.` at all.
#[must_use]
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Resolve a file name to one that does not exist in `directory`
///
/// Returns the desired name unchanged if it is unused; otherwise probes
/// `base(1)ext`, `base(2)ext`, … and returns the first unused candidate.
/// Only performs existence checks; never creates anything.
#[must_use]
pub fn resolve_conflict(directory: &Path, desired: &str) -> String {
    if !directory.join(desired).exists() {
        return desired.to_string();
    }

    let (base, ext) = split_name(desired);
    let mut counter = 1u32;
    loop {
        let candidate = format!("{}({}){}", base, counter, ext);
        if !directory.join(&candidate).exists() {
            return candidate;
        }
        counter += 1;
    }
}
