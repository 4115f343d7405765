//! Append-only audit log
//!
//! Every completed operation is written as one human-readable line,
//! `[YYYY-MM-DD HH:mm:ss] LEVEL: message`, to a durable log file that is
//! never truncated during the process lifetime, and mirrored to stderr.
//!
//! Appends from concurrent requests are serialized by a lock scoped around
//! the format + write, so lines never interleave. A failed file write is
//! reported on the stderr mirror and otherwise ignored: logging is
//! best-effort and never fails the operation that triggered it.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use depot_common::OperationRecord;
use depot_common::record::OperationKind;
use depot_common::time::now_stamp;

use crate::constants::{AUDIT_LOG_FILE_NAME, DATA_DIR_NAME, ERR_AUDIT_WRITE, ERR_NO_DATA_DIR};

/// Process-wide audit log
#[derive(Debug)]
pub struct AuditLog {
    file: Mutex<File>,
    path: PathBuf,
}

impl AuditLog {
    /// Open (or create) the log file in append mode
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened for appending.
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
            path: path.to_path_buf(),
        })
    }

    /// Path of the durable log file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one info-level line describing a completed operation
    pub fn append(&self, record: &OperationRecord) {
        self.info(&describe(record));
    }

    /// Append one info-level line
    pub fn info(&self, message: &str) {
        self.write_line("INFO", message);
    }

    /// Append one error-level line
    pub fn error(&self, message: &str) {
        self.write_line("ERROR", message);
    }

    fn write_line(&self, level: &str, message: &str) {
        let line = format!("[{}] {}: {}", now_stamp(), level, message);

        // Mirror to stderr first so a disk failure still leaves a trace
        eprintln!("{}", line);

        let mut file = self.file.lock().expect("audit log lock poisoned");
        if let Err(e) = writeln!(file, "{}", line) {
            eprintln!("{}{}", ERR_AUDIT_WRITE, e);
        }
    }
}

/// English log-line text for an operation record
///
/// The observer-facing event stream carries localized text instead; the
/// durable log stays in one language so it can be grepped.
#[must_use]
pub fn describe(record: &OperationRecord) -> String {
    let name = record.file_name.as_deref().unwrap_or_default();
    match record.kind {
        OperationKind::Uploaded => format!(
            "File {} uploaded by {} at {}",
            name, record.actor_address, record.timestamp
        ),
        OperationKind::Downloaded => format!(
            "File {} downloaded by {} at {}",
            name, record.actor_address, record.timestamp
        ),
        OperationKind::Deleted => format!(
            "File {} deleted by {} at {}",
            name, record.actor_address, record.timestamp
        ),
        OperationKind::DeletedAll => format!(
            "All files deleted by {} at {}",
            record.actor_address, record.timestamp
        ),
        OperationKind::Connected => format!(
            "{} connected to the log stream at {}",
            record.actor_address, record.timestamp
        ),
        OperationKind::Disconnected => format!(
            "{} disconnected from the log stream at {}",
            record.actor_address, record.timestamp
        ),
    }
}

/// Get the default audit log path for the platform
///
/// # Errors
///
/// Returns an error if the platform's data directory cannot be determined.
pub fn default_log_path() -> Result<PathBuf, String> {
    let data_dir = dirs::data_dir().ok_or_else(|| ERR_NO_DATA_DIR.to_string())?;
    Ok(data_dir.join(DATA_DIR_NAME).join(AUDIT_LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;

    fn setup_log() -> (TempDir, AuditLog) {
        let temp_dir = TempDir::new().unwrap();
        let log = AuditLog::open(&temp_dir.path().join("audit.log")).unwrap();
        (temp_dir, log)
    }

    fn read_lines(log: &AuditLog) -> Vec<String> {
        std::fs::read_to_string(log.path())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_line_format() {
        let (_temp, log) = setup_log();

        log.info("hello");
        let lines = read_lines(&log);
        assert_eq!(lines.len(), 1);
        // [YYYY-MM-DD HH:mm:ss] INFO: hello
        assert!(lines[0].starts_with('['));
        assert_eq!(&lines[0][20..], "] INFO: hello");
    }

    #[test]
    fn test_append_operation_record() {
        let (_temp, log) = setup_log();

        let record =
            OperationRecord::new(OperationKind::Uploaded, "203.0.113.5", Some("hello.txt"));
        log.append(&record);

        let lines = read_lines(&log);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("hello.txt"));
        assert!(lines[0].contains("203.0.113.5"));
    }

    #[test]
    fn test_appends_accumulate() {
        let (_temp, log) = setup_log();

        log.info("one");
        log.error("two");
        log.info("three");

        let lines = read_lines(&log);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("ERROR: two"));
    }

    #[test]
    fn test_reopen_appends_rather_than_truncates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("audit.log");

        AuditLog::open(&path).unwrap().info("first");
        AuditLog::open(&path).unwrap().info("second");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("first"));
        assert!(content.contains("second"));
    }

    #[test]
    fn test_concurrent_appends_never_interleave() {
        let (_temp, log) = setup_log();
        let log = Arc::new(log);

        let mut handles = Vec::new();
        for t in 0..8 {
            let log = log.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    log.info(&format!("thread-{} line-{}", t, i));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let lines = read_lines(&log);
        assert_eq!(lines.len(), 8 * 50);
        for line in lines {
            // Every line is intact: timestamp prefix, level, full message
            assert_eq!(&line[0..1], "[");
            assert!(line.contains(" INFO: thread-"));
            assert!(line.contains(" line-"));
        }
    }
}
