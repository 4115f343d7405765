//! Process log message constants
//!
//! Startup and error messages printed to stdout/stderr. Client-facing and
//! observer-facing strings live in the i18n locale resources instead.

// Startup messages
pub const MSG_BANNER: &str = "Depot file-exchange server v";
pub const MSG_LISTENING: &str = "HTTP listening on ";
pub const MSG_EVENT_LISTENING: &str = "Event stream listening on ";
pub const MSG_UPLOAD_ROOT: &str = "Upload directory: ";
pub const MSG_AUDIT_LOG: &str = "Audit log: ";
pub const MSG_SHUTDOWN_RECEIVED: &str = "Shutdown signal received, stopping";

// Errors
pub const ERR_GENERIC: &str = "Error: ";
pub const ERR_BIND_FAILED: &str = "Failed to bind ";
pub const ERR_ACCEPT: &str = "Failed to accept connection: ";
pub const ERR_CONNECTION: &str = "Connection error from ";
pub const ERR_AUDIT_OPEN: &str = "Failed to open audit log: ";
pub const ERR_AUDIT_WRITE: &str = "Failed to write audit log: ";
pub const ERR_UPLOAD_ROOT_CREATE: &str = "Failed to create upload directory ";
pub const ERR_UPLOAD_ROOT_CANONICALIZE: &str = "Failed to canonicalize upload directory: ";
pub const ERR_NO_DATA_DIR: &str = "Could not determine platform data directory";

// Signal handling
pub const ERR_SIGNAL_SIGTERM: &str = "Failed to install SIGTERM handler";
pub const ERR_SIGNAL_SIGINT: &str = "Failed to install SIGINT handler";
pub const ERR_SIGNAL_CTRLC: &str = "Failed to install Ctrl+C handler";

// Directory and file names under the platform data dir
pub const DATA_DIR_NAME: &str = "depotd";
pub const UPLOADS_DIR_NAME: &str = "uploads";
pub const AUDIT_LOG_FILE_NAME: &str = "file-transfer.log";

/// Default observer-facing locale
pub const DEFAULT_LOCALE: &str = "zh-CN";
