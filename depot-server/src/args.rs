//! Command-line argument parsing

use clap::Parser;
use depot_common::{DEFAULT_EVENT_PORT, DEFAULT_PORT};
use std::net::IpAddr;
use std::path::PathBuf;

/// Get default upload root help text for current platform
fn default_upload_root_help() -> String {
    #[cfg(target_os = "linux")]
    return "Upload directory (default: ~/.local/share/depotd/uploads/)".to_string();

    #[cfg(target_os = "macos")]
    return "Upload directory (default: ~/Library/Application Support/depotd/uploads/)"
        .to_string();

    #[cfg(target_os = "windows")]
    return "Upload directory (default: %APPDATA%\\depotd\\uploads\\)".to_string();

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    return "Upload directory (overrides platform default)".to_string();
}

/// Get default audit log help text for current platform
fn default_log_file_help() -> String {
    #[cfg(target_os = "linux")]
    return "Audit log file (default: ~/.local/share/depotd/file-transfer.log)".to_string();

    #[cfg(target_os = "macos")]
    return "Audit log file (default: ~/Library/Application Support/depotd/file-transfer.log)"
        .to_string();

    #[cfg(target_os = "windows")]
    return "Audit log file (default: %APPDATA%\\depotd\\file-transfer.log)".to_string();

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    return "Audit log file (overrides platform default)".to_string();
}

/// Depot file-exchange server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// IP address to bind to (IPv4 or IPv6)
    #[arg(short, long, default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port for HTTP file operations
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Port for the WebSocket event stream
    #[arg(short, long, default_value_t = DEFAULT_EVENT_PORT)]
    pub event_port: u16,

    /// Upload directory (overrides platform default)
    #[arg(short, long, help = default_upload_root_help())]
    pub upload_root: Option<PathBuf>,

    /// Audit log file (overrides platform default)
    #[arg(short, long, help = default_log_file_help())]
    pub log_file: Option<PathBuf>,

    /// Locale for observer-facing event messages
    #[arg(long, default_value = crate::constants::DEFAULT_LOCALE)]
    pub locale: String,

    /// Enable debug logging (shows per-request diagnostics)
    #[arg(long, default_value = "false")]
    pub debug: bool,
}
