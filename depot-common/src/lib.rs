//! Depot Common Library
//!
//! Shared types and validation for the Depot file-exchange service.

pub mod protocol;
pub mod record;
pub mod time;
pub mod validators;

pub use record::{OperationKind, OperationRecord};

/// Default port for HTTP file operations
pub const DEFAULT_PORT: u16 = 3000;

/// Default port for the WebSocket event stream
pub const DEFAULT_EVENT_PORT: u16 = 3001;

/// Sentinel actor address used when no IPv4 literal can be extracted
/// from a peer address (IPv6-only or malformed peers)
pub const UNKNOWN_IPV4: &str = "Unknown IPv4";
