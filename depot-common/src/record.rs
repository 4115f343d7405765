//! Operation records
//!
//! An `OperationRecord` is an immutable fact describing one completed
//! state-changing action. Records are appended to the audit log and
//! broadcast to connected observers; they are never modified after creation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::now_stamp;

/// The kind of completed operation a record describes
///
/// The string forms are used in serialized records and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// A file was stored in the upload directory
    Uploaded,
    /// A stored file was streamed to a client
    Downloaded,
    /// A single stored file was removed
    Deleted,
    /// Every stored file was removed
    DeletedAll,
    /// An observer connected to the event stream
    Connected,
    /// An observer disconnected from the event stream
    Disconnected,
}

impl OperationKind {
    /// Convert to the string representation used in serialized records
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Downloaded => "downloaded",
            Self::Deleted => "deleted",
            Self::DeletedAll => "deleted_all",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }

    /// Parse from the string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "uploaded" => Some(Self::Uploaded),
            "downloaded" => Some(Self::Downloaded),
            "deleted" => Some(Self::Deleted),
            "deleted_all" => Some(Self::DeletedAll),
            "connected" => Some(Self::Connected),
            "disconnected" => Some(Self::Disconnected),
            _ => None,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable record of one completed operation
///
/// Created at the moment an operation completes successfully. The timestamp
/// is captured at construction and fixed for the record's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// What happened
    pub kind: OperationKind,
    /// Client network address (IPv4 literal, or the unknown sentinel)
    pub actor_address: String,
    /// The file the operation acted on.
    ///
    /// `None` for connected/disconnected/deleted-all records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Local wall-clock time the operation completed
    pub timestamp: String,
}

impl OperationRecord {
    /// Create a record for an operation that just completed
    #[must_use]
    pub fn new(kind: OperationKind, actor_address: &str, file_name: Option<&str>) -> Self {
        Self {
            kind,
            actor_address: actor_address.to_string(),
            file_name: file_name.map(str::to_string),
            timestamp: now_stamp(),
        }
    }
}
