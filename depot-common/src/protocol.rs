//! Wire types for the HTTP surface
//!
//! All JSON responses are UTF-8 encoded.

use serde::{Deserialize, Serialize};

/// One entry in the `GET /files` listing
///
/// `url` is the retrieval locator for the stored file, always of the form
/// `/download/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub url: String,
}

impl FileEntry {
    /// Build a listing entry for a stored file name
    #[must_use]
    pub fn for_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: format!("/download/{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_name() {
        let entry = FileEntry::for_name("hello.txt");
        assert_eq!(entry.name, "hello.txt");
        assert_eq!(entry.url, "/download/hello.txt");
    }

    #[test]
    fn test_serialize_shape() {
        let entry = FileEntry::for_name("数据.bin");
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"name":"数据.bin","url":"/download/数据.bin"}"#);
    }
}
