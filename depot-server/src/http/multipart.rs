//! Minimal multipart/form-data parsing for file uploads
//!
//! Operates on a fully buffered request body. Only the first part whose
//! field name is `file` matters; every other part is skipped.

use std::fmt;

/// Form field name the upload endpoint expects
pub const FILE_FIELD: &str = "file";

/// A file part extracted from a multipart body
#[derive(Debug)]
pub struct FilePart<'a> {
    pub file_name: String,
    pub data: &'a [u8],
}

#[derive(Debug, PartialEq)]
pub enum MultipartError {
    /// The body does not follow the multipart framing rules
    Malformed,
    /// No part with the expected field name carries a file
    NoFilePart,
    /// The submitted file name is not valid UTF-8
    InvalidFileName,
}

impl fmt::Display for MultipartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MultipartError::Malformed => write!(f, "malformed multipart body"),
            MultipartError::NoFilePart => write!(f, "no file part in multipart body"),
            MultipartError::InvalidFileName => write!(f, "file name is not valid UTF-8"),
        }
    }
}

impl std::error::Error for MultipartError {}

/// Extract the uploaded file from a multipart body
///
/// File names are transmitted as raw bytes inside the part headers;
/// they are decoded as UTF-8 here rather than latin-1-mangled the way
/// some frameworks leave them.
pub fn extract_file_part<'a>(
    body: &'a [u8],
    boundary: &str,
) -> Result<FilePart<'a>, MultipartError> {
    let delimiter = format!("--{boundary}").into_bytes();
    let mut pos = find_subslice(body, &delimiter).ok_or(MultipartError::Malformed)?;

    loop {
        let mut cursor = pos + delimiter.len();

        // A trailing "--" after the delimiter closes the body
        if body[cursor..].starts_with(b"--") {
            return Err(MultipartError::NoFilePart);
        }
        if !body[cursor..].starts_with(b"\r\n") {
            return Err(MultipartError::Malformed);
        }
        cursor += 2;

        let header_len =
            find_subslice(&body[cursor..], b"\r\n\r\n").ok_or(MultipartError::Malformed)?;
        let headers = &body[cursor..cursor + header_len];
        let data_start = cursor + header_len + 4;

        let closer = [b"\r\n", delimiter.as_slice()].concat();
        let data_len =
            find_subslice(&body[data_start..], &closer).ok_or(MultipartError::Malformed)?;
        let data = &body[data_start..data_start + data_len];

        if let Some(disposition) = disposition_line(headers)
            && param_value(disposition, "name") == Some(FILE_FIELD.as_bytes())
        {
            let raw_name =
                param_value(disposition, "filename").ok_or(MultipartError::NoFilePart)?;
            let file_name = std::str::from_utf8(raw_name)
                .map_err(|_| MultipartError::InvalidFileName)?
                .to_string();
            return Ok(FilePart { file_name, data });
        }

        pos = data_start + data_len + 2;
    }
}

/// Find the Content-Disposition header line within a part's headers
fn disposition_line(headers: &[u8]) -> Option<&[u8]> {
    for line in headers.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.len() >= 20 && line[..20].eq_ignore_ascii_case(b"content-disposition:") {
            return Some(line);
        }
    }
    None
}

/// Extract a quoted parameter value from a header line, as raw bytes
///
/// Matches `param="value"` where `param` is not the tail of a longer
/// token (so looking up `name` does not match `filename`).
fn param_value<'a>(line: &'a [u8], param: &str) -> Option<&'a [u8]> {
    let needle = format!("{param}=\"").into_bytes();
    let mut i = 0;

    while let Some(rel) = find_subslice(&line[i..], &needle) {
        let at = i + rel;
        if at == 0 || !line[at - 1].is_ascii_alphanumeric() {
            let start = at + needle.len();
            let len = line[start..].iter().position(|&b| b == b'"')?;
            return Some(&line[start..start + len]);
        }
        i = at + needle.len();
    }
    None
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
