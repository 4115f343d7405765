//! HTTP parsing and response-building utilities

/// Find the end of HTTP headers (position after \r\n\r\n or \n\n)
pub fn find_header_end(data: &[u8]) -> Option<usize> {
    // Look for \r\n\r\n
    for i in 0..data.len().saturating_sub(3) {
        if &data[i..i + 4] == b"\r\n\r\n" {
            return Some(i + 4);
        }
    }
    // Look for \n\n (curl sometimes uses this)
    for i in 0..data.len().saturating_sub(1) {
        if &data[i..i + 2] == b"\n\n" {
            return Some(i + 2);
        }
    }
    None
}

/// Parse Content-Length from HTTP headers
pub fn parse_content_length(headers: &str) -> usize {
    header_value(headers, "content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0)
}

/// Get a header value by case-insensitive name
pub fn header_value<'a>(headers: &'a str, name: &str) -> Option<&'a str> {
    for line in headers.lines() {
        if let Some((key, value)) = line.split_once(':')
            && key.trim().eq_ignore_ascii_case(name)
        {
            return Some(value.trim());
        }
    }
    None
}

/// Extract the multipart boundary from a Content-Type header value
pub fn multipart_boundary(content_type: &str) -> Option<&str> {
    if !content_type
        .to_ascii_lowercase()
        .starts_with("multipart/form-data")
    {
        return None;
    }

    for param in content_type.split(';') {
        if let Some((key, value)) = param.split_once('=')
            && key.trim().eq_ignore_ascii_case("boundary")
        {
            return Some(value.trim().trim_matches('"'));
        }
    }
    None
}

/// Percent-decode a path segment, interpreting the decoded bytes as UTF-8
///
/// Multi-byte file names arrive percent-encoded in request targets; they
/// must be decoded before conflict resolution and lookup so the stored
/// name is the real text, not its escaped form. Returns `None` for
/// malformed escapes or bytes that are not valid UTF-8.
pub fn percent_decode(segment: &str) -> Option<String> {
    let bytes = segment.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 3 > bytes.len() {
                return None;
            }
            let hex = segment.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(decoded).ok()
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Build a complete plain-text HTTP response
pub fn http_response(status: u16, body: &str) -> String {
    format!(
        concat!(
            "HTTP/1.1 {} {}\r\n",
            "Content-Type: text/plain; charset=utf-8\r\n",
            "Content-Length: {}\r\n",
            "Connection: close\r\n",
            "\r\n",
            "{}"
        ),
        status,
        status_text(status),
        body.len(),
        body
    )
}

/// Build a complete JSON HTTP response
pub fn http_json_response(status: u16, body: &str) -> String {
    format!(
        concat!(
            "HTTP/1.1 {} {}\r\n",
            "Content-Type: application/json; charset=utf-8\r\n",
            "Content-Length: {}\r\n",
            "Connection: close\r\n",
            "\r\n",
            "{}"
        ),
        status,
        status_text(status),
        body.len(),
        body
    )
}

/// Build the header block for a file download response
///
/// The file name goes in an RFC 5987 `filename*` parameter so non-ASCII
/// names survive the header's ASCII-only rules.
pub fn http_file_header(content_length: u64, file_name: &str) -> String {
    format!(
        concat!(
            "HTTP/1.1 200 OK\r\n",
            "Content-Type: application/octet-stream\r\n",
            "Content-Length: {}\r\n",
            "Content-Disposition: attachment; filename*=UTF-8''{}\r\n",
            "Connection: close\r\n",
            "\r\n"
        ),
        content_length,
        percent_encode(file_name)
    )
}

/// Percent-encode a file name for use in a header parameter
fn percent_encode(name: &str) -> String {
    let mut encoded = String::with_capacity(name.len());
    for b in name.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(b as char);
            }
            _ => {
                encoded.push('%');
                encoded.push_str(&format!("{:02X}", b));
            }
        }
    }
    encoded
}
