//! Hand-rolled HTTP/1.1 front end
//!
//! Requests are buffered whole (headers plus body, capped) before any
//! routing happens, so a client that disconnects mid-upload never
//! touches the store. Each connection serves one request and closes.

pub mod handlers;
pub mod multipart;
pub mod parse;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::http::handlers::Response;
use crate::i18n::t;
use crate::service::TransferService;

/// Whole-request buffer cap (64 MiB); requests above this are rejected
pub const MAX_REQUEST_SIZE: usize = 64 * 1024 * 1024;

const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Per-connection parameters handed to each spawned handler task
pub struct HttpParams {
    pub peer_addr: SocketAddr,
    pub service: Arc<TransferService>,
    pub locale: String,
    pub debug: bool,
}

/// Serve one HTTP request on an accepted connection
pub async fn handle_connection(mut socket: TcpStream, params: HttpParams) -> io::Result<()> {
    let peer = params.peer_addr.to_string();
    let mut buffer: Vec<u8> = Vec::with_capacity(READ_CHUNK_SIZE);
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    // Read until the header block is complete
    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            // Peer went away before sending a full request
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(end) = parse::find_header_end(&buffer) {
            break end;
        }
        if buffer.len() > MAX_REQUEST_SIZE {
            return write_text(&mut socket, 400, &t(&params.locale, "bad-request")).await;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).into_owned();
    let content_length = parse::parse_content_length(&head);
    let total = header_end + content_length;
    if total > MAX_REQUEST_SIZE {
        return write_text(&mut socket, 400, &t(&params.locale, "bad-request")).await;
    }

    // Read the rest of the body
    while buffer.len() < total {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            // Body cut short: no effect, no response
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..n]);
    }
    let body = &buffer[header_end..total];

    let Some((method, target)) = request_line(&head) else {
        return write_text(&mut socket, 400, &t(&params.locale, "bad-request")).await;
    };

    if params.debug {
        println!("{method} {target} from {peer}");
    }

    let response = route(&params, method, target, &head, body, &peer).await;
    write_response(&mut socket, response, &params, &peer).await
}

/// Dispatch a parsed request to its handler
async fn route(
    params: &HttpParams,
    method: &str,
    target: &str,
    head: &str,
    body: &[u8],
    peer: &str,
) -> Response {
    let service = &params.service;
    let locale = &params.locale;

    match (method, target) {
        ("POST", "/upload") => handlers::handle_upload(service, locale, head, body, peer).await,
        ("GET", "/files") => handlers::handle_list(service, locale).await,
        ("DELETE", "/delete-all") => handlers::handle_delete_all(service, locale, peer).await,
        ("GET", _) if target.starts_with("/download/") => {
            let name = &target["/download/".len()..];
            handlers::handle_download(service, locale, name).await
        }
        ("DELETE", _) if target.starts_with("/delete/") => {
            let name = &target["/delete/".len()..];
            handlers::handle_delete(service, locale, name, peer).await
        }
        _ => Response::Text {
            status: 404,
            body: "Not Found".to_string(),
        },
    }
}

/// Parse the request line into method and target (query string stripped)
fn request_line(head: &str) -> Option<(&str, &str)> {
    let line = head.lines().next()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    let target = target.split('?').next()?;
    Some((method, target))
}

/// Serialize a handler's response onto the socket
async fn write_response(
    socket: &mut TcpStream,
    response: Response,
    params: &HttpParams,
    peer: &str,
) -> io::Result<()> {
    match response {
        Response::Text { status, body } => write_text(socket, status, &body).await,
        Response::Json { status, body } => {
            socket
                .write_all(parse::http_json_response(status, &body).as_bytes())
                .await?;
            socket.flush().await
        }
        Response::File {
            mut file,
            length,
            name,
        } => {
            socket
                .write_all(parse::http_file_header(length, &name).as_bytes())
                .await?;
            tokio::io::copy(&mut file, socket).await?;
            socket.flush().await?;
            // An aborted stream errors out above and never reaches this
            params.service.downloaded(&name, peer).await;
            Ok(())
        }
    }
}

async fn write_text(socket: &mut TcpStream, status: u16, body: &str) -> io::Result<()> {
    socket
        .write_all(parse::http_response(status, body).as_bytes())
        .await?;
    socket.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_line() {
        let head = "GET /files HTTP/1.1\r\nHost: localhost\r\n\r\n";
        assert_eq!(request_line(head), Some(("GET", "/files")));
    }

    #[test]
    fn test_request_line_strips_query() {
        let head = "GET /files?sort=name HTTP/1.1\r\n";
        assert_eq!(request_line(head), Some(("GET", "/files")));
    }

    #[test]
    fn test_request_line_malformed() {
        assert_eq!(request_line(""), None);
        assert_eq!(request_line("GET"), None);
    }
}
