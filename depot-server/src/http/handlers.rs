//! Request handlers for the file-transfer endpoints

use std::sync::Arc;

use crate::http::multipart::{self, MultipartError};
use crate::http::parse;
use crate::i18n::{t, t_args};
use crate::service::TransferService;
use crate::store::StoreError;

/// What a handler produced; the connection loop turns this into wire bytes
pub enum Response {
    Text {
        status: u16,
        body: String,
    },
    Json {
        status: u16,
        body: String,
    },
    /// An open file to stream; the Downloaded record is emitted only after
    /// the full body has been written
    File {
        file: tokio::fs::File,
        length: u64,
        name: String,
    },
}

impl Response {
    fn text(status: u16, body: String) -> Self {
        Response::Text { status, body }
    }
}

/// POST /upload: store a multipart file upload
pub async fn handle_upload(
    service: &Arc<TransferService>,
    locale: &str,
    headers: &str,
    body: &[u8],
    peer: &str,
) -> Response {
    let Some(content_type) = parse::header_value(headers, "content-type") else {
        return Response::text(400, t(locale, "upload-missing"));
    };
    let Some(boundary) = parse::multipart_boundary(content_type) else {
        return Response::text(400, t(locale, "upload-missing"));
    };

    let part = match multipart::extract_file_part(body, boundary) {
        Ok(part) => part,
        Err(MultipartError::InvalidFileName) => {
            return Response::text(400, t(locale, "invalid-file-name"));
        }
        Err(MultipartError::Malformed | MultipartError::NoFilePart) => {
            return Response::text(400, t(locale, "upload-missing"));
        }
    };

    match service.upload(part.data, &part.file_name, peer).await {
        Ok(_) => Response::text(200, t(locale, "upload-success")),
        Err(StoreError::InvalidName) => Response::text(400, t(locale, "invalid-file-name")),
        Err(_) => Response::text(500, t(locale, "server-error")),
    }
}

/// GET /files: list stored files as JSON
pub async fn handle_list(service: &Arc<TransferService>, locale: &str) -> Response {
    match service.list().await {
        Ok(entries) => match serde_json::to_string(&entries) {
            Ok(body) => Response::Json { status: 200, body },
            Err(_) => Response::text(500, t(locale, "server-error")),
        },
        Err(_) => Response::text(500, t(locale, "server-error")),
    }
}

/// GET /download/:name: open a stored file for streaming
pub async fn handle_download(
    service: &Arc<TransferService>,
    locale: &str,
    raw_name: &str,
) -> Response {
    let Some(name) = parse::percent_decode(raw_name) else {
        return Response::text(404, t(locale, "file-not-found"));
    };

    match service.open_download(&name).await {
        Ok((file, length)) => Response::File { file, length, name },
        // Out-of-root names read the same as missing ones
        Err(StoreError::NotFound | StoreError::InvalidName) => {
            Response::text(404, t(locale, "file-not-found"))
        }
        Err(_) => Response::text(500, t(locale, "server-error")),
    }
}

/// DELETE /delete/:name: remove one stored file
pub async fn handle_delete(
    service: &Arc<TransferService>,
    locale: &str,
    raw_name: &str,
    peer: &str,
) -> Response {
    let Some(name) = parse::percent_decode(raw_name) else {
        return Response::text(404, t(locale, "file-not-found"));
    };

    match service.delete(&name, peer).await {
        Ok(()) => Response::text(200, t_args(locale, "delete-success", &[("file", &name)])),
        Err(StoreError::NotFound | StoreError::InvalidName) => {
            Response::text(404, t(locale, "file-not-found"))
        }
        Err(_) => Response::text(500, t(locale, "server-error")),
    }
}

/// DELETE /delete-all: remove every stored file
pub async fn handle_delete_all(
    service: &Arc<TransferService>,
    locale: &str,
    peer: &str,
) -> Response {
    match service.delete_all(peer).await {
        Ok(0) => Response::text(404, t(locale, "delete-all-empty")),
        Ok(count) => Response::text(
            200,
            t_args(locale, "delete-all-success", &[("count", &count.to_string())]),
        ),
        Err(_) => Response::text(500, t(locale, "server-error")),
    }
}
