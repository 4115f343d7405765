//! WebSocket observer channel
//!
//! Observers connect, receive every operation as a localized text line,
//! and send nothing meaningful back. The reader side of the split stream
//! exists only to notice the close handshake (or a dropped socket) so the
//! subscription can be torn down promptly.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::Message;

use crate::i18n;
use crate::service::TransferService;

/// Per-connection parameters handed to each spawned observer task
pub struct EventParams {
    pub peer_addr: SocketAddr,
    pub service: Arc<TransferService>,
    pub locale: String,
    pub debug: bool,
}

/// Serve one observer connection until it closes
pub async fn handle_event_connection(socket: TcpStream, params: EventParams) -> io::Result<()> {
    let peer = params.peer_addr.to_string();
    let stream = accept_async(socket).await.map_err(io::Error::other)?;
    let (mut sink, mut source) = stream.split();

    let (id, mut records) = params.service.observer_connected(&peer).await;
    if params.debug {
        println!("observer {id} connected from {peer}");
    }

    loop {
        tokio::select! {
            record = records.recv() => {
                let Some(record) = record else {
                    // Bus gone; the process is shutting down
                    break;
                };
                let line = i18n::format_event(&params.locale, &record);
                if sink.send(Message::text(line)).await.is_err() {
                    break;
                }
            }
            message = source.next() => {
                match message {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Pings are answered by the protocol layer; anything
                    // else an observer sends is ignored
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    params.service.observer_disconnected(id, &peer).await;
    if params.debug {
        println!("observer {id} disconnected from {peer}");
    }
    Ok(())
}
