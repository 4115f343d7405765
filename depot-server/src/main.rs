//! Depot file-exchange server

mod address;
mod args;
mod audit;
mod constants;
mod events;
mod http;
mod i18n;
mod service;
mod store;
mod websocket;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use args::Args;
use audit::AuditLog;
use constants::*;
use events::EventBus;
use http::HttpParams;
use service::TransferService;
use store::FileStore;
use websocket::EventParams;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Print banner first
    println!("{}{}", MSG_BANNER, env!("CARGO_PKG_VERSION"));

    // Setup upload directory and audit log
    let upload_root = setup_upload_root(args.upload_root);
    let audit = setup_audit_log(args.log_file);

    // Setup network (one listener per surface)
    let (listener, event_listener) = setup_network(args.bind, args.port, args.event_port).await;

    // Setup graceful shutdown handling
    let shutdown_signal = setup_shutdown_signal();

    let service = Arc::new(TransferService::new(
        FileStore::new(upload_root),
        audit,
        EventBus::new(),
    ));

    let locale = args.locale;
    let debug = args.debug;

    // Main server loops - accept incoming connections on both ports
    tokio::select! {
        _ = shutdown_signal => {
            println!("{}", MSG_SHUTDOWN_RECEIVED);
        }
        // HTTP accept loop
        _ = async {
            loop {
                match listener.accept().await {
                    Ok((socket, peer_addr)) => {
                        let params = HttpParams {
                            peer_addr,
                            service: service.clone(),
                            locale: locale.clone(),
                            debug,
                        };
                        tokio::spawn(async move {
                            if let Err(e) = http::handle_connection(socket, params).await {
                                eprintln!("{}{}: {}", ERR_CONNECTION, peer_addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        eprintln!("{}{}", ERR_ACCEPT, e);
                    }
                }
            }
        } => {}
        // Event stream accept loop
        _ = async {
            loop {
                match event_listener.accept().await {
                    Ok((socket, peer_addr)) => {
                        let params = EventParams {
                            peer_addr,
                            service: service.clone(),
                            locale: locale.clone(),
                            debug,
                        };
                        tokio::spawn(async move {
                            let result = websocket::handle_event_connection(socket, params).await;
                            if let Err(e) = result
                                && debug
                            {
                                eprintln!("{}{}: {}", ERR_CONNECTION, peer_addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        eprintln!("{}{}", ERR_ACCEPT, e);
                    }
                }
            }
        } => {}
    }
}

/// Setup the upload directory
///
/// Returns the canonicalized path to the upload root, ready for use with
/// the containment checks in path resolution.
fn setup_upload_root(upload_root: Option<PathBuf>) -> PathBuf {
    let root = upload_root.unwrap_or_else(|| match store::default_upload_root() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{}{}", ERR_GENERIC, e);
            process::exit(1);
        }
    });

    let canonical_root = match store::init_upload_root(&root) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{}{}", ERR_GENERIC, e);
            process::exit(1);
        }
    };

    println!("{}{}", MSG_UPLOAD_ROOT, canonical_root.display());

    canonical_root
}

/// Setup the append-only audit log
fn setup_audit_log(log_file: Option<PathBuf>) -> AuditLog {
    let path = log_file.unwrap_or_else(|| match audit::default_log_path() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{}{}", ERR_GENERIC, e);
            process::exit(1);
        }
    });

    match AuditLog::open(&path) {
        Ok(log) => {
            println!("{}{}", MSG_AUDIT_LOG, log.path().display());
            log
        }
        Err(e) => {
            eprintln!("{}{}", ERR_AUDIT_OPEN, e);
            process::exit(1);
        }
    }
}

/// Setup the two TCP listeners (HTTP and event stream)
async fn setup_network(
    bind: std::net::IpAddr,
    port: u16,
    event_port: u16,
) -> (TcpListener, TcpListener) {
    let addr = SocketAddr::new(bind, port);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("{}{}: {}", ERR_BIND_FAILED, addr, e);
            process::exit(1);
        }
    };
    println!("{}{}", MSG_LISTENING, addr);

    let event_addr = SocketAddr::new(bind, event_port);
    let event_listener = match TcpListener::bind(event_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("{}{}: {}", ERR_BIND_FAILED, event_addr, e);
            process::exit(1);
        }
    };
    println!("{}{}", MSG_EVENT_LISTENING, event_addr);

    (listener, event_listener)
}

/// Setup graceful shutdown signal handling (Ctrl+C)
async fn setup_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate()).expect(ERR_SIGNAL_SIGTERM);
        let mut sigint = signal(SignalKind::interrupt()).expect(ERR_SIGNAL_SIGINT);

        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect(ERR_SIGNAL_CTRLC);
    }
}
