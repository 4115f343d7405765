//! Depot File-Exchange Server Library
//!
//! This library exposes the server's internal modules for integration testing.

pub mod address;
pub mod audit;
pub mod constants;
pub mod events;
pub mod http;
pub mod i18n;
pub mod service;
pub mod store;
pub mod websocket;
