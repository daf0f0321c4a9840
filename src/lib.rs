//! urlsieve: a concurrent membership-filter server for URLs
//!
//! This crate provides a line-protocol TCP server over a single shared
//! counting Bloom filter: clients `POST` a URL to insert it, `GET` to
//! test membership, and `DELETE` to remove it.
//!
//! # Architecture
//!
//! - One process-wide counting filter behind a read/write lock
//! - Thread-per-connection handlers, detached from the accept loop
//! - One request/response exchange per connection, JSON line responses

/// Configuration management for the server
pub mod config;

/// Error types and result aliases
pub mod error;

/// Counting filter and its hash family
pub mod filter;

/// Network layer for connection handling
pub mod network;

/// Request parsing, command dispatch, and response rendering
pub mod protocol;

/// Core server implementation
pub mod server;

pub use config::{Config, FilterSpec};
pub use error::{Error, Result};
pub use server::Server;
