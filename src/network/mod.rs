//! Network layer: per-connection handlers.

pub mod connection;

pub use connection::Connection;
