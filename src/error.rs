use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("value not present in filter")]
    NotPresent,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Request-level errors reported to the client on the wire.
///
/// All of these are recoverable at the connection level; none of them
/// terminate the server.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Peer disconnected (or went idle past the timeout) before sending a line.
    #[error("no input received")]
    NoInput,

    /// Request line did not split into exactly two tokens.
    #[error("bad request")]
    BadRequest,

    /// First token is not a registered verb.
    #[error("verb not found")]
    NotFound,
}
