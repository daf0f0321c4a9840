//! Line-oriented wire format.
//!
//! Requests are one line of text, `<VERB> <URL>`. Responses are one JSON
//! line each, either `{"result": ...}` or `{"error": ...}`, so a client
//! can tell success from failure without scraping prose.

use crate::error::ProtocolError;
use serde_json::json;

/// Client-visible failure kinds and their wire messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoInput,
    BadRequest,
    NotFound,
    NotPresent,
}

impl ErrorKind {
    fn message(&self) -> &'static str {
        match self {
            ErrorKind::NoInput => "No input received",
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::NotPresent => "Not Present",
        }
    }
}

/// One response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Add succeeded, value was new.
    Created,
    /// Add succeeded, value was already (probably) present.
    Found,
    /// Membership test result.
    Membership(bool),
    /// Remove succeeded; no domain payload.
    Removed,
    Error(ErrorKind),
}

impl Response {
    /// Render as a single newline-terminated JSON line.
    pub fn render(&self) -> String {
        let value = match self {
            Response::Created => json!({"result": "Created"}),
            Response::Found => json!({"result": "Found"}),
            Response::Membership(member) => json!({"result": member}),
            Response::Removed => json!({"result": "No Content"}),
            Response::Error(kind) => json!({"error": kind.message()}),
        };
        let mut line = value.to_string();
        line.push('\n');
        line
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }
}

impl From<ProtocolError> for Response {
    fn from(err: ProtocolError) -> Self {
        Response::Error(match err {
            ProtocolError::NoInput => ErrorKind::NoInput,
            ProtocolError::BadRequest => ErrorKind::BadRequest,
            ProtocolError::NotFound => ErrorKind::NotFound,
        })
    }
}
