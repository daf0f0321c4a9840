use super::Command;
use crate::error::ProtocolError;

/// Parse one request line into a command.
///
/// A line is well-formed iff it splits into exactly two whitespace
/// separated tokens. Verbs match case-sensitively; an unknown verb on a
/// well-formed line is [`ProtocolError::NotFound`], not a parse error.
pub fn parse_line(line: &str) -> Result<Command, ProtocolError> {
    let mut tokens = line.split_ascii_whitespace();
    let verb = tokens.next().ok_or(ProtocolError::BadRequest)?;
    let url = tokens.next().ok_or(ProtocolError::BadRequest)?;
    if tokens.next().is_some() {
        return Err(ProtocolError::BadRequest);
    }

    match verb {
        "POST" => Ok(Command::Add(url.to_string())),
        "GET" => Ok(Command::Contains(url.to_string())),
        "DELETE" => Ok(Command::Remove(url.to_string())),
        _ => Err(ProtocolError::NotFound),
    }
}
