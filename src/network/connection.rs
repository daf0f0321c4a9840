use crate::error::{ProtocolError, Result};
use crate::protocol::{Command, CommandExecutor, Response};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// One client session.
///
/// The handler owns its socket exclusively; the socket closes when the
/// handler returns, on every exit path including a panic unwind.
///
/// Session shape: the connection serves exactly one successful exchange.
/// A malformed line gets an error response and another read on the same
/// connection; any other outcome (valid command, unknown verb, silent
/// peer) responds once and closes.
pub struct Connection {
    stream: TcpStream,
    peer_addr: SocketAddr,
    executor: CommandExecutor,
    pub connection_id: usize,
}

impl Connection {
    pub fn new(stream: TcpStream, peer_addr: SocketAddr, executor: CommandExecutor) -> Self {
        static CONNECTION_ID: AtomicUsize = AtomicUsize::new(0);
        let connection_id = CONNECTION_ID.fetch_add(1, Ordering::Relaxed);

        Self {
            stream,
            peer_addr,
            executor,
            connection_id,
        }
    }

    /// Drive the session to completion.
    pub fn run(mut self) -> Result<()> {
        let mut reader = BufReader::new(self.stream.try_clone()?);
        let mut line = String::new();

        loop {
            line.clear();
            let read = match reader.read_line(&mut line) {
                Ok(n) => n,
                // an idle timeout looks like a peer that went away
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => 0,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    self.write_response(&Response::from(ProtocolError::BadRequest));
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            if read == 0 {
                self.write_response(&Response::from(ProtocolError::NoInput));
                return Ok(());
            }

            match Command::parse(&line) {
                Ok(cmd) => {
                    debug!(
                        connection = self.connection_id,
                        verb = cmd.verb(),
                        url = cmd.url(),
                        "dispatching"
                    );
                    let response = self.executor.execute(cmd);
                    self.write_response(&response);
                    return Ok(());
                }
                Err(err @ ProtocolError::BadRequest) => {
                    // malformed input gets another read on the same connection
                    self.write_response(&Response::from(err));
                }
                Err(err) => {
                    self.write_response(&Response::from(err));
                    return Ok(());
                }
            }
        }
    }

    /// Best-effort response write. The peer may already be gone; a failed
    /// write ends with this connection and never reaches the accept loop.
    fn write_response(&mut self, response: &Response) {
        if let Err(e) = self.stream.write_all(response.render().as_bytes()) {
            debug!(
                connection = self.connection_id,
                peer = %self.peer_addr,
                "response write failed: {}",
                e
            );
        }
    }
}
