//! Shared harness: a real server on an ephemeral port plus one-shot
//! request helpers.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use urlsieve::{Config, FilterSpec, Server};

pub struct TestServer {
    pub addr: SocketAddr,
    server: Arc<Server>,
    handle: thread::JoinHandle<()>,
}

/// Start a server on an OS-assigned port and serve it from a background
/// thread.
pub fn start_server() -> TestServer {
    let config = Config {
        filter: FilterSpec {
            capacity: 1 << 16,
            seeds: vec![3, 11, 17, 29],
        },
        ..Default::default()
    };
    let server = Arc::new(Server::new(config).expect("server construction"));

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    let serving = Arc::clone(&server);
    let handle = thread::spawn(move || {
        let _ = serving.serve_on(listener);
    });

    TestServer {
        addr,
        server,
        handle,
    }
}

impl TestServer {
    pub fn stop(self) {
        self.server.shutdown();
        let _ = self.handle.join();
    }
}

pub fn connect(addr: SocketAddr) -> TcpStream {
    let stream = TcpStream::connect(addr).expect("connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .expect("read timeout");
    stream
}

/// One full exchange on a fresh connection; returns the response line
/// without its trailing newline.
pub fn request(addr: SocketAddr, line: &str) -> String {
    let mut stream = connect(addr);
    stream.write_all(line.as_bytes()).expect("request write");
    read_response(&stream)
}

pub fn read_response(stream: &TcpStream) -> String {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut line = String::new();
    reader.read_line(&mut line).expect("response read");
    line.trim_end().to_string()
}
