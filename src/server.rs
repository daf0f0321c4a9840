use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::CountingFilter;
use crate::network::Connection;
use crate::protocol::CommandExecutor;
use std::io::ErrorKind;
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Membership filter server.
///
/// Owns the single shared [`CountingFilter`] for the process lifetime
/// and hands every accepted connection to a detached handler thread.
pub struct Server {
    config: Config,
    executor: CommandExecutor,
    shutdown: AtomicBool,
    active_connections: Arc<AtomicUsize>,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::Config(e.to_string()))?;

        // The one filter instance every connection shares.
        let filter = Arc::new(RwLock::new(CountingFilter::new(&config.filter)));
        let executor = CommandExecutor::new(filter);

        Ok(Self {
            config,
            executor,
            shutdown: AtomicBool::new(false),
            active_connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Bind the configured address and serve until shut down.
    ///
    /// Failing to bind is the only fatal error past construction.
    pub fn run(self: Arc<Self>) -> Result<()> {
        let listener =
            TcpListener::bind(format!("{}:{}", self.config.bind_addr, self.config.port))?;

        info!(
            "Server listening on {}:{} (filter: {} counters, {} hash functions)",
            self.config.bind_addr,
            self.config.port,
            self.config.filter.capacity,
            self.config.filter.hash_count(),
        );

        self.serve_on(listener)
    }

    /// Accept loop over an already-bound listener.
    ///
    /// Each accepted connection becomes a detached handler thread;
    /// the loop never waits on handlers and survives individual accept
    /// failures.
    pub fn serve_on(self: &Arc<Self>, listener: TcpListener) -> Result<()> {
        listener.set_nonblocking(true)?;

        while !self.shutdown.load(Ordering::Acquire) {
            match listener.accept() {
                Ok((stream, addr)) => {
                    debug!("New connection from {}", addr);

                    if self.active_connections.load(Ordering::Acquire)
                        >= self.config.max_connections
                    {
                        warn!("Connection limit reached, dropping {}", addr);
                        continue;
                    }

                    // the listener is non-blocking; the per-connection
                    // socket must not inherit that
                    if let Err(e) = stream.set_nonblocking(false) {
                        error!("Failed to configure socket for {}: {}", addr, e);
                        continue;
                    }
                    let _ = stream.set_nodelay(self.config.tcp_nodelay);
                    if let Some(secs) = self.config.idle_timeout_secs {
                        let _ = stream.set_read_timeout(Some(Duration::from_secs(secs)));
                    }

                    let connection = Connection::new(stream, addr, self.executor.clone());
                    let active = Arc::clone(&self.active_connections);
                    active.fetch_add(1, Ordering::AcqRel);

                    thread::spawn(move || {
                        let _guard = ActiveGuard(active);
                        if let Err(e) = connection.run() {
                            debug!("Connection from {} ended with error: {}", addr, e);
                        }
                    });
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }

        info!("Accept loop stopped");
        Ok(())
    }

    /// Signal the server to stop accepting connections.
    pub fn shutdown(&self) {
        info!("Initiating server shutdown");
        self.shutdown.store(true, Ordering::Release);
    }

    /// Get the number of active client connections
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Acquire)
    }
}

/// Decrements the active-connection count when the handler thread exits,
/// on any path.
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
