use super::Command;
use crate::filter::CountingFilter;
use crate::protocol::wire::{ErrorKind, Response};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Executes parsed commands against the shared filter.
///
/// One executor is built at startup and cloned into every connection
/// handler; all clones dispatch against the same filter instance.
/// Mutating commands take the write lock so each multi-counter update is
/// atomic as a whole; membership tests share the read lock and may run
/// concurrently with each other.
#[derive(Clone)]
pub struct CommandExecutor {
    filter: Arc<RwLock<CountingFilter>>,
    commands_processed: Arc<AtomicU64>,
}

impl CommandExecutor {
    pub fn new(filter: Arc<RwLock<CountingFilter>>) -> Self {
        Self {
            filter,
            commands_processed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Execute a command and return the response to put on the wire.
    ///
    /// Domain failures (removing an absent value) are part of the normal
    /// response space, never an `Err` that could tear down the server.
    pub fn execute(&self, cmd: Command) -> Response {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);

        // Handlers are detached and filter state stays consistent across
        // a panic, so poisoned locks are entered rather than wedging
        // every later connection.
        match cmd {
            Command::Add(url) => {
                let mut filter = self
                    .filter
                    .write()
                    .unwrap_or_else(PoisonError::into_inner);
                if filter.add(&url) {
                    Response::Found
                } else {
                    Response::Created
                }
            }

            Command::Contains(url) => {
                let filter = self.filter.read().unwrap_or_else(PoisonError::into_inner);
                Response::Membership(filter.contains(&url))
            }

            Command::Remove(url) => {
                let mut filter = self
                    .filter
                    .write()
                    .unwrap_or_else(PoisonError::into_inner);
                match filter.remove(&url) {
                    Ok(()) => Response::Removed,
                    // NotPresent is the only failure remove can produce
                    Err(_) => Response::Error(ErrorKind::NotPresent),
                }
            }
        }
    }

    /// Total commands dispatched across all connections.
    pub fn commands_processed(&self) -> u64 {
        self.commands_processed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterSpec;
    use std::thread;

    fn executor(capacity: usize) -> CommandExecutor {
        let filter = CountingFilter::new(&FilterSpec {
            capacity,
            seeds: vec![3, 11, 17, 29],
        });
        CommandExecutor::new(Arc::new(RwLock::new(filter)))
    }

    #[test]
    fn add_query_remove_round() {
        let exec = executor(1 << 16);
        let url = "http://a.com".to_string();

        assert_eq!(exec.execute(Command::Add(url.clone())), Response::Created);
        assert_eq!(exec.execute(Command::Add(url.clone())), Response::Found);
        assert_eq!(
            exec.execute(Command::Contains(url.clone())),
            Response::Membership(true)
        );

        assert_eq!(exec.execute(Command::Remove(url.clone())), Response::Removed);
        assert_eq!(exec.execute(Command::Remove(url.clone())), Response::Removed);
        assert_eq!(
            exec.execute(Command::Contains(url.clone())),
            Response::Membership(false)
        );
        assert_eq!(
            exec.execute(Command::Remove(url)),
            Response::Error(ErrorKind::NotPresent)
        );
    }

    #[test]
    fn remove_of_absent_value_is_reported_not_fatal() {
        let exec = executor(4096);
        assert_eq!(
            exec.execute(Command::Remove("http://never.com".to_string())),
            Response::Error(ErrorKind::NotPresent)
        );
        // executor still serves later commands
        assert_eq!(
            exec.execute(Command::Add("http://next.com".to_string())),
            Response::Created
        );
    }

    #[test]
    fn concurrent_adds_are_not_lost() {
        let exec = executor(1 << 16);
        let threads = 16;

        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let exec = exec.clone();
                thread::spawn(move || {
                    exec.execute(Command::Add(format!("http://site-{}.com", i)));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0..threads {
            assert_eq!(
                exec.execute(Command::Contains(format!("http://site-{}.com", i))),
                Response::Membership(true),
                "add from thread {} was lost",
                i
            );
        }
        assert_eq!(exec.commands_processed(), threads as u64 * 2);
    }
}
