use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bind address
    pub bind_addr: String,

    /// Port to listen on (unprivileged range, 1024-65535)
    pub port: u16,

    /// Filter geometry: counter capacity and hash seeds
    pub filter: FilterSpec,

    /// Maximum concurrently served connections
    pub max_connections: usize,

    /// TCP nodelay
    pub tcp_nodelay: bool,

    /// Idle read timeout per connection, in seconds. `None` lets a silent
    /// peer block its handler indefinitely.
    pub idle_timeout_secs: Option<u64>,

    /// Log level
    pub log_level: String,
}

/// Geometry of the membership filter, fixed for the process lifetime.
///
/// `capacity` is the number of counters (`m`); each seed selects one
/// member of the hash family, so the number of seeds is the hash count
/// (`k`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSpec {
    pub capacity: usize,
    pub seeds: Vec<u64>,
}

impl FilterSpec {
    /// Parse the startup filter string: capacity first, then one seed per
    /// hash function.
    ///
    /// # Example
    ///
    /// ```
    /// use urlsieve::FilterSpec;
    ///
    /// let spec = FilterSpec::parse("4096 3 11 17").unwrap();
    /// assert_eq!(spec.capacity, 4096);
    /// assert_eq!(spec.hash_count(), 3);
    /// ```
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let mut tokens = s.split_ascii_whitespace();
        let capacity = tokens
            .next()
            .context("filter spec is empty")?
            .parse::<usize>()
            .context("filter capacity is not a number")?;
        let seeds = tokens
            .map(|t| {
                t.parse::<u64>()
                    .with_context(|| format!("hash seed '{}' is not a number", t))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        if seeds.is_empty() {
            anyhow::bail!("filter spec needs at least one hash seed");
        }
        Ok(Self { capacity, seeds })
    }

    /// Number of hash functions (`k`).
    pub fn hash_count(&self) -> usize {
        self.seeds.len()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 7878,
            filter: FilterSpec {
                capacity: 1 << 20,
                seeds: vec![3, 11, 17, 29],
            },
            max_connections: 1024,
            tcp_nodelay: true,
            idle_timeout_secs: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use urlsieve::Config;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = Config::from_file("config.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.port < 1024 {
            anyhow::bail!("port must be in the unprivileged range (1024-65535)");
        }

        if self.filter.capacity == 0 {
            anyhow::bail!("filter capacity must be > 0");
        }

        if self.filter.seeds.is_empty() {
            anyhow::bail!("filter needs at least one hash seed");
        }

        if self.max_connections == 0 {
            anyhow::bail!("max_connections must be > 0");
        }

        Ok(())
    }
}
