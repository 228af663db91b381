//! Configuration for ledgerkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a ledgerkv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Transaction Log Configuration
    // -------------------------------------------------------------------------
    /// Path of the transaction log file. Created on first open; replayed
    /// on every startup. Compaction rewrites it in place via
    /// `{log_path}.compact`.
    pub log_path: PathBuf,

    /// Capacity of the bounded queue between producers and the writer
    /// thread. Producers block once this many events are in flight.
    pub queue_capacity: usize,

    /// Sync policy: how often the writer fsyncs the log
    pub sync_policy: SyncPolicy,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// HTTP listen address
    pub listen_addr: String,
}

/// Log sync policy
#[derive(Debug, Clone, Copy)]
pub enum SyncPolicy {
    /// fsync after every record (safest, slowest)
    EveryRecord,

    /// fsync after N unsynced records (balanced durability/performance)
    EveryNRecords { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("./transactions.log"),
            queue_capacity: 16,
            sync_policy: SyncPolicy::EveryRecord,
            listen_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the transaction log path
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_path = path.into();
        self
    }

    /// Set the writer queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Set the log sync policy
    pub fn sync_policy(mut self, policy: SyncPolicy) -> Self {
        self.config.sync_policy = policy;
        self
    }

    /// Set the HTTP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.queue_capacity, 16);
        assert!(matches!(config.sync_policy, SyncPolicy::EveryRecord));
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::builder()
            .log_path("/tmp/tx.log")
            .queue_capacity(4)
            .sync_policy(SyncPolicy::EveryNRecords { count: 50 })
            .listen_addr("0.0.0.0:9000")
            .build();

        assert_eq!(config.log_path, PathBuf::from("/tmp/tx.log"));
        assert_eq!(config.queue_capacity, 4);
        assert!(matches!(
            config.sync_policy,
            SyncPolicy::EveryNRecords { count: 50 }
        ));
        assert_eq!(config.listen_addr, "0.0.0.0:9000");
    }
}
