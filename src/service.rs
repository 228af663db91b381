//! Key-Value Service
//!
//! Coordinates the in-memory store and the transaction log.
//!
//! ## Responsibilities
//! - Validate keys and values before anything reaches the store or disk
//! - Apply mutations to the store first, log them only on success
//! - Rebuild state from the log on startup
//! - Shut the log writer down cleanly

use crossbeam::channel::Receiver;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{LedgerError, Result};
use crate::store::{MemoryStore, Storage};
use crate::tlog::{EventKind, TransactionLog, TransactionLogHandle};

// =============================================================================
// Validation Limits
// =============================================================================

/// Longest accepted key, in bytes
pub const MAX_KEY_BYTES: usize = 64;

/// Longest accepted value, in bytes
pub const MAX_VALUE_BYTES: usize = 128;

/// Characters that cannot appear in keys: the URL path and the log
/// format reserve them
const FORBIDDEN_KEY_CHARS: [char; 4] = [' ', '/', '\t', '\n'];

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(LedgerError::InvalidKey("key is empty".to_string()));
    }
    if key.len() > MAX_KEY_BYTES {
        return Err(LedgerError::InvalidKey(format!(
            "key exceeds {} bytes",
            MAX_KEY_BYTES
        )));
    }
    if key.chars().any(|c| FORBIDDEN_KEY_CHARS.contains(&c)) {
        return Err(LedgerError::InvalidKey(
            "key contains a space, slash, tab, or newline".to_string(),
        ));
    }
    Ok(())
}

fn check_value(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(LedgerError::InvalidValue("value is empty".to_string()));
    }
    if value.len() > MAX_VALUE_BYTES {
        return Err(LedgerError::InvalidValue(format!(
            "value exceeds {} bytes",
            MAX_VALUE_BYTES
        )));
    }
    // A newline would be read back as a record boundary on replay.
    if value.contains('\n') {
        return Err(LedgerError::InvalidValue(
            "value contains a newline".to_string(),
        ));
    }
    Ok(())
}

// =============================================================================
// Service
// =============================================================================

/// The service behind every API operation
///
/// Mutations follow store-then-log order: the log records what the
/// store accepted, never the other way around, so a validation or
/// store failure leaves no stray record behind.
pub struct KeyValueService<S: Storage> {
    store: S,
    logger: TransactionLogHandle,
}

impl KeyValueService<MemoryStore> {
    /// Open the log, replay it into a fresh in-memory store, and start
    /// the background writer
    pub fn bootstrap(config: &Config) -> Result<Self> {
        let store = MemoryStore::new();
        let mut log = TransactionLog::open(&config.log_path)?;

        let replayed = log.restore(|event| match event.kind {
            EventKind::Put => store.put(&event.key, &event.value),
            // A delete for an absent key can survive a crash that
            // interrupted compaction; the key is gone either way.
            EventKind::Delete => match store.delete(&event.key) {
                Err(LedgerError::KeyNotFound) => Ok(()),
                other => other,
            },
        })?;

        info!(
            events = replayed,
            keys = store.len(),
            last_sequence = log.last_sequence(),
            "state rebuilt from transaction log"
        );

        let logger = log.start(config.queue_capacity, config.sync_policy)?;

        Ok(Self { store, logger })
    }
}

impl<S: Storage> KeyValueService<S> {
    /// Build a service from parts
    ///
    /// The caller is responsible for having replayed the log into the
    /// store already; `bootstrap` does both in one step.
    pub fn new(store: S, logger: TransactionLogHandle) -> Self {
        Self { store, logger }
    }

    /// Store a value, then record the write
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        check_key(key)?;
        check_value(value)?;

        self.store.put(key, value)?;
        self.logger.write_put(key, value)?;

        debug!(key, "put");
        Ok(())
    }

    /// Look up a value
    ///
    /// Reads do not touch the log.
    pub fn get(&self, key: &str) -> Result<String> {
        check_key(key)?;
        self.store.get(key)
    }

    /// Remove a key, then record the delete
    ///
    /// The recorded delete triggers log compaction on the writer
    /// thread.
    pub fn delete(&self, key: &str) -> Result<()> {
        check_key(key)?;

        self.store.delete(key)?;
        self.logger.write_delete(key)?;

        debug!(key, "delete");
        Ok(())
    }

    /// Receiver carrying the log writer's terminal error, if any
    pub fn log_errors(&self) -> Receiver<LedgerError> {
        self.logger.errors()
    }

    /// Stop accepting writes, flush the log, and join the writer
    pub fn shutdown(self) -> Result<()> {
        self.logger.close()
    }
}
