//! Storage Module
//!
//! In-memory key-value state, rebuilt from the transaction log on
//! startup. The log is the durable record; the store is the queryable
//! view of it.

mod memory;

pub use memory::MemoryStore;

use crate::error::Result;

/// Key-value state shared by the service and the replay path
///
/// Methods take `&self`; implementations choose their own interior
/// locking. Lookup and removal of an absent key report `KeyNotFound`.
pub trait Storage: Send + Sync + 'static {
    /// Insert or overwrite a key
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Look up a key's current value
    fn get(&self, key: &str) -> Result<String>;

    /// Remove a key
    fn delete(&self, key: &str) -> Result<()>;
}
