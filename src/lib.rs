//! # ledgerkv
//!
//! An HTTP key-value store with:
//! - An append-only, sequence-numbered transaction log for durability
//! - Startup replay to rebuild the in-memory state
//! - A single background writer thread with a bounded queue
//! - Online log compaction triggered by deletes
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      HTTP Server                             │
//! │                 PUT/GET/DELETE /v1/{key}                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 KeyValueService                              │
//! │          (validation, mutate-then-log ordering)              │
//! └──────────┬──────────────────────────────┬───────────────────┘
//!            │                              │
//!            ▼                              ▼
//!     ┌─────────────┐               ┌───────────────┐
//!     │ MemoryStore │               │ Log Handle    │
//!     │  (RwLock)   │               │ (bounded chan)│
//!     └─────────────┘               └───────┬───────┘
//!                                           │
//!                                           ▼
//!                                   ┌───────────────┐
//!                                   │ Writer Thread │
//!                                   │ (owns File,   │
//!                                   │  compacts on  │
//!                                   │  delete)      │
//!                                   └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod tlog;
pub mod store;
pub mod service;
pub mod http;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LedgerError, Result};
pub use config::{Config, SyncPolicy};
pub use service::KeyValueService;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ledgerkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
