//! Transaction Log Module
//!
//! Provides durability through append-only, sequence-numbered logging.
//!
//! ## Responsibilities
//! - Record every accepted mutation, one record per line, in arrival order
//! - Assign strictly increasing sequence numbers
//! - Replay the log on startup to rebuild in-memory state
//! - Compact the log whenever a key is deleted
//!
//! ## File Format
//! ```text
//! <sequence> TAB <kind> TAB <key> TAB <value> LF
//!
//! 13  2  user-42  ada        (put)
//! 14  1  user-42             (delete, value empty)
//! ```
//! The value field is everything after the third tab, so values may
//! themselves contain tabs. Sequence numbers are strictly increasing
//! down the file; compaction removes records, so gaps are legal.
//!
//! ## Lifecycle
//! ```text
//! TransactionLog::open ──▶ restore (replay into callbacks)
//!                              │
//!                              ▼
//!                      start (spawns writer thread,
//!                             consumes the log)
//!                              │
//!                              ▼
//!                    TransactionLogHandle
//!                    (write_put / write_delete / close)
//! ```

mod record;
mod reader;
mod writer;
mod compactor;
mod log;

pub use record::{decode_record, encode_record, Event, EventKind};
pub use reader::EventReader;
pub use writer::TransactionLogHandle;
pub use log::TransactionLog;
