//! Error types for ledgerkv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using LedgerError
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Unified error type for ledgerkv operations
#[derive(Debug, Error)]
pub enum LedgerError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Transaction Log Errors
    // -------------------------------------------------------------------------
    #[error("malformed log record: {0}")]
    ParseRecord(String),

    #[error("transaction numbers out of sequence: last {last}, found {found}")]
    OutOfSequence { last: u64, found: u64 },

    #[error("compaction failed: {0}")]
    Compaction(#[source] Box<LedgerError>),

    // -------------------------------------------------------------------------
    // Writer Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("transaction log writer is closed")]
    WriterClosed,

    #[error("transaction log writer panicked")]
    WriterPanicked,

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("key not found")]
    KeyNotFound,

    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),
}

impl LedgerError {
    /// True for errors callers can fix by changing the request, as opposed
    /// to faults in the log or the process.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LedgerError::KeyNotFound | LedgerError::InvalidKey(_) | LedgerError::InvalidValue(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_sequence_display() {
        let err = LedgerError::OutOfSequence { last: 9, found: 7 };
        assert_eq!(
            err.to_string(),
            "transaction numbers out of sequence: last 9, found 7"
        );
    }

    #[test]
    fn test_compaction_wraps_cause() {
        let cause = LedgerError::ParseRecord("truncated record".to_string());
        let err = LedgerError::Compaction(Box::new(cause));
        assert!(err.to_string().starts_with("compaction failed:"));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(LedgerError::KeyNotFound.is_client_error());
        assert!(LedgerError::InvalidKey("too long".into()).is_client_error());
        assert!(!LedgerError::WriterClosed.is_client_error());
    }
}
