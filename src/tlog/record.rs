//! Transaction log records
//!
//! Defines the record type and its tab-separated line encoding.

use crate::error::{LedgerError, Result};

/// A single entry in the transaction log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Transaction sequence number - strictly increasing
    pub sequence: u64,

    /// What happened to the key
    pub kind: EventKind,

    /// The key the event applies to
    pub key: String,

    /// The value written (empty for deletes)
    pub value: String,
}

/// Event kinds that can be logged
///
/// The discriminants are the on-disk kind codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Key removed
    Delete = 1,

    /// Key written
    Put = 2,
}

impl EventKind {
    /// Numeric code used in the on-disk format
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Parse an on-disk kind code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(EventKind::Delete),
            2 => Some(EventKind::Put),
            _ => None,
        }
    }
}

impl Event {
    /// Create a put event
    pub fn put(sequence: u64, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            sequence,
            kind: EventKind::Put,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a delete event
    pub fn delete(sequence: u64, key: impl Into<String>) -> Self {
        Self {
            sequence,
            kind: EventKind::Delete,
            key: key.into(),
            value: String::new(),
        }
    }
}

/// Encode an event as one log line, trailing newline included
pub fn encode_record(event: &Event) -> String {
    format!(
        "{}\t{}\t{}\t{}\n",
        event.sequence,
        event.kind.code(),
        event.key,
        event.value
    )
}

/// Decode one log line (without its trailing newline)
///
/// The line splits into at most four fields; the value is everything
/// after the third tab, so values containing tabs survive the round
/// trip. Unknown kind codes are rejected rather than skipped, since a
/// record we cannot interpret means the log and the state it rebuilds
/// have diverged.
pub fn decode_record(line: &str) -> Result<Event> {
    let mut fields = line.splitn(4, '\t');
    let sequence = next_field(&mut fields, line)?;
    let kind = next_field(&mut fields, line)?;
    let key = next_field(&mut fields, line)?;
    let value = next_field(&mut fields, line)?;

    let sequence: u64 = sequence
        .parse()
        .map_err(|_| LedgerError::ParseRecord(format!("bad sequence number {:?}", sequence)))?;

    let code: u8 = kind
        .parse()
        .map_err(|_| LedgerError::ParseRecord(format!("bad kind field {:?}", kind)))?;
    let kind = EventKind::from_code(code)
        .ok_or_else(|| LedgerError::ParseRecord(format!("unknown kind code {}", code)))?;

    Ok(Event {
        sequence,
        kind,
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn next_field<'a>(fields: &mut std::str::SplitN<'a, char>, line: &str) -> Result<&'a str> {
    fields.next().ok_or_else(|| {
        LedgerError::ParseRecord(format!("expected 4 tab-separated fields in {:?}", line))
    })
}
