//! Transaction log reader
//!
//! Streams events out of a log in file order, enforcing sequence
//! monotonicity as it goes.

use std::io::BufRead;

use crate::error::{LedgerError, Result};

use super::record::{decode_record, Event};

/// Streaming reader over an event log
///
/// Yields events lazily. The stream ends at end-of-file or at the first
/// I/O, parse, or ordering error; after either the iterator is fused
/// and yields nothing further. End-of-file is not an error.
pub struct EventReader<R> {
    source: R,
    last_sequence: u64,
    line_number: u64,
    done: bool,
}

impl<R: BufRead> EventReader<R> {
    /// Wrap a buffered reader positioned at the start of the log
    pub fn new(source: R) -> Self {
        Self {
            source,
            last_sequence: 0,
            line_number: 0,
            done: false,
        }
    }

    /// Highest sequence number read so far (0 before any event)
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    fn read_event(&mut self) -> Result<Option<Event>> {
        let mut line = String::new();
        if self.source.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        // Strip the record terminator only. A blanket trim would eat a
        // carriage return belonging to the value.
        if line.ends_with('\n') {
            line.pop();
        }

        let event = decode_record(&line).map_err(|e| match e {
            LedgerError::ParseRecord(msg) => {
                LedgerError::ParseRecord(format!("line {}: {}", self.line_number, msg))
            }
            other => other,
        })?;

        // Sequences must strictly increase down the file. Equal or lower
        // means the log was tampered with or interleaved by another writer.
        if event.sequence <= self.last_sequence {
            return Err(LedgerError::OutOfSequence {
                last: self.last_sequence,
                found: event.sequence,
            });
        }
        self.last_sequence = event.sequence;

        Ok(Some(event))
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_event() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::super::record::EventKind;
    use super::*;

    fn reader(log: &str) -> EventReader<Cursor<&str>> {
        EventReader::new(Cursor::new(log))
    }

    #[test]
    fn test_empty_log_yields_nothing() {
        let mut events = reader("");
        assert!(events.next().is_none());
        assert_eq!(events.last_sequence(), 0);
    }

    #[test]
    fn test_events_in_file_order() {
        let log = "1\t2\ta\tone\n2\t2\tb\ttwo\n3\t1\ta\t\n";
        let events: Vec<Event> = reader(log).map(|e| e.unwrap()).collect();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].key, "a");
        assert_eq!(events[1].value, "two");
        assert_eq!(events[2].kind, EventKind::Delete);
    }

    #[test]
    fn test_last_sequence_tracks_highest() {
        let log = "5\t2\ta\tx\n9\t2\tb\ty\n";
        let mut events = reader(log);
        while let Some(event) = events.next() {
            event.unwrap();
        }
        assert_eq!(events.last_sequence(), 9);
    }

    #[test]
    fn test_gaps_are_legal() {
        // Compaction removes records, leaving gaps.
        let log = "2\t2\ta\tx\n7\t2\tb\ty\n40\t1\tb\t\n";
        assert_eq!(reader(log).count(), 3);
    }

    #[test]
    fn test_repeated_sequence_rejected() {
        let log = "1\t2\ta\tx\n1\t2\tb\ty\n";
        let mut events = reader(log);

        events.next().unwrap().unwrap();
        let err = events.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            LedgerError::OutOfSequence { last: 1, found: 1 }
        ));
    }

    #[test]
    fn test_regressing_sequence_rejected() {
        let log = "5\t2\ta\tx\n3\t2\tb\ty\n";
        let mut events = reader(log);

        events.next().unwrap().unwrap();
        let err = events.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            LedgerError::OutOfSequence { last: 5, found: 3 }
        ));
    }

    #[test]
    fn test_sequence_zero_rejected() {
        let err = reader("0\t2\ta\tx\n").next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            LedgerError::OutOfSequence { last: 0, found: 0 }
        ));
    }

    #[test]
    fn test_fused_after_error() {
        let log = "1\t2\ta\tx\ngarbage\n3\t2\tb\ty\n";
        let mut events = reader(log);

        events.next().unwrap().unwrap();
        assert!(events.next().unwrap().is_err());
        // The valid record after the corruption is never reached.
        assert!(events.next().is_none());
    }

    #[test]
    fn test_parse_error_names_line() {
        let log = "1\t2\ta\tx\nbroken\n";
        let err = reader(log).nth(1).unwrap().unwrap_err();
        match err {
            LedgerError::ParseRecord(msg) => assert!(msg.starts_with("line 2:")),
            other => panic!("expected ParseRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_final_line_without_newline() {
        // A crash can truncate the trailing newline; the record itself
        // is still whole.
        let log = "1\t2\ta\tx\n2\t2\tb\ty";
        let events: Vec<Event> = reader(log).map(|e| e.unwrap()).collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].value, "y");
    }

    #[test]
    fn test_value_with_trailing_carriage_return_preserved() {
        let log = "1\t2\ta\tx\r\n";
        let events: Vec<Event> = reader(log).map(|e| e.unwrap()).collect();
        assert_eq!(events[0].value, "x\r");
    }
}
