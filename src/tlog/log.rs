//! Transaction log façade
//!
//! Ties open, replay, and writer startup into one lifecycle.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, Seek, SeekFrom};
use std::path::PathBuf;

use tracing::debug;

use crate::config::SyncPolicy;
use crate::error::Result;

use super::reader::EventReader;
use super::record::Event;
use super::writer::{self, TransactionLogHandle};

/// An opened transaction log, not yet accepting writes
///
/// Lifecycle: [`open`](Self::open), then [`restore`](Self::restore) to
/// rebuild state, then [`start`](Self::start), which consumes the log
/// and moves its file into the writer thread. The writer thread is the
/// file's only owner from that point on.
pub struct TransactionLog {
    file: File,
    path: PathBuf,
    last_sequence: u64,
}

impl TransactionLog {
    /// Open or create the log file
    ///
    /// Read access serves replay; append mode keeps every future write
    /// at the end of the file regardless of read position. Nothing is
    /// read here.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)?;

        debug!(path = %path.display(), "opened transaction log");

        Ok(Self {
            file,
            path,
            last_sequence: 0,
        })
    }

    /// Replay the whole log, feeding each event into `apply` in order
    ///
    /// Returns the number of events applied. Stops at the first
    /// undecodable or out-of-order record; every event before it has
    /// already been applied by then. After a successful replay the
    /// sequence counter holds the highest number on disk, so appends
    /// continue the on-disk numbering instead of reusing it.
    pub fn restore<F>(&mut self, mut apply: F) -> Result<u64>
    where
        F: FnMut(Event) -> Result<()>,
    {
        // Replay always covers the whole file, wherever the read
        // position was left.
        self.file.seek(SeekFrom::Start(0))?;

        let mut reader = EventReader::new(BufReader::new(&self.file));
        let mut applied: u64 = 0;

        for event in reader.by_ref() {
            apply(event?)?;
            applied += 1;
        }

        self.last_sequence = reader.last_sequence();

        debug!(
            events = applied,
            last_sequence = self.last_sequence,
            "transaction log replayed"
        );

        Ok(applied)
    }

    /// Highest sequence number seen by `restore` (0 for a fresh log)
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    /// Hand the file to the background writer and start accepting writes
    pub fn start(
        self,
        queue_capacity: usize,
        sync_policy: SyncPolicy,
    ) -> Result<TransactionLogHandle> {
        writer::spawn(
            self.file,
            self.path,
            self.last_sequence,
            queue_capacity,
            sync_policy,
        )
    }
}
