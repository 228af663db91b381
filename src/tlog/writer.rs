//! Transaction log writer
//!
//! A single background thread owns the log file and applies every
//! mutation in arrival order.
//!
//! ## Responsibilities
//! - Serialize all appends through one thread (no lock on the file)
//! - Assign sequence numbers at the moment a record is written
//! - Apply the configured fsync policy
//! - Run compaction synchronously after each delete
//! - Fail producers fast once the writer has exited
//!
//! Producers talk to the thread over a bounded channel, so a slow disk
//! pushes back on callers instead of buffering without limit. When the
//! writer dies, dropping its receiver wakes every blocked producer with
//! an error; no caller is left waiting on a thread that no longer
//! exists.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, Receiver, Sender};
use tracing::{debug, error};

use crate::config::SyncPolicy;
use crate::error::{LedgerError, Result};

use super::compactor;
use super::record::{encode_record, Event, EventKind};

/// The writer reports at most one terminal error before exiting.
const ERROR_CHANNEL_CAPACITY: usize = 1;

/// A mutation waiting for the writer thread
///
/// Sequence numbers are deliberately absent: only the writer assigns
/// them, so they always match the order records hit the file.
struct WriteRequest {
    kind: EventKind,
    key: String,
    value: String,
}

// =============================================================================
// Producer Handle
// =============================================================================

/// Producer-side handle to the background log writer
///
/// Cheap to share behind an `Arc`; all methods take `&self` except
/// `close`, which consumes the handle to guarantee no further writes.
pub struct TransactionLogHandle {
    requests: Sender<WriteRequest>,
    errors: Receiver<LedgerError>,
    worker: JoinHandle<()>,
}

impl TransactionLogHandle {
    /// Queue a put record
    ///
    /// Blocks while the queue is full. Once the writer has exited this
    /// returns `WriterClosed` immediately; the root cause is available
    /// from [`errors`](Self::errors) or [`close`](Self::close).
    pub fn write_put(&self, key: &str, value: &str) -> Result<()> {
        self.submit(WriteRequest {
            kind: EventKind::Put,
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Queue a delete record
    ///
    /// Same blocking and failure behavior as [`write_put`](Self::write_put).
    /// The writer compacts the log after appending the record.
    pub fn write_delete(&self, key: &str) -> Result<()> {
        self.submit(WriteRequest {
            kind: EventKind::Delete,
            key: key.to_string(),
            value: String::new(),
        })
    }

    /// Receiver carrying the writer's terminal error, if it ever fails
    ///
    /// At most one error is ever sent, after which the channel
    /// disconnects. Intended for a supervisor to watch; whichever of
    /// the watcher and [`close`](Self::close) asks first gets the error.
    pub fn errors(&self) -> Receiver<LedgerError> {
        self.errors.clone()
    }

    /// Stop the writer and wait for it to finish
    ///
    /// Requests already queued are still written and synced before the
    /// thread exits. Returns the writer's terminal error if it failed
    /// at any point, including during the final drain.
    pub fn close(self) -> Result<()> {
        let Self {
            requests,
            errors,
            worker,
        } = self;

        // The receive loop ends once every sender is gone and the queue
        // is drained.
        drop(requests);

        let join_result = worker.join();

        match errors.try_recv() {
            Ok(e) => Err(e),
            Err(_) => match join_result {
                Ok(()) => Ok(()),
                Err(_) => Err(LedgerError::WriterPanicked),
            },
        }
    }

    fn submit(&self, request: WriteRequest) -> Result<()> {
        // send blocks while the queue is full and fails once the
        // receiver is gone, which is exactly the backpressure and
        // failure visibility the producers need.
        self.requests
            .send(request)
            .map_err(|_| LedgerError::WriterClosed)
    }
}

// =============================================================================
// Writer Thread
// =============================================================================

/// Spawn the writer thread and hand back the producer endpoint
///
/// `last_sequence` seeds the counter, so numbering continues from
/// whatever replay observed on disk.
pub(crate) fn spawn(
    file: File,
    path: PathBuf,
    last_sequence: u64,
    queue_capacity: usize,
    sync_policy: SyncPolicy,
) -> Result<TransactionLogHandle> {
    let (request_tx, request_rx) = bounded(queue_capacity);
    let (error_tx, error_rx) = bounded(ERROR_CHANNEL_CAPACITY);

    let writer = LogWriter {
        file,
        path,
        sequence: last_sequence,
        sync_policy,
        unsynced: 0,
    };

    let worker = thread::Builder::new()
        .name("tlog-writer".to_string())
        .spawn(move || writer.run(request_rx, error_tx))?;

    Ok(TransactionLogHandle {
        requests: request_tx,
        errors: error_rx,
        worker,
    })
}

/// State owned exclusively by the writer thread
struct LogWriter {
    file: File,
    path: PathBuf,
    sequence: u64,
    sync_policy: SyncPolicy,
    unsynced: usize,
}

impl LogWriter {
    fn run(mut self, requests: Receiver<WriteRequest>, errors: Sender<LedgerError>) {
        debug!(sequence = self.sequence, "transaction log writer started");

        while let Ok(request) = requests.recv() {
            if let Err(e) = self.apply(request) {
                error!(error = %e, "transaction log writer failed");
                let _ = errors.try_send(e);
                return;
            }
        }

        // Every producer is gone and the queue is drained; make the tail
        // durable before the thread exits.
        if let Err(e) = self.file.sync_all() {
            error!(error = %e, "final log sync failed");
            let _ = errors.try_send(e.into());
            return;
        }

        debug!(sequence = self.sequence, "transaction log writer stopped");
    }

    fn apply(&mut self, request: WriteRequest) -> Result<()> {
        self.sequence += 1;
        let event = Event {
            sequence: self.sequence,
            kind: request.kind,
            key: request.key,
            value: request.value,
        };

        // Unbuffered on purpose: the record reaches the kernel before
        // the call returns, and durability cadence is the sync policy's
        // job alone.
        self.file.write_all(encode_record(&event).as_bytes())?;
        self.maybe_sync()?;

        if event.kind == EventKind::Delete {
            // The delete record must be durable before compaction
            // rewrites the log around it, whatever the sync policy.
            self.file.sync_all()?;
            self.file = compactor::compact(&self.path, &event.key)
                .map_err(|e| LedgerError::Compaction(Box::new(e)))?;
            self.unsynced = 0;
        }

        Ok(())
    }

    fn maybe_sync(&mut self) -> Result<()> {
        match self.sync_policy {
            SyncPolicy::EveryRecord => {
                self.file.sync_all()?;
            }
            SyncPolicy::EveryNRecords { count } => {
                self.unsynced += 1;
                if self.unsynced >= count {
                    self.file.sync_all()?;
                    self.unsynced = 0;
                }
            }
        }
        Ok(())
    }
}
