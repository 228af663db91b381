//! Log compaction
//!
//! Rewrites the log so no trace of a deleted key remains.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

use super::reader::EventReader;
use super::record::encode_record;

/// Rewrite the log at `path`, dropping every record whose key is `key`
///
/// That includes the delete record that triggered the rewrite, so a
/// deleted key leaves nothing behind to replay. Survivors keep their
/// original sequence numbers; the rewritten log has gaps but stays
/// strictly increasing.
///
/// The rewrite is crash-safe: survivors go to a sibling `.compact`
/// file, which is fsynced and then renamed over the log in one step.
/// Until that rename commits, the old log is untouched, so a crash at
/// any point leaves one complete log or the other, never a mix.
/// Returns the reopened append handle for the new log.
pub(crate) fn compact(path: &Path, key: &str) -> Result<File> {
    let rewrite_path = sibling_compact_path(path);

    // Step 1: Stream the current log, keeping records for other keys.
    // A record that fails to decode would be silently lost by the
    // rewrite, so any decode error aborts with the old log intact.
    let source = BufReader::new(File::open(path)?);
    let mut survivors = BufWriter::new(File::create(&rewrite_path)?);
    let mut kept: u64 = 0;
    let mut dropped: u64 = 0;

    for event in EventReader::new(source) {
        let event = event?;
        if event.key == key {
            dropped += 1;
            continue;
        }
        survivors.write_all(encode_record(&event).as_bytes())?;
        kept += 1;
    }

    // Step 2: Make the rewrite durable before it replaces anything.
    survivors.flush()?;
    survivors.get_ref().sync_all()?;
    drop(survivors);

    // Step 3: Atomically swap the rewrite into place.
    fs::rename(&rewrite_path, path)?;

    debug!(key, kept, dropped, "compacted transaction log");

    // Step 4: Reopen for appending.
    let file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)?;
    Ok(file)
}

/// `<log path>.compact`, next to the log so the rename never crosses a
/// filesystem boundary
fn sibling_compact_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".compact");
    PathBuf::from(name)
}
