//! One cached extraction result per unique content digest.
//!
//! Everything that describes the extraction itself (digest, text, sizes,
//! timestamps) is immutable once the entry is constructed and needs no
//! synchronization. The only thing that mutates after construction is the
//! write-state bookkeeping ("have we already persisted this text, where,
//! when"), and it races: two differently named files with identical bytes
//! can both decide to write the same entry's output. That sub-record sits
//! behind its own `RwLock`, allocated lazily on the first write so entries
//! that are never persisted pay nothing.

use std::path::{Path, PathBuf};
use std::sync::{OnceLock, PoisonError, RwLock};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::hasher::{digest_to_hex, Digest};

/// Mutable write-state of a cache entry.
///
/// The three fields change together under the entry's write lock; readers
/// always observe a consistent triple, never `output_path` set while
/// `written` is still false.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WriteState {
    /// Where the text was persisted, once it was.
    pub output_path: Option<PathBuf>,
    /// When the text was persisted.
    pub write_timestamp: Option<DateTime<Local>>,
    /// Whether the text has been persisted at all.
    pub written: bool,
}

/// Outcome of [`CacheEntry::mark_written_once`].
#[derive(Debug)]
pub enum WriteOutcome {
    /// This call persisted the output.
    Written,
    /// A previous (or concurrently racing) call already persisted it; the
    /// recorded state is returned so the caller can log the original path.
    AlreadyWritten(WriteState),
}

/// An immutable extraction result plus its independently locked write-state.
///
/// Created exactly once per unique content digest, at first-seen-processing
/// time, and inserted into the [`ResultCache`](crate::cache::ResultCache)
/// with insert-if-absent semantics. A racing duplicate that loses the insert
/// is simply dropped.
#[derive(Debug)]
pub struct CacheEntry {
    /// Content digest of the source bytes; the cache key and entry identity.
    pub digest: Digest,
    /// Path of the file that first produced this entry. Informational only:
    /// later duplicate-content files under other paths do not get entries.
    pub source_path: PathBuf,
    /// Extracted text. Immutable once constructed.
    pub text: String,
    /// Size of the source image in bytes.
    pub byte_size: u64,
    /// Size of the extracted text in bytes.
    pub text_size: u64,
    /// When the extraction ran.
    pub processed_at: DateTime<Local>,

    // Lazily allocated on the first write-state mutation.
    write_state: OnceLock<RwLock<WriteState>>,
}

impl CacheEntry {
    /// Build an entry from a finished extraction.
    #[must_use]
    pub fn new(digest: Digest, source_path: PathBuf, text: String, byte_size: u64) -> Self {
        let text_size = text.len() as u64;
        Self {
            digest,
            source_path,
            text,
            byte_size,
            text_size,
            processed_at: Local::now(),
            write_state: OnceLock::new(),
        }
    }

    /// Digest rendered as lowercase hex.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        digest_to_hex(&self.digest)
    }

    /// Final path component of the source file.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_path.to_string_lossy().into_owned())
    }

    fn state(&self) -> &RwLock<WriteState> {
        self.write_state.get_or_init(RwLock::default)
    }

    /// Whether the write-state lock has been allocated yet.
    ///
    /// Entries that were never written report `false`; after the first
    /// [`update_write_info`](Self::update_write_info) or
    /// [`mark_written_once`](Self::mark_written_once) this stays `true`.
    #[must_use]
    pub fn write_lock_allocated(&self) -> bool {
        self.write_state.get().is_some()
    }

    /// Exclusively update all three write-state fields as a group.
    ///
    /// Allocates the write lock on first use.
    pub fn update_write_info(
        &self,
        output_path: PathBuf,
        write_timestamp: DateTime<Local>,
        written: bool,
    ) {
        let mut state = self
            .state()
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        state.output_path = Some(output_path);
        state.write_timestamp = Some(write_timestamp);
        state.written = written;
    }

    /// Read a consistent snapshot of the write-state.
    ///
    /// Lock-free when the lock was never allocated (the entry has never been
    /// written, so the default state is the truth).
    #[must_use]
    pub fn read_write_info(&self) -> WriteState {
        match self.write_state.get() {
            None => WriteState::default(),
            Some(lock) => lock
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    /// Persist this entry's output at most once.
    ///
    /// Takes the entry's exclusive write lock, re-checks `written`, and only
    /// then runs `persist` and records the new state. Racing callers
    /// serialize here: exactly one runs `persist`, the rest get
    /// [`WriteOutcome::AlreadyWritten`] with the winner's recorded state.
    /// The lock is per-entry, so unrelated entries are not serialized.
    ///
    /// # Errors
    ///
    /// Propagates the error from `persist`; the state is left unmarked so a
    /// later attempt can retry.
    pub fn mark_written_once<F>(&self, output_path: &Path, persist: F) -> std::io::Result<WriteOutcome>
    where
        F: FnOnce(&Path) -> std::io::Result<()>,
    {
        let mut state = self
            .state()
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if state.written {
            return Ok(WriteOutcome::AlreadyWritten(state.clone()));
        }

        persist(output_path)?;

        state.output_path = Some(output_path.to_path_buf());
        state.write_timestamp = Some(Local::now());
        state.written = true;
        Ok(WriteOutcome::Written)
    }
}
