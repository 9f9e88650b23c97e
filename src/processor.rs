//! The cache-or-compute coordinator.
//!
//! # Overview
//!
//! [`ProcessingCoordinator`] owns the per-file pipeline: read bytes → hash →
//! probe the [`ResultCache`] → on a hit reuse the entry (the OCR engine is
//! never invoked twice for the same content, regardless of path or
//! filename) → on a miss run the extractor and publish the entry with
//! insert-if-absent semantics.
//!
//! # Concurrency
//!
//! Enqueueing (`add_files`) is single-threaded and takes `&mut self`;
//! draining (`convert_batch`) fans the queued paths out over a rayon pool
//! and only needs `&self` inside the parallel region. That split is what
//! lets the seen-set and FIFO queue stay lock-free. The result cache is the
//! only structure mutated by every worker.
//!
//! Two workers racing on a never-before-seen digest may both run the
//! (expensive) extraction; the insert resolves to a single winner and the
//! duplicate result is dropped. Duplicate work, never corruption.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use crate::cache::{CacheEntry, ResultCache, WriteOutcome, DEFAULT_CAPACITY};
use crate::error::TextraError;
use crate::extract::{ExtractorFactory, TextExtractor, DEFAULT_LANG};
use crate::hasher::hash_bytes;
use crate::scanner::{is_image_file, qualified_output_path};

/// How many worker threads the batch drain uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreAllocation {
    /// One worker thread.
    Single,
    /// Half the available cores (at least one).
    Half,
    /// All available cores.
    Max,
    /// An explicit count, capped at the available cores.
    Fixed(usize),
}

impl CoreAllocation {
    /// Resolve the policy against the machine's available parallelism.
    #[must_use]
    pub fn resolve(self) -> usize {
        let available = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1);
        match self {
            Self::Single => 1,
            Self::Half => (available / 2).max(1),
            Self::Max => available,
            Self::Fixed(n) => n.clamp(1, available),
        }
    }
}

impl FromStr for CoreAllocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "half" => Ok(Self::Half),
            "max" => Ok(Self::Max),
            other => other
                .parse::<usize>()
                .map(Self::Fixed)
                .map_err(|_| format!("expected 'single', 'half', 'max' or a number, got '{s}'")),
        }
    }
}

/// Coordinator configuration.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Expected number of distinct images; pre-sizes the result cache.
    pub capacity: usize,
    /// Worker pool sizing policy for batch drains.
    pub cores: CoreAllocation,
    /// Tesseract language code passed to the extractor.
    pub lang: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            cores: CoreAllocation::Max,
            lang: DEFAULT_LANG.to_string(),
        }
    }
}

impl ProcessorConfig {
    /// Set the cache capacity.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the worker pool policy.
    #[must_use]
    pub fn with_cores(mut self, cores: CoreAllocation) -> Self {
        self.cores = cores;
        self
    }

    /// Set the extraction language.
    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }
}

/// Outcome of converting one file to a text output.
#[derive(Debug)]
pub enum ConvertOutcome {
    /// This call persisted the entry's text.
    Written(Arc<CacheEntry>),
    /// The entry's text was already persisted earlier (first writer wins);
    /// the request was logged and not honored.
    AlreadyWritten(Arc<CacheEntry>),
}

/// Statistics from one batch drain.
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    /// Paths taken off the queue for this drain.
    pub queued: usize,
    /// Files whose text was written by this drain.
    pub written: u64,
    /// Files whose content was already persisted (no-op, logged).
    pub already_written: u64,
    /// Files skipped after an I/O or extraction failure.
    pub failed: u64,
}

impl BatchStats {
    /// Whether every queued file produced (or already had) an output.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Orchestrates hashing, cache probing, extraction and output writing.
#[derive(Debug)]
pub struct ProcessingCoordinator {
    config: ProcessorConfig,
    cache: ResultCache,
    // Mutated only during single-threaded enqueue, never inside the
    // parallel drain.
    seen: HashSet<PathBuf>,
    queued: Vec<PathBuf>,
    // Running totals shared by every worker. Time is f64 milliseconds
    // stored as bits; see `record_timing`.
    total_time_bits: AtomicU64,
    processed_count: AtomicU64,
}

impl ProcessingCoordinator {
    /// Create a coordinator with the given configuration.
    #[must_use]
    pub fn new(config: ProcessorConfig) -> Self {
        let cache = ResultCache::with_capacity(config.capacity);
        Self {
            config,
            cache,
            seen: HashSet::new(),
            queued: Vec::new(),
            total_time_bits: AtomicU64::new(0.0_f64.to_bits()),
            processed_count: AtomicU64::new(0),
        }
    }

    /// Create a coordinator with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ProcessorConfig::default())
    }

    /// The underlying result cache, exposed for reporting and inspection.
    #[must_use]
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Replace the result cache with an empty one pre-sized for
    /// `new_capacity`.
    pub fn reset_cache(&self, new_capacity: usize) {
        self.cache.reset(new_capacity);
    }

    /// Queue files for the next batch drain.
    ///
    /// Non-image paths are ignored; paths already queued once are not
    /// queued again (path-level dedup, distinct from the content-level
    /// dedup the cache performs). Returns how many paths were added.
    pub fn add_files<I>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut added = 0;
        for path in paths {
            if !is_image_file(&path) {
                log::debug!("ignoring non-image path {}", path.display());
                continue;
            }
            if self.seen.insert(path.clone()) {
                self.queued.push(path);
                added += 1;
            }
        }
        added
    }

    /// Number of paths waiting for the next drain.
    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// Process one file through the cache-or-compute pipeline.
    ///
    /// On a cache hit the extractor is not invoked at all; this is the core
    /// performance guarantee. On a miss the extraction runs *without* any
    /// lock held, so two threads may race on the same new content; the
    /// entry returned is whichever one won the insert.
    ///
    /// # Errors
    ///
    /// Per-file I/O or extraction failures. Callers in the batch path log
    /// these and continue; they are never batch-fatal.
    pub fn process_file(
        &self,
        path: &Path,
        extractor: &mut dyn TextExtractor,
    ) -> Result<Arc<CacheEntry>, TextraError> {
        let start = Instant::now();

        let data = fs::read(path).map_err(|e| TextraError::io(path, e))?;
        let digest = hash_bytes(&data);

        if let Some(hit) = self.cache.find(&digest) {
            self.record_timing(start);
            log::info!("cache hit: {}", path.display());
            return Ok(hit);
        }

        let text = extractor
            .extract(&data, &self.config.lang)
            .map_err(|e| TextraError::extraction(path, e))?;

        let entry = CacheEntry::new(digest, path.to_path_buf(), text, data.len() as u64);
        let stored = self.cache.insert_if_absent(entry);
        self.record_timing(start);
        Ok(stored)
    }

    /// Extracted text for one file, or `None` after a logged failure.
    pub fn image_text(&self, path: &Path, extractor: &mut dyn TextExtractor) -> Option<String> {
        match self.process_file(path, extractor) {
            Ok(entry) => Some(entry.text.clone()),
            Err(e) => {
                log::error!("{e}");
                None
            }
        }
    }

    /// Convert one file and persist its text, first writer wins.
    ///
    /// If the entry's content was already written, the original recorded
    /// output path is logged and the current request — even one naming a
    /// different output directory — is not honored. The check and write are
    /// serialized by the entry's own lock, so racing callers produce
    /// exactly one output file.
    ///
    /// # Errors
    ///
    /// Per-file processing or output-write failures; logged and skipped by
    /// the batch path.
    pub fn convert_file_to_text_output(
        &self,
        path: &Path,
        output_dir: Option<&Path>,
        extractor: &mut dyn TextExtractor,
    ) -> Result<ConvertOutcome, TextraError> {
        let entry = self.process_file(path, extractor)?;

        // Fast path without allocating the entry's write lock.
        let info = entry.read_write_info();
        if info.written {
            log_already_written(&entry.file_name(), &info);
            return Ok(ConvertOutcome::AlreadyWritten(entry));
        }

        let out_path = qualified_output_path(path, output_dir);
        let outcome = entry
            .mark_written_once(&out_path, |p| fs::write(p, &entry.text))
            .map_err(|e| TextraError::io(out_path.clone(), e))?;

        match outcome {
            WriteOutcome::Written => {
                log::info!("wrote {}", out_path.display());
                Ok(ConvertOutcome::Written(entry))
            }
            WriteOutcome::AlreadyWritten(state) => {
                log_already_written(&entry.file_name(), &state);
                Ok(ConvertOutcome::AlreadyWritten(entry))
            }
        }
    }

    /// Drain the queue: parallel-for over the queued paths, one extractor
    /// per worker thread, queue cleared after the region completes.
    ///
    /// Each worker creates its engine lazily on its first file and reuses
    /// it for every file it processes; engines are dropped when the
    /// parallel region ends. A worker whose engine cannot be created logs
    /// the failure and skips its share.
    ///
    /// # Errors
    ///
    /// Only an uncreatable output root is batch-fatal. Per-file failures
    /// are logged and counted in the returned [`BatchStats`].
    pub fn convert_batch(
        &mut self,
        output_dir: Option<&Path>,
        factory: &dyn ExtractorFactory,
    ) -> Result<BatchStats, TextraError> {
        if let Some(dir) = output_dir {
            fs::create_dir_all(dir).map_err(|e| TextraError::OutputDir {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        if self.queued.is_empty() {
            log::info!("all files already processed");
            return Ok(BatchStats::default());
        }

        let threads = self.config.cores.resolve();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap_or_else(|_| rayon::ThreadPoolBuilder::new().build().unwrap());
        log::debug!("draining {} queued files on {threads} threads", self.queued.len());

        let written = AtomicU64::new(0);
        let already = AtomicU64::new(0);
        let failed = AtomicU64::new(0);

        let this: &Self = self;
        pool.install(|| {
            this.queued.par_iter().for_each_init(
                || {
                    factory
                        .create()
                        .map_err(|e| log::error!("worker has no OCR engine: {e}"))
                        .ok()
                },
                |engine, path| {
                    let Some(engine) = engine.as_mut() else {
                        failed.fetch_add(1, Ordering::Relaxed);
                        return;
                    };
                    match this.convert_file_to_text_output(path, output_dir, engine.as_mut()) {
                        Ok(ConvertOutcome::Written(_)) => {
                            written.fetch_add(1, Ordering::Relaxed);
                        }
                        Ok(ConvertOutcome::AlreadyWritten(_)) => {
                            already.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            log::error!("{e}");
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                },
            );
        });

        let stats = BatchStats {
            queued: self.queued.len(),
            written: written.into_inner(),
            already_written: already.into_inner(),
            failed: failed.into_inner(),
        };

        // Clear happens-after every iteration: the parallel region is a
        // barrier.
        self.queued.clear();
        Ok(stats)
    }

    /// Total files recorded through the timing counters.
    #[must_use]
    pub fn processed_count(&self) -> u64 {
        self.processed_count.load(Ordering::Relaxed)
    }

    /// Average per-file processing latency in milliseconds.
    ///
    /// Returns 0.0 when nothing has been processed yet (documented
    /// sentinel for the empty case).
    #[must_use]
    pub fn average_latency_ms(&self) -> f64 {
        let count = self.processed_count.load(Ordering::Relaxed);
        if count == 0 {
            return 0.0;
        }
        f64::from_bits(self.total_time_bits.load(Ordering::Relaxed)) / count as f64
    }

    // Lock-free running sum: load, add, retry the compare-exchange until it
    // lands. The count is incremented unconditionally alongside.
    fn record_timing(&self, start: Instant) {
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        self.processed_count.fetch_add(1, Ordering::SeqCst);

        let mut current = self.total_time_bits.load(Ordering::Relaxed);
        loop {
            let new = f64::from_bits(current) + elapsed_ms;
            match self.total_time_bits.compare_exchange_weak(
                current,
                new.to_bits(),
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }
}

fn log_already_written(name: &str, state: &crate::cache::WriteState) {
    let path = state
        .output_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let at = state
        .write_timestamp
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();
    log::warn!("{name} already processed and written to {path} at {at}");
}
