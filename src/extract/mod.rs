//! The text-extraction seam.
//!
//! OCR is an external capability: the coordinator hands an engine raw image
//! bytes and gets text back, and nothing in the cache or pipeline depends on
//! which backend sits behind the [`TextExtractor`] trait.
//!
//! Engines are expensive to initialize and are not safe to share between
//! threads, so the batch driver creates **one engine per worker thread**
//! through an [`ExtractorFactory`], lazily on the worker's first file, and
//! drops it when the parallel region ends. Per-file engine creation was the
//! slow path in the measured workloads; per-thread reuse is the supported
//! lifecycle.

pub mod tesseract;

use thiserror::Error;

pub use tesseract::{TesseractCli, TesseractFactory};

/// Default Tesseract language code.
pub const DEFAULT_LANG: &str = "eng";

/// Errors from engine construction or a single extraction call.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The engine could not be initialized (missing binary, bad language pack).
    #[error("OCR engine initialization failed: {0}")]
    EngineInit(String),

    /// The engine rejected this input (corrupt image data, internal failure).
    #[error("OCR engine failed: {0}")]
    EngineFailure(String),

    /// I/O toward the engine failed.
    #[error("OCR engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A text-extraction engine bound to a single worker thread.
///
/// `extract` may block for a long time; callers must expect unbounded
/// latency. Implementations keep whatever per-engine state they need between
/// calls (`&mut self`), which is why an instance must never be shared across
/// threads.
pub trait TextExtractor: Send {
    /// Extract text from raw image bytes.
    ///
    /// # Errors
    ///
    /// Fails on corrupt image data or an engine-internal error. The caller
    /// treats this as a per-file failure, never as batch-fatal.
    fn extract(&mut self, bytes: &[u8], lang: &str) -> Result<String, ExtractError>;
}

/// Creates per-worker-thread [`TextExtractor`] instances.
///
/// The factory itself is shared across the pool; only the engines it creates
/// are thread-bound.
pub trait ExtractorFactory: Send + Sync {
    /// Create a fresh engine for the calling worker thread.
    ///
    /// # Errors
    ///
    /// Fails if the backend is unavailable. The driver logs this and the
    /// worker skips its share of the batch.
    fn create(&self) -> Result<Box<dyn TextExtractor>, ExtractError>;
}
