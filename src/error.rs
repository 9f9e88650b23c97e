//! Error types and process exit codes.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::extract::ExtractError;

/// Errors produced while processing a single file or preparing a batch.
///
/// Per-file variants (`Io`, `Extraction`) are recovered locally: the file is
/// skipped with a log line and the batch continues. `OutputDir` and
/// `InvalidInput` are batch-fatal because no work can proceed without them.
#[derive(Debug, Error)]
pub enum TextraError {
    /// A file could not be read or its output could not be written.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The OCR engine failed on this file's bytes.
    #[error("text extraction failed for {path}: {source}")]
    Extraction {
        path: PathBuf,
        #[source]
        source: ExtractError,
    },

    /// The output root directory could not be created.
    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input path does not exist or is neither a file nor a directory.
    #[error("invalid input path: {path}")]
    InvalidInput { path: PathBuf },
}

impl TextraError {
    /// Shorthand for the `Io` variant.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Shorthand for the `Extraction` variant.
    pub fn extraction(path: impl Into<PathBuf>, source: ExtractError) -> Self {
        Self::Extraction {
            path: path.into(),
            source,
        }
    }
}

/// Exit codes for the textra binary.
///
/// - 0: all queued files converted
/// - 1: unexpected failure (bad input path, output root uncreatable, no engine)
/// - 2: no recognized image files found under the input path
/// - 3: batch finished but some files were skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NoFiles = 2,
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
