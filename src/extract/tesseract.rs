//! Tesseract-backed extraction via the `tesseract` command-line binary.
//!
//! The binary is driven in `stdin`/`stdout` mode, so image bytes never touch
//! a temporary file. Availability is probed once when the factory is built;
//! a missing or broken installation surfaces there instead of failing every
//! file mid-batch.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::{ExtractError, ExtractorFactory, TextExtractor};

/// Factory for [`TesseractCli`] engines.
///
/// Holds the resolved binary path shared by all workers.
#[derive(Debug, Clone)]
pub struct TesseractFactory {
    binary: PathBuf,
}

impl TesseractFactory {
    /// Probe `binary` (e.g. `tesseract`) and build a factory for it.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::EngineInit`] if the binary cannot be executed
    /// or reports a failure for `--version`.
    pub fn new(binary: impl Into<PathBuf>) -> Result<Self, ExtractError> {
        let binary = binary.into();
        let probe = Command::new(&binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| {
                ExtractError::EngineInit(format!("cannot run {}: {e}", binary.display()))
            })?;

        if !probe.success() {
            return Err(ExtractError::EngineInit(format!(
                "{} --version exited with {probe}",
                binary.display()
            )));
        }

        log::debug!("tesseract binary probed at {}", binary.display());
        Ok(Self { binary })
    }

    /// Probe the `tesseract` binary from `PATH`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TesseractFactory::new`].
    pub fn from_path() -> Result<Self, ExtractError> {
        Self::new("tesseract")
    }
}

impl ExtractorFactory for TesseractFactory {
    fn create(&self) -> Result<Box<dyn TextExtractor>, ExtractError> {
        log::debug!("creating tesseract engine for worker thread");
        Ok(Box::new(TesseractCli {
            binary: self.binary.clone(),
        }))
    }
}

/// One Tesseract engine, owned by a single worker thread.
pub struct TesseractCli {
    binary: PathBuf,
}

impl TextExtractor for TesseractCli {
    fn extract(&mut self, bytes: &[u8], lang: &str) -> Result<String, ExtractError> {
        let mut child = Command::new(&self.binary)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(lang)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // stdin handle must be dropped after the write or tesseract waits
        // forever for more input.
        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| ExtractError::EngineFailure("no stdin pipe".into()))?;
            stdin.write_all(bytes)?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::EngineFailure(format!(
                "exit {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
