//! Shared test fixtures: a deterministic mock OCR engine and file helpers.
#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use textra::extract::{ExtractError, ExtractorFactory, TextExtractor};

/// The text the mock engine produces for `bytes`.
pub fn mock_text(bytes: &[u8]) -> String {
    format!("ocr:{}", String::from_utf8_lossy(bytes))
}

/// Deterministic engine: echoes the input bytes, counts calls, and fails
/// for any input starting with `FAIL` (stands in for corrupt image data).
pub struct MockEngine {
    calls: Arc<AtomicUsize>,
}

impl TextExtractor for MockEngine {
    fn extract(&mut self, bytes: &[u8], _lang: &str) -> Result<String, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if bytes.starts_with(b"FAIL") {
            return Err(ExtractError::EngineFailure("corrupt image data".into()));
        }
        Ok(mock_text(bytes))
    }
}

/// Factory producing [`MockEngine`]s, with shared counters for how many
/// engines were created and how many extraction calls ran in total.
#[derive(Default)]
pub struct MockFactory {
    pub engines_created: Arc<AtomicUsize>,
    pub extract_calls: Arc<AtomicUsize>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engine(&self) -> MockEngine {
        self.engines_created.fetch_add(1, Ordering::SeqCst);
        MockEngine {
            calls: self.extract_calls.clone(),
        }
    }

    pub fn total_extract_calls(&self) -> usize {
        self.extract_calls.load(Ordering::SeqCst)
    }
}

impl ExtractorFactory for MockFactory {
    fn create(&self) -> Result<Box<dyn TextExtractor>, ExtractError> {
        Ok(Box::new(self.engine()))
    }
}

/// Factory whose engines can never be built (missing backend).
pub struct BrokenFactory;

impl ExtractorFactory for BrokenFactory {
    fn create(&self) -> Result<Box<dyn TextExtractor>, ExtractError> {
        Err(ExtractError::EngineInit("no backend installed".into()))
    }
}

/// Create a file with the given content and return its path.
pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::File::create(&path)
        .unwrap()
        .write_all(content)
        .unwrap();
    path
}
