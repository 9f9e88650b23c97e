//! Human-readable and JSON dumps of the result cache.
//!
//! Built entirely on the cache's iteration snapshot; the core never formats
//! anything itself.

use std::path::PathBuf;
use std::sync::Arc;

use bytesize::ByteSize;
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::cache::CacheEntry;
use crate::processor::ProcessingCoordinator;

/// Serializable snapshot of one cache entry, write-state included.
#[derive(Debug, Serialize)]
pub struct EntryReport {
    pub digest: String,
    pub path: PathBuf,
    pub image_size: u64,
    pub text_size: u64,
    pub processed_at: DateTime<Local>,
    pub output_path: Option<PathBuf>,
    pub output_written: bool,
    pub write_timestamp: Option<DateTime<Local>>,
}

impl EntryReport {
    /// Snapshot an entry together with a consistent view of its write-state.
    #[must_use]
    pub fn from_entry(entry: &CacheEntry) -> Self {
        let info = entry.read_write_info();
        Self {
            digest: entry.digest_hex(),
            path: entry.source_path.clone(),
            image_size: entry.byte_size,
            text_size: entry.text_size,
            processed_at: entry.processed_at,
            output_path: info.output_path,
            output_written: info.written,
            write_timestamp: info.write_timestamp,
        }
    }
}

/// Snapshot every cache entry for reporting.
#[must_use]
pub fn snapshot(coordinator: &ProcessingCoordinator) -> Vec<EntryReport> {
    let mut entries: Vec<EntryReport> = coordinator
        .cache()
        .entries()
        .iter()
        .map(|entry: &Arc<CacheEntry>| EntryReport::from_entry(entry))
        .collect();
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    entries
}

/// Render the processing results as a human-readable block.
#[must_use]
pub fn render_human(coordinator: &ProcessingCoordinator) -> String {
    use std::fmt::Write;

    let entries = snapshot(coordinator);
    let mut out = String::new();
    let _ = writeln!(out, "textra processing results");
    let _ = writeln!(
        out,
        "{} unique images, {} files processed, avg latency {:.1} ms",
        entries.len(),
        coordinator.processed_count(),
        coordinator.average_latency_ms()
    );

    for entry in &entries {
        let _ = writeln!(out, "----------------------------------------");
        let _ = writeln!(out, "Digest:          {}", entry.digest);
        let _ = writeln!(out, "Path:            {}", entry.path.display());
        let _ = writeln!(out, "Image Size:      {}", ByteSize(entry.image_size));
        let _ = writeln!(out, "Text Size:       {}", ByteSize(entry.text_size));
        let _ = writeln!(
            out,
            "Processed At:    {}",
            entry.processed_at.format("%Y-%m-%d %H:%M:%S")
        );
        let _ = writeln!(
            out,
            "Output Path:     {}",
            entry
                .output_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string())
        );
        let _ = writeln!(
            out,
            "Output Written:  {}",
            if entry.output_written { "yes" } else { "no" }
        );
        if let Some(at) = entry.write_timestamp {
            let _ = writeln!(out, "Write Timestamp: {}", at.format("%Y-%m-%d %H:%M:%S"));
        }
    }
    out
}

/// Render the processing results as pretty-printed JSON.
///
/// # Errors
///
/// Propagates serialization failures (not expected for these types).
pub fn render_json(coordinator: &ProcessingCoordinator) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&snapshot(coordinator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ExtractError, TextExtractor};
    use std::io::Write;

    struct FixedText;

    impl TextExtractor for FixedText {
        fn extract(&mut self, _bytes: &[u8], _lang: &str) -> Result<String, ExtractError> {
            Ok("hello".to_string())
        }
    }

    #[test]
    fn report_includes_digest_and_write_state() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("scan.png");
        std::fs::File::create(&img).unwrap().write_all(b"px").unwrap();

        let coordinator = ProcessingCoordinator::with_defaults();
        let mut extractor = FixedText;
        coordinator
            .convert_file_to_text_output(&img, Some(dir.path()), &mut extractor)
            .unwrap();

        let entries = snapshot(&coordinator);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].digest.len(), 64);
        assert!(entries[0].output_written);

        let human = render_human(&coordinator);
        assert!(human.contains("scan.png"));
        assert!(human.contains("Output Written:  yes"));

        let json = render_json(&coordinator).unwrap();
        assert!(json.contains("\"output_written\": true"));
    }
}
