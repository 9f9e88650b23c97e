//! Command-line interface and application entry logic.
//!
//! The CLI is thin glue around [`ProcessingCoordinator`]: it resolves the
//! input into a work list, builds the extractor factory, drains the batch
//! and optionally prints the cache report. Per-file failures surface as log
//! lines and the partial-success exit code, never as errors bubbling out of
//! the batch.
//!
//! ```bash
//! # Convert every image under scans/ into out/
//! textra scans/ -o out/
//!
//! # Single image straight to stdout
//! textra receipt.png
//!
//! # German corpus on half the cores, with a JSON report
//! textra scans/ -o out/ --lang deu --cores half --json
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;

use crate::error::ExitCode;
use crate::extract::{ExtractorFactory, TesseractFactory};
use crate::processor::{CoreAllocation, ProcessingCoordinator, ProcessorConfig};
use crate::report;
use crate::scanner::collect_image_files;

/// Batch image-to-text converter with a content-addressed OCR cache.
///
/// Files with identical image bytes are extracted once, no matter how many
/// paths point at that content.
#[derive(Debug, Parser)]
#[command(name = "textra")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Image file or directory to convert
    #[arg(value_name = "PATH")]
    pub input: PathBuf,

    /// Output directory for .txt files (default: alongside each input;
    /// for a single file without this flag, text goes to stdout)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Tesseract language code (e.g. eng, deu, fra)
    #[arg(short, long, default_value = "eng")]
    pub lang: String,

    /// Worker threads: single, half, max, or an explicit count
    #[arg(short, long, default_value = "max", value_parser = CoreAllocation::from_str)]
    pub cores: CoreAllocation,

    /// Expected number of distinct images (pre-sizes the result cache)
    #[arg(long, default_value_t = 1000, value_name = "N")]
    pub capacity: usize,

    /// Print a per-entry cache report after the batch
    #[arg(long)]
    pub report: bool,

    /// Print the cache report as JSON
    #[arg(long, conflicts_with = "report")]
    pub json: bool,

    /// Path to the tesseract binary (default: resolved from PATH)
    #[arg(long, value_name = "BIN", env = "TEXTRA_TESSERACT")]
    pub tesseract: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Run the application against parsed arguments.
///
/// # Errors
///
/// Only batch-fatal conditions: invalid input path, no OCR engine,
/// uncreatable output root.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let files = collect_image_files(&cli.input)?;
    if files.is_empty() {
        log::warn!("no image files found under {}", cli.input.display());
        return Ok(ExitCode::NoFiles);
    }

    let factory = match &cli.tesseract {
        Some(bin) => TesseractFactory::new(bin.clone()),
        None => TesseractFactory::from_path(),
    }
    .context("no usable OCR engine")?;

    let config = ProcessorConfig::default()
        .with_capacity(cli.capacity)
        .with_cores(cli.cores)
        .with_lang(&cli.lang);
    let mut coordinator = ProcessingCoordinator::new(config);

    // Single file, no output directory: print the text instead of writing.
    if cli.input.is_file() && cli.output_dir.is_none() && !cli.report && !cli.json {
        let mut engine = factory.create().context("no usable OCR engine")?;
        return Ok(match coordinator.image_text(&cli.input, engine.as_mut()) {
            Some(text) => {
                println!("{text}");
                ExitCode::Success
            }
            None => ExitCode::GeneralError,
        });
    }

    let queued = coordinator.add_files(files);
    log::info!("queued {queued} image files from {}", cli.input.display());

    let stats = coordinator.convert_batch(cli.output_dir.as_deref(), &factory)?;
    log::info!(
        "{} written, {} already written, {} failed, avg latency {:.1} ms",
        stats.written,
        stats.already_written,
        stats.failed,
        coordinator.average_latency_ms()
    );

    if cli.json {
        println!("{}", report::render_json(&coordinator)?);
    } else if cli.report {
        println!("{}", report::render_human(&coordinator));
    }

    Ok(if stats.all_succeeded() {
        ExitCode::Success
    } else {
        ExitCode::PartialSuccess
    })
}
