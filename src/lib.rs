//! textra - batch image-to-text conversion with content-addressed caching.
//!
//! Converts image files to text through an OCR backend while guaranteeing
//! that identical image bytes are extracted at most once, no matter how
//! many paths or worker threads touch that content. The concurrent result
//! cache ([`cache::ResultCache`]) and the cache-or-compute pipeline
//! ([`processor::ProcessingCoordinator`]) are the core; everything else is
//! I/O glue around them.

pub mod cache;
pub mod cli;
pub mod error;
pub mod extract;
pub mod hasher;
pub mod logging;
pub mod processor;
pub mod report;
pub mod scanner;
