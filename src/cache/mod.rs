//! Content-addressed result caching.
//!
//! This is the concurrency-bearing core of textra. It is split into:
//!
//! * [`store`]: the concurrent digest → entry map ([`ResultCache`]) with
//!   insert-if-absent semantics shared by every worker thread.
//! * [`entry`]: the per-result record ([`CacheEntry`]) whose extraction data
//!   is immutable and whose write-state mutates under its own lazily
//!   allocated per-entry lock.
//!
//! The invariants the rest of the crate leans on:
//!
//! * at most one entry per distinct content digest, ever;
//! * an entry appears at some monotonic point and never disappears or
//!   changes key (short of a full [`ResultCache::reset`]);
//! * racing inserts of the same digest resolve to one winner visible to all
//!   threads afterwards;
//! * write-state reads always see a consistent `{path, timestamp, written}`
//!   triple.

pub mod entry;
pub mod store;

pub use entry::{CacheEntry, WriteOutcome, WriteState};
pub use store::{ResultCache, DEFAULT_CAPACITY};
