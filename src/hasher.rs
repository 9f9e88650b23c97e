//! Content fingerprinting with BLAKE3.
//!
//! The digest of an image's raw bytes is its identity in the result cache:
//! two files with identical bytes hash to the same digest regardless of
//! path or filename, which is the correctness basis for deduplication.
//! Collision probability at 256 bits is treated as negligible.

use std::fs;
use std::io;
use std::path::Path;

/// A 256-bit BLAKE3 content digest.
pub type Digest = [u8; 32];

/// Compute the digest of an in-memory byte buffer.
///
/// Deterministic and pure: the same bytes always produce the same digest.
#[must_use]
pub fn hash_bytes(data: &[u8]) -> Digest {
    *blake3::hash(data).as_bytes()
}

/// Compute the digest of a file's contents.
///
/// # Errors
///
/// Returns the underlying I/O error if the file cannot be read.
pub fn hash_file(path: &Path) -> io::Result<Digest> {
    let data = fs::read(path)?;
    Ok(hash_bytes(&data))
}

/// Render a digest as a lowercase hex string (64 characters).
#[must_use]
pub fn digest_to_hex(digest: &Digest) -> String {
    let mut hex = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}
