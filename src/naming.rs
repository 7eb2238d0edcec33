//! Content hashing and object naming
//!
//! Objects are named by the SHA-256 hash of their bytes so identical content
//! always maps to the same remote name: `<prefix><hex digest><extension>`.
//! The extension is taken from the source file, never invented.

use crate::Result;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read size for streaming hashes; files never need to fit in memory.
const HASH_CHUNK_SIZE: usize = 16 * 1024;

/// Hex-encoded SHA-256 of a file's contents, streamed in fixed-size chunks.
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; HASH_CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Derive the remote object name for a digest.
///
/// Pure function: `prefix + digest + extension(source)`. The extension
/// includes its leading dot; extensionless sources produce bare digests.
pub fn object_name(prefix: &str, digest: &str, source: &Path) -> String {
    let extension = source
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    format!("{}{}{}", prefix, digest, extension)
}
