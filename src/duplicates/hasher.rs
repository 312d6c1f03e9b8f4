use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::common::errors::Unavailable;

/// Read size used when folding a file into its digest
const CHUNK_SIZE: usize = 64 * 1024;

/// Exact content fingerprint: hex-encoded SHA-256 of the file bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Digest(String);

impl Digest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the exact fingerprint of a file.
///
/// The handle is closed when this returns; any I/O failure is reported as
/// `Unavailable` rather than an error.
pub fn exact_fingerprint(path: &Path) -> Result<Digest, Unavailable> {
    let mut file = File::open(path).map_err(|e| Unavailable::new(path, e))?;
    let mut hasher = Sha256::new();

    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let bytes_read = file.read(&mut buffer).map_err(|e| Unavailable::new(path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(Digest(format!("{:x}", hasher.finalize())))
}
