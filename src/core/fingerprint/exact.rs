//! Byte-exact content fingerprinting.
//!
//! XXH3-64 over the full file content. Large files are memory-mapped,
//! smaller ones go through a read loop.

use super::{Fingerprint, FingerprintKind, Fingerprinter};
use crate::core::scanner::FileEntry;
use crate::error::FingerprintError;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use xxhash_rust::xxh3::{xxh3_64, Xxh3};

/// Minimum file size to use memory-mapped I/O
const MMAP_THRESHOLD: u64 = 1024 * 1024; // 1MB

const READ_BUF_SIZE: usize = 64 * 1024;

/// Fingerprinter hashing the full file content with XXH3-64.
pub struct ExactFingerprinter;

impl ExactFingerprinter {
    pub fn new() -> Self {
        Self
    }

    fn hash_mmap(path: &Path) -> Result<u64, FingerprintError> {
        let file = File::open(path).map_err(|e| FingerprintError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        // Safety: the mapping is read-only and dropped before return;
        // a concurrent writer would at worst change the hash
        let mmap = unsafe {
            memmap2::Mmap::map(&file).map_err(|e| FingerprintError::Io {
                path: path.to_path_buf(),
                source: e,
            })?
        };

        Ok(xxh3_64(&mmap))
    }

    fn hash_streaming(path: &Path) -> Result<u64, FingerprintError> {
        let mut file = File::open(path).map_err(|e| FingerprintError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut hasher = Xxh3::new();
        let mut buffer = [0u8; READ_BUF_SIZE];

        loop {
            let bytes_read = file.read(&mut buffer).map_err(|e| FingerprintError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(hasher.digest())
    }
}

impl Default for ExactFingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Fingerprinter for ExactFingerprinter {
    fn fingerprint(&self, entry: &FileEntry) -> Result<Fingerprint, FingerprintError> {
        let hash = if entry.size >= MMAP_THRESHOLD {
            Self::hash_mmap(&entry.path)?
        } else {
            Self::hash_streaming(&entry.path)?
        };

        Ok(Fingerprint::new(
            hash.to_be_bytes().to_vec(),
            FingerprintKind::Exact,
        ))
    }

    fn kind(&self) -> FingerprintKind {
        FingerprintKind::Exact
    }
}
