//! Prefilters for exact-mode fingerprinting.
//!
//! Files that cannot be byte-identical to any other file are dropped
//! before full-content hashing:
//!
//! 1. **Size filter**: a file with a unique size has no duplicate.
//! 2. **Prefix filter**: a file whose first 4KB hash differently from
//!    every other file has no duplicate. Roughly 100x cheaper than
//!    hashing full content.
//!
//! Both filters are only valid for byte-exact fingerprints; perceptual
//! duplicates can differ in size and bytes.

use crate::core::scanner::FileEntry;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use xxhash_rust::xxh3::xxh3_64;

/// Size of prefix to hash for preliminary filtering (4KB)
const PREFIX_SIZE: usize = 4096;

/// Minimum candidate count to bother with the prefix pass
const PREFIX_FILTER_THRESHOLD: usize = 50;

/// Result of the prefilter phase
#[derive(Debug)]
pub struct PrefilterResult {
    /// Files that still need full fingerprinting
    pub candidates: Vec<FileEntry>,
    /// Files dropped for having a unique size
    pub skipped_unique_size: usize,
    /// Files dropped for having a unique prefix hash
    pub skipped_unique_prefix: usize,
}

/// Drop files that cannot be byte-identical to any other file.
pub fn prefilter(entries: Vec<FileEntry>) -> PrefilterResult {
    let (candidates, skipped_unique_size) = filter_by_size(entries);

    let (candidates, skipped_unique_prefix) = if candidates.len() > PREFIX_FILTER_THRESHOLD {
        filter_by_prefix(candidates)
    } else {
        (candidates, 0)
    };

    PrefilterResult {
        candidates,
        skipped_unique_size,
        skipped_unique_prefix,
    }
}

/// Keep only files whose size is shared with at least one other file.
fn filter_by_size(entries: Vec<FileEntry>) -> (Vec<FileEntry>, usize) {
    let mut size_counts: HashMap<u64, usize> = HashMap::new();
    for entry in &entries {
        *size_counts.entry(entry.size).or_default() += 1;
    }

    let total = entries.len();
    let candidates: Vec<FileEntry> = entries
        .into_iter()
        .filter(|entry| size_counts[&entry.size] >= 2)
        .collect();

    let skipped = total - candidates.len();
    (candidates, skipped)
}

/// Keep only files whose first-4KB hash is shared with another file.
///
/// Files that fail to read here are kept; full fingerprinting will
/// surface the error as a proper warning.
fn filter_by_prefix(entries: Vec<FileEntry>) -> (Vec<FileEntry>, usize) {
    let prefix_hashes: Vec<Option<u64>> = entries
        .par_iter()
        .map(|entry| compute_prefix_hash(&entry.path))
        .collect();

    let mut prefix_counts: HashMap<u64, usize> = HashMap::new();
    for hash in prefix_hashes.iter().flatten() {
        *prefix_counts.entry(*hash).or_default() += 1;
    }

    let keep: HashSet<usize> = prefix_hashes
        .iter()
        .enumerate()
        .filter(|(_, hash)| match hash {
            Some(h) => prefix_counts[h] >= 2,
            None => true,
        })
        .map(|(i, _)| i)
        .collect();

    let total = entries.len();
    let candidates: Vec<FileEntry> = entries
        .into_iter()
        .enumerate()
        .filter(|(i, _)| keep.contains(i))
        .map(|(_, entry)| entry)
        .collect();

    let skipped = total - candidates.len();
    (candidates, skipped)
}

/// Fast hash of the first 4KB of a file.
fn compute_prefix_hash(path: &PathBuf) -> Option<u64> {
    let mut file = File::open(path).ok()?;
    let mut buffer = [0u8; PREFIX_SIZE];
    let bytes_read = file.read(&mut buffer).ok()?;
    Some(xxh3_64(&buffer[..bytes_read]))
}
