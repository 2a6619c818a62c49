//! # Fingerprint Module
//!
//! Computes a comparable fingerprint per file. Two files are
//! duplicates exactly when their fingerprints are equal.
//!
//! ## Methods
//! - **Exact** (default) - XXH3-64 over the full file content.
//!   Byte-identical files, and only those, share a fingerprint.
//! - **Perceptual** - decode the image, then a gradient-based
//!   perceptual hash. Re-encoded copies of the same picture share a
//!   fingerprint even when their bytes differ.
//!
//! Fingerprints carry the kind that produced them; values from
//! different kinds never compare equal.

mod exact;
mod perceptual;

pub use exact::ExactFingerprinter;
pub use perceptual::PerceptualFingerprinter;

use crate::core::scanner::FileEntry;
use crate::error::FingerprintError;
use serde::{Deserialize, Serialize};

/// Available fingerprinting methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FingerprintKind {
    /// Byte-exact content hash
    Exact,
    /// Perceptual image hash
    Perceptual,
}

impl std::fmt::Display for FingerprintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FingerprintKind::Exact => write!(f, "exact"),
            FingerprintKind::Perceptual => write!(f, "perceptual"),
        }
    }
}

/// A computed fingerprint.
///
/// Equality (and hashing) covers both the bytes and the kind, so a
/// perceptual hash can never collide with an exact hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    bytes: Vec<u8>,
    kind: FingerprintKind,
}

impl Fingerprint {
    /// Create a new fingerprint value
    pub fn new(bytes: Vec<u8>, kind: FingerprintKind) -> Self {
        Self { bytes, kind }
    }

    /// The kind that produced this fingerprint
    pub fn kind(&self) -> FingerprintKind {
        self.kind
    }

    /// Raw fingerprint bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hexadecimal rendering, used as the group identifier in output
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Trait for fingerprint computation
pub trait Fingerprinter: Send + Sync {
    /// Compute the fingerprint for one file
    fn fingerprint(&self, entry: &FileEntry) -> Result<Fingerprint, FingerprintError>;

    /// The kind this fingerprinter produces
    fn kind(&self) -> FingerprintKind;
}

/// Build a fingerprinter for the requested kind
pub fn build_fingerprinter(kind: FingerprintKind) -> Box<dyn Fingerprinter> {
    match kind {
        FingerprintKind::Exact => Box::new(ExactFingerprinter::new()),
        FingerprintKind::Perceptual => Box::new(PerceptualFingerprinter::new()),
    }
}
