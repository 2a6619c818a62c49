//! Perceptual fingerprinting.
//!
//! Decodes the image through the [`DecoderRegistry`] and hashes the
//! pixels with a gradient-based perceptual hash from the image_hasher
//! crate. Byte-level differences from re-encoding disappear; copies of
//! the same picture land on the same fingerprint.

use super::{Fingerprint, FingerprintKind, Fingerprinter};
use crate::core::decoder::DecoderRegistry;
use crate::core::scanner::FileEntry;
use crate::error::FingerprintError;
use image_hasher::{HashAlg, HasherConfig};

/// Hash grid edge length; 16x16 = 256 bits per fingerprint.
///
/// Grouping is by equality, so the hash must be wide enough that
/// unrelated images essentially never collide.
const HASH_SIZE: u32 = 16;

/// Fingerprinter hashing decoded pixels with a perceptual hash.
pub struct PerceptualFingerprinter {
    decoders: DecoderRegistry,
    hasher: image_hasher::Hasher,
}

impl PerceptualFingerprinter {
    pub fn new() -> Self {
        let hasher = HasherConfig::new()
            .hash_size(HASH_SIZE, HASH_SIZE)
            .hash_alg(HashAlg::DoubleGradient)
            .to_hasher();

        Self {
            decoders: DecoderRegistry::with_default_decoders(),
            hasher,
        }
    }
}

impl Default for PerceptualFingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Fingerprinter for PerceptualFingerprinter {
    fn fingerprint(&self, entry: &FileEntry) -> Result<Fingerprint, FingerprintError> {
        let image = self.decoders.decode(&entry.path, entry.format)?;
        let hash = self.hasher.hash_image(&image);

        Ok(Fingerprint::new(
            hash.as_bytes().to_vec(),
            FingerprintKind::Perceptual,
        ))
    }

    fn kind(&self) -> FingerprintKind {
        FingerprintKind::Perceptual
    }
}
