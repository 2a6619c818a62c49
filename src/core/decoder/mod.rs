//! # Decoder Module
//!
//! Image decoding behind a capability interface.
//!
//! Perceptual fingerprinting depends only on [`ImageDecoder`], never on
//! a specific decoding library, so constrained formats (HEIC in
//! particular) stay isolated in their own implementations.
//!
//! ## Decoders
//! - [`JpegDecoder`] - zune-jpeg, 1.5-2x faster than the image crate
//! - [`HeicDecoder`] - platform conversion for HEIC/HEIF (macOS `sips`)
//! - [`StandardDecoder`] - image crate fallback for everything else

mod heic;
mod jpeg;
mod standard;

pub use heic::HeicDecoder;
pub use jpeg::JpegDecoder;
pub use standard::StandardDecoder;

use super::scanner::ImageFormat;
use crate::error::FingerprintError;
use image::DynamicImage;
use std::path::Path;

/// Capability interface for image decoding.
///
/// One implementation per supported format family. A decoder that
/// cannot handle a file returns an error; the registry then tries the
/// next decoder claiming the format.
pub trait ImageDecoder: Send + Sync {
    /// Whether this decoder claims the given format
    fn supports(&self, format: ImageFormat) -> bool;

    /// Decode the file into pixels
    fn decode(&self, path: &Path) -> Result<DynamicImage, FingerprintError>;
}

/// Ordered collection of decoders with per-format dispatch.
pub struct DecoderRegistry {
    decoders: Vec<Box<dyn ImageDecoder>>,
}

impl DecoderRegistry {
    /// Create a registry with the default decoder set.
    ///
    /// Order matters: format-specific decoders come first, the image
    /// crate fallback last.
    pub fn with_default_decoders() -> Self {
        Self {
            decoders: vec![
                Box::new(JpegDecoder),
                Box::new(HeicDecoder),
                Box::new(StandardDecoder),
            ],
        }
    }

    /// Decode a file, trying every decoder that claims its format.
    ///
    /// Returns the last decoder's error if all of them fail, or an
    /// unsupported-format error if none claims the format.
    pub fn decode(
        &self,
        path: &Path,
        format: ImageFormat,
    ) -> Result<DynamicImage, FingerprintError> {
        let mut last_error = None;

        for decoder in &self.decoders {
            if !decoder.supports(format) {
                continue;
            }
            match decoder.decode(path) {
                Ok(image) => return Ok(image),
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| FingerprintError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: format.to_string(),
        }))
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::with_default_decoders()
    }
}
