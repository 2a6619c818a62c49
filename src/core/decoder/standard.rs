//! Fallback decoding through the image crate.

use super::ImageDecoder;
use crate::core::scanner::ImageFormat;
use crate::error::FingerprintError;
use image::DynamicImage;
use std::path::Path;

/// Decoder for every format the image crate handles natively.
///
/// Also acts as the fallback when a format-specific decoder fails,
/// so it claims JPEG as well.
pub struct StandardDecoder;

impl ImageDecoder for StandardDecoder {
    fn supports(&self, format: ImageFormat) -> bool {
        // HEIC needs platform conversion; everything else the image
        // crate can at least attempt
        !matches!(format, ImageFormat::Heic | ImageFormat::Unknown)
    }

    fn decode(&self, path: &Path) -> Result<DynamicImage, FingerprintError> {
        image::open(path).map_err(|e| FingerprintError::DecodeFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
