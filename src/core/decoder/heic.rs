//! HEIC/HEIF decoding via platform conversion.
//!
//! There is no mature pure-Rust HEIC decoder, so on macOS the file is
//! converted to JPEG with the system `sips` tool and read back. On
//! other platforms HEIC files are reported as undecodable and the
//! pipeline skips them with a warning.

use super::ImageDecoder;
use crate::core::scanner::ImageFormat;
use crate::error::FingerprintError;
use image::DynamicImage;
use std::path::Path;

/// HEIC decoder using macOS `sips` conversion through a temp file.
pub struct HeicDecoder;

impl ImageDecoder for HeicDecoder {
    fn supports(&self, format: ImageFormat) -> bool {
        format == ImageFormat::Heic
    }

    #[cfg(target_os = "macos")]
    fn decode(&self, path: &Path) -> Result<DynamicImage, FingerprintError> {
        use std::process::Command;

        let scratch = tempfile::Builder::new()
            .prefix("imagedupe_heic_")
            .suffix(".jpg")
            .tempfile()
            .map_err(|e| FingerprintError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        let output = Command::new("sips")
            .args([
                "-s",
                "format",
                "jpeg",
                path.to_str().unwrap_or_default(),
                "--out",
                scratch.path().to_str().unwrap_or_default(),
            ])
            .output()
            .map_err(|e| FingerprintError::DecodeFailed {
                path: path.to_path_buf(),
                reason: format!("Failed to run sips: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FingerprintError::DecodeFailed {
                path: path.to_path_buf(),
                reason: format!("sips conversion failed: {}", stderr),
            });
        }

        // The scratch file cleans itself up when dropped
        image::open(scratch.path()).map_err(|e| FingerprintError::DecodeFailed {
            path: path.to_path_buf(),
            reason: format!("Failed to read converted HEIC: {}", e),
        })
    }

    #[cfg(not(target_os = "macos"))]
    fn decode(&self, path: &Path) -> Result<DynamicImage, FingerprintError> {
        Err(FingerprintError::DecodeFailed {
            path: path.to_path_buf(),
            reason: "HEIC decoding is only supported on macOS".to_string(),
        })
    }
}
