//! Fast JPEG decoding using zune-jpeg.

use super::ImageDecoder;
use crate::core::scanner::ImageFormat;
use crate::error::FingerprintError;
use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};
use std::fs;
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;

/// JPEG decoder backed by zune-jpeg (1.5-2x faster than the image crate).
pub struct JpegDecoder;

impl ImageDecoder for JpegDecoder {
    fn supports(&self, format: ImageFormat) -> bool {
        format == ImageFormat::Jpeg
    }

    fn decode(&self, path: &Path) -> Result<DynamicImage, FingerprintError> {
        let file_bytes = fs::read(path).map_err(|e| FingerprintError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = zune_jpeg::JpegDecoder::new_with_options(&file_bytes, options);

        let pixels = decoder.decode().map_err(|e| FingerprintError::DecodeFailed {
            path: path.to_path_buf(),
            reason: format!("zune-jpeg decode failed: {:?}", e),
        })?;

        let info = decoder
            .info()
            .ok_or_else(|| FingerprintError::DecodeFailed {
                path: path.to_path_buf(),
                reason: "Failed to get image info".to_string(),
            })?;

        let width = info.width as u32;
        let height = info.height as u32;

        // The decoder may have produced something other than what was
        // requested (grayscale sources in particular)
        let out_colorspace = decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB);

        let image = match out_colorspace {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| {
                        FingerprintError::DecodeFailed {
                            path: path.to_path_buf(),
                            reason: "Failed to create RGB buffer".to_string(),
                        }
                    })?;
                DynamicImage::ImageRgb8(buffer)
            }
            ColorSpace::RGBA => {
                let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| {
                        FingerprintError::DecodeFailed {
                            path: path.to_path_buf(),
                            reason: "Failed to create RGBA buffer".to_string(),
                        }
                    })?;
                DynamicImage::ImageRgba8(buffer)
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| {
                        FingerprintError::DecodeFailed {
                            path: path.to_path_buf(),
                            reason: "Failed to create Luma buffer".to_string(),
                        }
                    })?;
                DynamicImage::ImageLuma8(buffer)
            }
            other => {
                return Err(FingerprintError::DecodeFailed {
                    path: path.to_path_buf(),
                    reason: format!("Unsupported output colorspace: {:?}", other),
                });
            }
        };

        Ok(image)
    }
}
