//! Image decoding with a fast path for JPEG.
//!
//! Uses zune-jpeg for JPEG files (1.5-2x faster than image crate),
//! falls back to image crate for other formats.

use crate::core::scanner::ImageFormat;
use crate::error::HashError;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageReader, Luma, Rgb, Rgba};
use std::fs;
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Decoder that picks the fastest available path per format
pub struct FastDecoder;

impl FastDecoder {
    /// Decode an image from a file path.
    ///
    /// Zero-sized images are rejected, they cannot be fingerprinted.
    pub fn decode(path: &Path) -> Result<DynamicImage, HashError> {
        let image = match ImageFormat::from_path(path) {
            ImageFormat::Jpeg => Self::decode_jpeg(path).or_else(|_| Self::decode_fallback(path))?,
            _ => Self::decode_fallback(path)?,
        };

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(HashError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        Ok(image)
    }

    /// Fast JPEG decoding using zune-jpeg
    fn decode_jpeg(path: &Path) -> Result<DynamicImage, HashError> {
        let file_bytes = fs::read(path).map_err(|e| HashError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(&file_bytes, options);

        let pixels = decoder.decode().map_err(|e| HashError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("zune-jpeg decode failed: {:?}", e),
        })?;

        let info = decoder.info().ok_or_else(|| HashError::DecodeError {
            path: path.to_path_buf(),
            reason: "Failed to get image info".to_string(),
        })?;

        let width = info.width as u32;
        let height = info.height as u32;
        let buffer_error = |kind: &str| HashError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("Failed to create {} buffer", kind),
        };

        let image = match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("RGB"))?;
                DynamicImage::ImageRgb8(buffer)
            }
            ColorSpace::RGBA => {
                let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, pixels)
                    .ok_or_else(|| buffer_error("RGBA"))?;
                DynamicImage::ImageRgba8(buffer)
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, pixels)
                    .ok_or_else(|| buffer_error("Luma"))?;
                DynamicImage::ImageLuma8(buffer)
            }
            _ => return Self::decode_fallback(path),
        };

        Ok(image)
    }

    /// image crate decoding, format guessed from content so misnamed files still decode
    fn decode_fallback(path: &Path) -> Result<DynamicImage, HashError> {
        let reader = ImageReader::open(path)
            .map_err(|e| HashError::IoError {
                path: path.to_path_buf(),
                source: e,
            })?
            .with_guessed_format()
            .map_err(|e| HashError::IoError {
                path: path.to_path_buf(),
                source: e,
            })?;

        reader.decode().map_err(|e| HashError::DecodeError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use tempfile::TempDir;

    #[test]
    fn decodes_png_through_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("red.png");
        RgbImage::from_pixel(4, 3, Rgb([255, 0, 0])).save(&path).unwrap();

        let image = FastDecoder::decode(&path).unwrap();

        assert_eq!(image.dimensions(), (4, 3));
    }

    #[test]
    fn decodes_jpeg() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gray.jpg");
        RgbImage::from_pixel(16, 16, Rgb([128, 128, 128])).save(&path).unwrap();

        let image = FastDecoder::decode(&path).unwrap();

        assert_eq!(image.dimensions(), (16, 16));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("corrupt.png");
        fs::write(&path, b"this is not a valid image file").unwrap();

        let result = FastDecoder::decode(&path);

        assert!(matches!(result, Err(HashError::DecodeError { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = FastDecoder::decode(Path::new("/nonexistent/photo.png"));
        assert!(matches!(result, Err(HashError::IoError { .. })));
    }
}
