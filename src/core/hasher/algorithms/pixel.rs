//! Pixel-by-pixel digest implementation.
//!
//! Digests the decoded pixel buffer with XXH3-128. The signature starts with
//! the image dimensions, so differently sized images can never share a key
//! even on a digest collision. 16-bit images are digested at full depth.

use super::super::traits::{AlgorithmKind, Signature, SignatureAlgorithm};
use crate::error::HashError;
use image::{ColorType, DynamicImage, GenericImageView};
use xxhash_rust::xxh3::Xxh3;

/// Exact-content digest of the decoded pixels
#[derive(Debug, Default)]
pub struct PixelDigestAlgorithm;

impl PixelDigestAlgorithm {
    pub fn new() -> Self {
        Self
    }
}

fn is_high_depth(color: ColorType) -> bool {
    matches!(
        color,
        ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16
    )
}

impl SignatureAlgorithm for PixelDigestAlgorithm {
    fn signature(&self, image: &DynamicImage) -> Result<Signature, HashError> {
        let (width, height) = image.dimensions();
        let mut hasher = Xxh3::new();

        if is_high_depth(image.color()) {
            hasher.update(&[16]);
            let pixels = image.to_rgba16();
            let raw: Vec<u8> = pixels
                .as_raw()
                .iter()
                .flat_map(|channel| channel.to_le_bytes())
                .collect();
            hasher.update(&raw);
        } else {
            hasher.update(&[8]);
            hasher.update(image.to_rgba8().as_raw());
        }

        let mut bytes = Vec::with_capacity(24);
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&hasher.digest128().to_be_bytes());

        Ok(Signature::new(bytes, AlgorithmKind::PixelByPixel))
    }

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::PixelByPixel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};

    fn solid(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb([value, value, value])))
    }

    #[test]
    fn identical_pixels_collide() {
        let algorithm = PixelDigestAlgorithm::new();

        let a = algorithm.signature(&solid(10, 10, 40)).unwrap();
        let b = algorithm.signature(&solid(10, 10, 40)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn single_pixel_difference_separates() {
        let algorithm = PixelDigestAlgorithm::new();
        let original = solid(10, 10, 40);
        let mut edited = original.to_rgb8();
        edited.put_pixel(3, 7, Rgb([41, 40, 40]));

        let a = algorithm.signature(&original).unwrap();
        let b = algorithm.signature(&DynamicImage::ImageRgb8(edited)).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn dimension_mismatch_never_collides() {
        let algorithm = PixelDigestAlgorithm::new();

        let wide = algorithm.signature(&solid(20, 5, 0)).unwrap();
        let tall = algorithm.signature(&solid(5, 20, 0)).unwrap();

        assert_ne!(wide, tall);
        assert_eq!(&wide.as_bytes()[..8], &[0, 0, 0, 20, 0, 0, 0, 5]);
    }

    #[test]
    fn opaque_rgba_matches_rgb_rendition() {
        let algorithm = PixelDigestAlgorithm::new();
        let rgba = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(6, 6, Rgba([9, 9, 9, 255])));

        let a = algorithm.signature(&rgba).unwrap();
        let b = algorithm.signature(&solid(6, 6, 9)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn kind_returns_pixel() {
        assert_eq!(PixelDigestAlgorithm::new().kind(), AlgorithmKind::PixelByPixel);
    }
}
