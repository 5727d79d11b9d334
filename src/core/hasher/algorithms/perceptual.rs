//! Perceptual hash implementation.
//!
//! The gradient hash shrinks the image to a small grayscale grid and records
//! whether brightness rises or falls between neighbouring cells. Re-encodes,
//! light recompression and small edits keep the same gradients, so they land
//! in the same bucket. That is the point of the algorithm, and also its false
//! positive risk: larger hash sizes and the pixel refinement bound it.

use super::super::traits::{AlgorithmKind, Signature, SignatureAlgorithm};
use super::super::{MAX_HASH_SIZE, MIN_HASH_SIZE};
use crate::error::HashError;
use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig as ImageHasherConfig};

/// Perceptual hash using the image_hasher gradient algorithm
pub struct PerceptualHashAlgorithm {
    hasher: image_hasher::Hasher,
}

impl PerceptualHashAlgorithm {
    /// Create a hasher producing `hash_size * hash_size` bits.
    ///
    /// `hash_size` is clamped to 4..=64.
    pub fn new(hash_size: u32) -> Self {
        let hash_size = hash_size.clamp(MIN_HASH_SIZE, MAX_HASH_SIZE);
        let hasher = ImageHasherConfig::new()
            .hash_size(hash_size, hash_size)
            .hash_alg(HashAlg::Gradient)
            .to_hasher();

        Self { hasher }
    }
}

impl SignatureAlgorithm for PerceptualHashAlgorithm {
    fn signature(&self, image: &DynamicImage) -> Result<Signature, HashError> {
        let hash = self.hasher.hash_image(image);
        Ok(Signature::new(
            hash.as_bytes().to_vec(),
            AlgorithmKind::PerceptualHash,
        ))
    }

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::PerceptualHash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn create_gradient(offset: u8) -> DynamicImage {
        let img = ImageBuffer::from_fn(64, 64, |x, _| {
            let value = (x as u8).saturating_mul(4).saturating_add(offset);
            Rgb([value, value, value])
        });
        DynamicImage::ImageRgb8(img)
    }

    fn create_reversed_gradient() -> DynamicImage {
        let img = ImageBuffer::from_fn(64, 64, |x, _| {
            let value = ((63 - x) as u8).saturating_mul(4);
            Rgb([value, value, value])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn identical_images_produce_identical_signature() {
        let algorithm = PerceptualHashAlgorithm::new(8);
        let image = create_gradient(0);

        assert_eq!(
            algorithm.signature(&image).unwrap(),
            algorithm.signature(&image).unwrap()
        );
    }

    #[test]
    fn slightly_brighter_copy_keeps_signature() {
        let algorithm = PerceptualHashAlgorithm::new(8);

        let original = algorithm.signature(&create_gradient(0)).unwrap();
        let brighter = algorithm.signature(&create_gradient(2)).unwrap();

        assert_eq!(original, brighter);
    }

    #[test]
    fn zero_hash_size_falls_back_to_smallest_grid() {
        let algorithm = PerceptualHashAlgorithm::new(0);

        let signature = algorithm.signature(&create_gradient(0)).unwrap();

        assert_eq!(signature.as_bytes().len(), 2);
    }

    #[test]
    fn opposite_gradients_differ() {
        let algorithm = PerceptualHashAlgorithm::new(8);

        let forward = algorithm.signature(&create_gradient(0)).unwrap();
        let backward = algorithm.signature(&create_reversed_gradient()).unwrap();

        assert_ne!(forward, backward);
    }

    #[test]
    fn hash_size_affects_signature_length() {
        let image = create_gradient(0);

        let small = PerceptualHashAlgorithm::new(8).signature(&image).unwrap();
        let large = PerceptualHashAlgorithm::new(16).signature(&image).unwrap();

        assert_eq!(small.as_bytes().len(), 8);
        assert_eq!(large.as_bytes().len(), 32);
    }

    #[test]
    fn kind_returns_perceptual() {
        assert_eq!(
            PerceptualHashAlgorithm::new(8).kind(),
            AlgorithmKind::PerceptualHash
        );
    }
}
