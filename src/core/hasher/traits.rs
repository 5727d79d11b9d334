//! Trait definitions for signature algorithms.

use crate::error::HashError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Available signature algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlgorithmKind {
    /// Similarity-tolerant fingerprint, groups re-encodes and tiny edits
    PerceptualHash,
    /// Exact digest of the decoded pixels
    PixelByPixel,
}

impl AlgorithmKind {
    /// Position in the refinement chain.
    ///
    /// Perceptual grouping runs first; exact grouping only ever splits its
    /// buckets. The reverse order would leave the perceptual pass nothing to do.
    pub fn refinement_rank(&self) -> u8 {
        match self {
            AlgorithmKind::PerceptualHash => 0,
            AlgorithmKind::PixelByPixel => 1,
        }
    }
}

impl std::fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlgorithmKind::PerceptualHash => write!(f, "perceptual"),
            AlgorithmKind::PixelByPixel => write!(f, "pixel"),
        }
    }
}

/// A pure strategy turning a decoded image into a grouping key
pub trait SignatureAlgorithm: Send + Sync {
    /// Compute the signature of an already-decoded image
    fn signature(&self, image: &DynamicImage) -> Result<Signature, HashError>;

    /// Get the algorithm kind
    fn kind(&self) -> AlgorithmKind;
}

/// Signature bytes tagged with the algorithm that produced them.
///
/// Two signatures are equal only if both the algorithm and the bytes match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    bytes: Vec<u8>,
    algorithm: AlgorithmKind,
}

impl Signature {
    /// Create a new signature
    pub fn new(bytes: Vec<u8>, algorithm: AlgorithmKind) -> Self {
        Self { bytes, algorithm }
    }

    /// Get the algorithm that produced this signature
    pub fn algorithm(&self) -> AlgorithmKind {
        self.algorithm
    }

    /// Get the raw signature bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Get the signature as a hexadecimal string
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_hex_produces_correct_string() {
        let signature = Signature::new(vec![0xDE, 0xAD, 0xBE, 0xEF], AlgorithmKind::PixelByPixel);
        assert_eq!(signature.to_hex(), "deadbeef");
        assert_eq!(signature.to_string(), "pixel:deadbeef");
    }

    #[test]
    fn equal_bytes_from_different_algorithms_differ() {
        let perceptual = Signature::new(vec![0xFF], AlgorithmKind::PerceptualHash);
        let pixel = Signature::new(vec![0xFF], AlgorithmKind::PixelByPixel);
        assert_ne!(perceptual, pixel);
    }

    #[test]
    fn perceptual_refines_before_pixel() {
        assert!(
            AlgorithmKind::PerceptualHash.refinement_rank()
                < AlgorithmKind::PixelByPixel.refinement_rank()
        );
    }
}
