//! # Hasher Module
//!
//! Computes the signatures that decide group membership.
//!
//! ## Supported Algorithms
//! - **Perceptual hash** - similarity-tolerant, catches re-encodes and small edits
//! - **Pixel by pixel** - exact, two images match only if their decoded pixels do
//!
//! Both can be enabled at once. They then run as a chain of refinement
//! passes, perceptual first, see [`AlgorithmSet`].
//!
//! ## Example
//! ```rust,ignore
//! use duplicate_image_comparer::core::hasher::HasherConfig;
//!
//! let algorithms = HasherConfig::new()
//!     .perceptual_hash(true)
//!     .pixel_by_pixel(true)
//!     .build();
//! ```

mod algorithms;
pub mod decode;
mod traits;

pub use algorithms::{PerceptualHashAlgorithm, PixelDigestAlgorithm};
pub use decode::FastDecoder;
pub use traits::{AlgorithmKind, Signature, SignatureAlgorithm};

use std::ops::RangeInclusive;

/// Default perceptual hash edge length (64-bit hashes)
pub const DEFAULT_HASH_SIZE: u32 = 8;

/// Smallest accepted perceptual hash edge length
pub const MIN_HASH_SIZE: u32 = 4;

/// Largest accepted perceptual hash edge length
pub const MAX_HASH_SIZE: u32 = 64;

/// Accepted perceptual hash edge lengths
pub const HASH_SIZE_RANGE: RangeInclusive<u32> = MIN_HASH_SIZE..=MAX_HASH_SIZE;

/// Configuration builder for the algorithm chain
#[derive(Debug, Clone)]
pub struct HasherConfig {
    perceptual_hash: bool,
    pixel_by_pixel: bool,
    /// Perceptual hash edge length, within `MIN_HASH_SIZE..=MAX_HASH_SIZE`
    hash_size: u32,
}

impl HasherConfig {
    /// Create a configuration with every algorithm disabled
    pub fn new() -> Self {
        Self {
            perceptual_hash: false,
            pixel_by_pixel: false,
            hash_size: DEFAULT_HASH_SIZE,
        }
    }

    /// Enable or disable the perceptual hash pass
    pub fn perceptual_hash(mut self, enabled: bool) -> Self {
        self.perceptual_hash = enabled;
        self
    }

    /// Enable or disable the pixel-by-pixel pass
    pub fn pixel_by_pixel(mut self, enabled: bool) -> Self {
        self.pixel_by_pixel = enabled;
        self
    }

    /// Set the perceptual hash edge length, clamped to 4..=64.
    ///
    /// - 8: 64 bits, tolerant, the default
    /// - 16: 256 bits, fewer false positives
    /// - 32: 1024 bits, close to exact
    pub fn hash_size(mut self, size: u32) -> Self {
        self.hash_size = size.clamp(MIN_HASH_SIZE, MAX_HASH_SIZE);
        self
    }

    /// Build the ordered algorithm chain
    pub fn build(self) -> AlgorithmSet {
        let mut set = AlgorithmSet::new();
        if self.pixel_by_pixel {
            set = set.with(Box::new(PixelDigestAlgorithm::new()));
        }
        if self.perceptual_hash {
            set = set.with(Box::new(PerceptualHashAlgorithm::new(self.hash_size)));
        }
        set
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered chain of signature algorithms.
///
/// Algorithms are kept sorted by [`AlgorithmKind::refinement_rank`] no matter
/// the order they were added in, and each kind appears at most once.
#[derive(Default)]
pub struct AlgorithmSet {
    algorithms: Vec<Box<dyn SignatureAlgorithm>>,
}

impl AlgorithmSet {
    /// An empty chain: every file ends up in its own group
    pub fn new() -> Self {
        Self {
            algorithms: Vec::new(),
        }
    }

    /// Chain built from the two settings toggles
    pub fn from_flags(perceptual_hash: bool, pixel_by_pixel: bool, hash_size: u32) -> Self {
        HasherConfig::new()
            .perceptual_hash(perceptual_hash)
            .pixel_by_pixel(pixel_by_pixel)
            .hash_size(hash_size)
            .build()
    }

    /// Add an algorithm, replacing any existing one of the same kind
    pub fn with(mut self, algorithm: Box<dyn SignatureAlgorithm>) -> Self {
        self.algorithms.retain(|a| a.kind() != algorithm.kind());
        self.algorithms.push(algorithm);
        self.algorithms.sort_by_key(|a| a.kind().refinement_rank());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.algorithms.len()
    }

    /// Algorithms in refinement order
    pub fn iter(&self) -> impl Iterator<Item = &dyn SignatureAlgorithm> + '_ {
        self.algorithms.iter().map(|a| a.as_ref())
    }

    /// Kinds in refinement order
    pub fn kinds(&self) -> Vec<AlgorithmKind> {
        self.iter().map(|a| a.kind()).collect()
    }
}

impl std::fmt::Debug for AlgorithmSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_nothing_enabled() {
        let algorithms = HasherConfig::new().build();
        assert!(algorithms.is_empty());
    }

    #[test]
    fn perceptual_always_runs_first() {
        let algorithms = HasherConfig::new()
            .pixel_by_pixel(true)
            .perceptual_hash(true)
            .build();

        assert_eq!(
            algorithms.kinds(),
            vec![AlgorithmKind::PerceptualHash, AlgorithmKind::PixelByPixel]
        );
    }

    #[test]
    fn adding_same_kind_twice_keeps_one() {
        let algorithms = AlgorithmSet::new()
            .with(Box::new(PixelDigestAlgorithm::new()))
            .with(Box::new(PixelDigestAlgorithm::new()));

        assert_eq!(algorithms.len(), 1);
    }

    #[test]
    fn config_builder_sets_hash_size() {
        let config = HasherConfig::new().perceptual_hash(true).hash_size(16);
        assert_eq!(config.hash_size, 16);
        assert_eq!(config.build().kinds(), vec![AlgorithmKind::PerceptualHash]);
    }

    #[test]
    fn hash_size_is_clamped_to_the_supported_range() {
        assert_eq!(HasherConfig::new().hash_size(0).hash_size, MIN_HASH_SIZE);
        assert_eq!(HasherConfig::new().hash_size(1000).hash_size, MAX_HASH_SIZE);
        assert_eq!(
            AlgorithmSet::from_flags(true, false, 0).kinds(),
            vec![AlgorithmKind::PerceptualHash]
        );
    }
}
