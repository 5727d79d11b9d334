//! Signature algorithm implementations.

mod perceptual;
mod pixel;

pub use perceptual::PerceptualHashAlgorithm;
pub use pixel::PixelDigestAlgorithm;
