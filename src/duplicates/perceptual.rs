use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::metadata;
use crate::common::errors::Unavailable;

/// A fixed-length bit pattern summarizing how an image looks
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    bits: Vec<u8>,
}

impl Fingerprint {
    pub fn from_bytes(bits: impl Into<Vec<u8>>) -> Self {
        Self { bits: bits.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Hamming distance between two fingerprints.
    ///
    /// Bytes present in only one of the two count as fully differing.
    pub fn distance(&self, other: &Fingerprint) -> u32 {
        let common: u32 = self
            .bits
            .iter()
            .zip(other.bits.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum();
        let extra = self.bits.len().abs_diff(other.bits.len()) as u32 * 8;
        common + extra
    }

    pub fn to_hex(&self) -> String {
        self.bits.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Pluggable perceptual hashing capability
pub trait PerceptualHasher: Send + Sync {
    fn fingerprint(&self, image: &DynamicImage) -> Fingerprint;
}

/// Average (mean) hash over an 8x8 grid: 64 bits, distances 0-64
pub struct AverageHasher {
    hasher: image_hasher::Hasher,
}

impl AverageHasher {
    pub fn new() -> Self {
        Self::with_size(8, 8)
    }

    /// Hash over a `width` x `height` grid; fingerprints carry `width * height` bits
    pub fn with_size(width: u32, height: u32) -> Self {
        let hasher = image_hasher::HasherConfig::new()
            .hash_size(width, height)
            .hash_alg(image_hasher::HashAlg::Mean)
            .to_hasher();
        Self { hasher }
    }
}

impl Default for AverageHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PerceptualHasher for AverageHasher {
    fn fingerprint(&self, image: &DynamicImage) -> Fingerprint {
        Fingerprint::from_bytes(self.hasher.hash_image(image).as_bytes())
    }
}

/// Normalize to RGB and hash
pub fn fingerprint_image(image: &DynamicImage, hasher: &dyn PerceptualHasher) -> Fingerprint {
    match image {
        DynamicImage::ImageRgb8(_) => hasher.fingerprint(image),
        other => hasher.fingerprint(&DynamicImage::ImageRgb8(other.to_rgb8())),
    }
}

/// Decode an image file and compute its perceptual fingerprint
pub fn perceptual_fingerprint(
    path: &Path,
    hasher: &dyn PerceptualHasher,
) -> Result<Fingerprint, Unavailable> {
    let decoded = metadata::decode(path)?;
    Ok(fingerprint_image(&decoded.image, hasher))
}
