use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageReader};
use std::path::Path;

use super::group::ImageRecord;
use crate::common::errors::Unavailable;

/// An image decoded once and shared by the metadata and perceptual providers
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: String,
}

/// Decode an image, guessing the format from its content rather than its name
pub fn decode(path: &Path) -> Result<DecodedImage, Unavailable> {
    let reader = ImageReader::open(path)
        .map_err(|e| Unavailable::new(path, e))?
        .with_guessed_format()
        .map_err(|e| Unavailable::new(path, e))?;

    let format = reader
        .format()
        .map(|f| format!("{:?}", f).to_uppercase())
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let image = reader.decode().map_err(|e| Unavailable::new(path, e))?;
    Ok(DecodedImage { image, format })
}

/// Describe an image file: stat plus decode
pub fn describe(path: &Path) -> Result<ImageRecord, Unavailable> {
    let decoded = decode(path)?;
    describe_decoded(path, &decoded)
}

/// Describe an image that has already been decoded
pub fn describe_decoded(path: &Path, decoded: &DecodedImage) -> Result<ImageRecord, Unavailable> {
    let meta = std::fs::metadata(path).map_err(|e| Unavailable::new(path, e))?;
    let modified = meta
        .modified()
        .map(DateTime::<Utc>::from)
        .map_err(|e| Unavailable::new(path, e))?;

    Ok(ImageRecord {
        path: std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
        size_bytes: meta.len(),
        width: decoded.image.width(),
        height: decoded.image.height(),
        format: decoded.format.clone(),
        color_mode: format!("{:?}", decoded.image.color()),
        modified,
    })
}
