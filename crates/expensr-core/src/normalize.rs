//! Pre-OCR image normalization.

use image::{DynamicImage, GenericImageView, ImageFormat};
use tracing::debug;

use crate::error::ImageError;

/// Formats the pipeline accepts.
const SUPPORTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
    ImageFormat::Gif,
];

/// Image normalizer producing OCR-ready RGB images.
///
/// The source bytes are never mutated; oversized images are downscaled
/// in memory so the longer side fits `max_image_size`.
pub struct ImageNormalizer {
    max_image_size: u32,
    max_file_bytes: u64,
}

impl ImageNormalizer {
    /// Create a normalizer with default limits.
    pub fn new() -> Self {
        Self {
            max_image_size: 2048,
            max_file_bytes: 20 * 1024 * 1024,
        }
    }

    /// Set maximum image dimension (longer side).
    pub fn with_max_size(mut self, size: u32) -> Self {
        self.max_image_size = size;
        self
    }

    /// Set maximum accepted input size in bytes.
    pub fn with_max_file_bytes(mut self, bytes: u64) -> Self {
        self.max_file_bytes = bytes;
        self
    }

    /// Normalize image bytes into an OCR-ready RGB image.
    ///
    /// The format is sniffed from the bytes, not trusted from the file
    /// extension. Unsupported formats fail with
    /// [`ImageError::UnsupportedFormat`], undecodable bytes with
    /// [`ImageError::Corrupt`].
    pub fn normalize(&self, bytes: &[u8]) -> Result<DynamicImage, ImageError> {
        if bytes.len() as u64 > self.max_file_bytes {
            return Err(ImageError::TooLarge {
                bytes: bytes.len() as u64,
                limit: self.max_file_bytes,
            });
        }

        let format = image::guess_format(bytes)
            .map_err(|_| ImageError::UnsupportedFormat("unrecognized format".to_string()))?;

        if !SUPPORTED_FORMATS.contains(&format) {
            return Err(ImageError::UnsupportedFormat(format!("{:?}", format)));
        }

        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| ImageError::Corrupt(e.to_string()))?;

        let (width, height) = decoded.dimensions();
        debug!("Decoded {:?} image: {}x{}", format, width, height);

        let resized = if width.max(height) > self.max_image_size {
            decoded.resize(
                self.max_image_size,
                self.max_image_size,
                image::imageops::FilterType::Lanczos3,
            )
        } else {
            decoded
        };

        // OCR expects plain RGB; strips alpha and EXIF-less grayscale quirks.
        Ok(DynamicImage::ImageRgb8(resized.to_rgb8()))
    }
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
