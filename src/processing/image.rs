use crate::utils::KycError;
use image::{DynamicImage, GrayImage, ImageFormat};
use imageproc::contrast::stretch_contrast;
use imageproc::filter::sharpen3x3;
use std::io::Cursor;

pub struct ImageProcessor;

impl ImageProcessor {
    /// Prepare a document image for OCR: grayscale, stretch the intensity
    /// range to full scale, then sharpen. Dimensions are preserved and the
    /// result is PNG encoded.
    pub fn enhance(image_bytes: &[u8]) -> Result<Vec<u8>, KycError> {
        let img = image::load_from_memory(image_bytes)
            .map_err(|e| KycError::ImageDecode(format!("Failed to load image: {}", e)))?;

        let gray = img.to_luma8();
        let normalized = Self::normalize(&gray);
        let sharpened = sharpen3x3(&normalized);

        let mut buffer = Vec::with_capacity(image_bytes.len());
        DynamicImage::ImageLuma8(sharpened)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| KycError::ImageDecode(format!("Failed to encode processed image: {}", e)))?;

        log::debug!(
            "Enhanced {}x{} image ({} -> {} bytes)",
            gray.width(),
            gray.height(),
            image_bytes.len(),
            buffer.len()
        );
        Ok(buffer)
    }

    fn normalize(gray: &GrayImage) -> GrayImage {
        let (min, max) = gray
            .pixels()
            .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));

        // Flat images have no range to stretch.
        if max <= min {
            return gray.clone();
        }
        stretch_contrast(gray, min, max)
    }
}
