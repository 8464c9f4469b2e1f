//! JPEG normalization for fetched payloads.

use crate::error::ProcessingError;
use image::codecs::jpeg::JpegEncoder;
use image::ImageReader;
use std::io::Cursor;

/// Re-encodes arbitrary raster input as 8-bit RGB JPEG.
#[derive(Debug, Clone, Copy)]
pub struct ImageTranscoder {
    quality: u8,
}

impl ImageTranscoder {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Decode `data` (format guessed from content) and re-encode it as JPEG.
    ///
    /// Alpha, palette, grayscale and 16-bit inputs are flattened to 8-bit RGB.
    pub fn to_jpeg(&self, data: &[u8]) -> Result<Vec<u8>, ProcessingError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;

        if reader.format().is_none() {
            return Err(ProcessingError::Decode(
                "Unrecognized image format".to_string(),
            ));
        }

        let img = reader
            .decode()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;
        let rgb = img.to_rgb8();

        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, self.quality);
        rgb.write_with_encoder(encoder)
            .map_err(|e| ProcessingError::Decode(format!("JPEG encoding failed: {}", e)))?;

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Luma, Rgba, RgbaImage};

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    fn decode_jpeg(bytes: &[u8]) -> DynamicImage {
        image::load_from_memory_with_format(bytes, ImageFormat::Jpeg).unwrap()
    }

    #[test]
    fn test_rgba_png_becomes_rgb_jpeg() {
        let png = encode(
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 6, Rgba([200, 10, 10, 128]))),
            ImageFormat::Png,
        );

        let jpeg = ImageTranscoder::new(75).to_jpeg(&png).unwrap();

        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let decoded = decode_jpeg(&jpeg);
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn test_sixteen_bit_grayscale_is_flattened() {
        let gray: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(4, 4, Luma([40_000u16]));
        let png = encode(DynamicImage::ImageLuma16(gray), ImageFormat::Png);

        let jpeg = ImageTranscoder::new(90).to_jpeg(&png).unwrap();

        assert_eq!(decode_jpeg(&jpeg).color(), image::ColorType::Rgb8);
    }

    #[test]
    fn test_jpeg_input_is_reencoded() {
        let source = encode(
            DynamicImage::ImageRgb8(image::RgbImage::from_pixel(3, 3, image::Rgb([1, 2, 3]))),
            ImageFormat::Jpeg,
        );
        let jpeg = ImageTranscoder::new(75).to_jpeg(&source).unwrap();
        assert_eq!((decode_jpeg(&jpeg).width(), decode_jpeg(&jpeg).height()), (3, 3));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let result = ImageTranscoder::new(75).to_jpeg(b"<html>not an image</html>");
        assert!(matches!(result, Err(ProcessingError::Decode(_))));
    }

    #[test]
    fn test_truncated_png_is_decode_error() {
        let png = encode(
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255]))),
            ImageFormat::Png,
        );
        let result = ImageTranscoder::new(75).to_jpeg(&png[..png.len() / 2]);
        assert!(matches!(result, Err(ProcessingError::Decode(_))));
    }

    #[test]
    fn test_quality_is_clamped() {
        assert_eq!(ImageTranscoder::new(0).quality(), 1);
        assert_eq!(ImageTranscoder::new(255).quality(), 100);
    }
}
