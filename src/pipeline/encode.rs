//! Image preparation for OCR: decode, cap size, base64 PNG as `ImageData`.
//!
//! Uploads arrive as JPEG, PNG, TIFF and friends, often straight off a phone
//! camera at 4000+ px. Everything is re-encoded as PNG (lossless, so text
//! edges stay crisp) after scaling the longest edge down to
//! `max_rendered_pixels`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Decode uploaded image bytes, guessing the format from the content.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, image::ImageError> {
    image::load_from_memory(bytes)
}

/// Scale `img` down so neither dimension exceeds `max_px`. Smaller images
/// are returned untouched.
pub fn fit_within(img: DynamicImage, max_px: u32) -> DynamicImage {
    if img.width() <= max_px && img.height() <= max_px {
        return img;
    }
    debug!(
        "Downscaling {}x{} image to fit {}px",
        img.width(),
        img.height(),
        max_px
    );
    img.resize(max_px, max_px, image::imageops::FilterType::Lanczos3)
}

/// Encode an image as a base64 PNG ready for the vision API.
///
/// `detail: "high"` asks GPT-4-class models for the full tile budget; exam
/// scans are dense and small print is lost at low detail.
pub fn encode_png(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded image → {} bytes base64", b64.len());

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])))
    }

    #[test]
    fn encode_small_image() {
        let data = encode_png(&solid(10, 10)).expect("encode should succeed");
        assert_eq!(data.mime_type, "image/png");
        let decoded = STANDARD.decode(&data.data).expect("valid base64");
        assert!(decoded.starts_with(b"\x89PNG"));
    }

    #[test]
    fn decode_round_trips_png_bytes() {
        let data = encode_png(&solid(4, 3)).unwrap();
        let bytes = STANDARD.decode(&data.data).unwrap();
        let img = decode_image(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (4, 3));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_image(b"not an image").is_err());
    }

    #[test]
    fn fit_within_keeps_aspect_ratio() {
        let img = fit_within(solid(400, 200), 100);
        assert_eq!((img.width(), img.height()), (100, 50));
    }

    #[test]
    fn fit_within_leaves_small_images() {
        let img = fit_within(solid(50, 20), 100);
        assert_eq!((img.width(), img.height()), (50, 20));
    }
}
