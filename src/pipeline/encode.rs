//! Image encoding: raw image bytes → base64 `ImageData` for the LLM request.
//!
//! Document images are forwarded as-is; re-encoding a JPEG as PNG would only
//! inflate the request. Rasterized PDF pages arrive here already as PNG.

use crate::document::ImageFormat;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use tracing::debug;

/// Wrap image bytes as a base64 attachment with the matching MIME type.
///
/// ## Why `detail: "high"`?
/// Charts, receipts and scanned pages carry small text. With `"low"` the
/// provider downsamples to a single overview tile and the fine print is lost.
pub fn encode_image(format: ImageFormat, bytes: &[u8]) -> ImageData {
    let b64 = STANDARD.encode(bytes);
    debug!("Encoded {} image → {} bytes base64", format, b64.len());
    ImageData::new(b64, format.mime_type()).with_detail("high")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn encode_png_roundtrips_through_base64() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();

        let data = encode_image(ImageFormat::Png, &buf);
        assert_eq!(data.mime_type, "image/png");
        let decoded = STANDARD.decode(&data.data).expect("valid base64");
        assert_eq!(decoded, buf);
    }

    #[test]
    fn jpeg_keeps_its_mime_type() {
        let data = encode_image(ImageFormat::Jpeg, &[0xFF, 0xD8, 0xFF]);
        assert_eq!(data.mime_type, "image/jpeg");
    }
}
