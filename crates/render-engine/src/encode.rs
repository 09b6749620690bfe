//! Still image encoding.

use std::io::Cursor;

use boothcam_common::config::OutputFormat;
use boothcam_common::error::CaptureError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageFormat, RgbaImage};

/// Captures are encoded at maximum JPEG quality.
pub const JPEG_QUALITY: u8 = 100;

/// Encode a composed still. JPEG drops alpha; PNG keeps it.
pub fn encode(image: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>, CaptureError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(CaptureError::rasterization("nothing to encode: empty image"));
    }
    match format {
        OutputFormat::Jpeg => encode_jpeg(image),
        OutputFormat::Png => encode_png(image),
    }
}

fn encode_jpeg(image: &RgbaImage) -> Result<Vec<u8>, CaptureError> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    encoder
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| CaptureError::rasterization(format!("JPEG encoding failed: {e}")))?;
    Ok(buffer)
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CaptureError> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| CaptureError::rasterization(format!("PNG encoding failed: {e}")))?;
    Ok(buffer)
}
