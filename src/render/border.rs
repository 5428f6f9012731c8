//! Image compositing: white border and PNG output.

use image::{GrayImage, Luma, imageops};
use std::path::Path;

use super::RenderError;

/// Return a copy of `img` surrounded by `border` white pixels on every side.
pub fn add_border(img: &GrayImage, border: u32) -> GrayImage {
    if border == 0 {
        return img.clone();
    }

    let mut framed = GrayImage::from_pixel(
        img.width() + 2 * border,
        img.height() + 2 * border,
        Luma([255]),
    );
    imageops::replace(&mut framed, img, border as i64, border as i64);
    framed
}

/// Write `img` as a PNG file.
pub fn save_png(img: &GrayImage, path: &Path) -> Result<(), RenderError> {
    img.save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| RenderError::Image(format!("Failed to save PNG {}: {}", path.display(), e)))
}

/// Encode `img` as PNG bytes.
pub fn to_png_bytes(img: &GrayImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| RenderError::Image(format!("Failed to encode PNG: {}", e)))?;
    Ok(bytes)
}
