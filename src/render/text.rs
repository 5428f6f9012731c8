//! Caption text drawing.
//!
//! Uses the Spleen 12x24 bitmap font, scaled with nearest neighbor to the
//! requested cap height.

use image::{GrayImage, Luma};
use spleen_font::{FONT_12X24, PSF2Font};

use super::RenderError;

const SRC_W: usize = 12;
const SRC_H: usize = 24;

/// Width of a scaled glyph for a given height (the font is 1:2).
pub fn glyph_width(height: u32) -> u32 {
    (height / 2).max(1)
}

/// Width in pixels of `text` drawn at `height`.
pub fn text_width(text: &str, height: u32) -> u32 {
    text.chars().count() as u32 * glyph_width(height)
}

/// Draw `text` in black with its top-left corner at (`x`, `y`).
///
/// Pixels falling outside the image are clipped. Characters missing from the
/// font are skipped.
pub fn draw_text(
    img: &mut GrayImage,
    text: &str,
    x: u32,
    y: u32,
    height: u32,
) -> Result<(), RenderError> {
    if height == 0 {
        return Ok(());
    }

    let mut font =
        PSF2Font::new(FONT_12X24).map_err(|e| RenderError::Font(format!("{:?}", e)))?;
    let width = glyph_width(height);

    for (i, ch) in text.chars().enumerate() {
        let glyph = source_glyph(&mut font, ch);
        let origin_x = x + i as u32 * width;

        for dy in 0..height {
            for dx in 0..width {
                let sx = dx as usize * SRC_W / width as usize;
                let sy = dy as usize * SRC_H / height as usize;
                if glyph.get(sy * SRC_W + sx).copied().unwrap_or(0) == 0 {
                    continue;
                }
                let (px, py) = (origin_x + dx, y + dy);
                if px < img.width() && py < img.height() {
                    img.put_pixel(px, py, Luma([0]));
                }
            }
        }
    }

    Ok(())
}

/// Unscaled 12x24 bitmap, 1 = ink. Empty for characters the font lacks.
fn source_glyph(font: &mut PSF2Font, ch: char) -> Vec<u8> {
    let mut bitmap = vec![0u8; SRC_W * SRC_H];
    let utf8 = ch.to_string();

    if let Some(glyph) = font.glyph_for_utf8(utf8.as_bytes()) {
        for (row_y, row) in glyph.enumerate() {
            for (col_x, on) in row.enumerate() {
                if row_y < SRC_H && col_x < SRC_W && on {
                    bitmap[row_y * SRC_W + col_x] = 1;
                }
            }
        }
    }

    bitmap
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("12345678", 24), 96);
        assert_eq!(glyph_width(1), 1);
    }

    #[test]
    fn test_draw_text_inks_pixels() {
        let mut img = GrayImage::from_pixel(100, 40, Luma([255]));
        draw_text(&mut img, "8", 10, 5, 24).unwrap();
        assert!(img.pixels().any(|p| p.0[0] == 0));
    }

    #[test]
    fn test_draw_text_clips_at_edges() {
        let mut img = GrayImage::from_pixel(10, 10, Luma([255]));
        draw_text(&mut img, "WIDE TEXT", 5, 5, 24).unwrap();
    }

    #[test]
    fn test_zero_height_draws_nothing() {
        let mut img = GrayImage::from_pixel(20, 20, Luma([255]));
        draw_text(&mut img, "1", 0, 0, 0).unwrap();
        assert!(img.pixels().all(|p| p.0[0] == 255));
    }
}
