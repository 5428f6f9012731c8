//! # Barcode Rendering
//!
//! Rasterizes a [`NormalizedCode`] into a grayscale image.
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │               quiet zone                 │
//! │ quiet │ ▌▌ ▌▌▌ ▌ ▌▌ ▌▌▌ ▌ ▌▌ ▌▌ │ quiet  │  module_height_mm
//! │       text distance (1 mm)               │
//! │               1234 5670                  │  font_size_pt (0 = none)
//! │               quiet zone                 │
//! └──────────────────────────────────────────┘
//! ```
//!
//! All physical sizes are converted to pixels at `dpi`. Module width, quiet
//! zone and text distance are fixed; DPI, bar height and text size come from
//! the settings.
//!
//! ## Modules
//!
//! - [`encode`]: barcoders wrappers and check digits
//! - [`border`]: border compositing and PNG output
//! - [`text`]: caption drawing

pub mod border;
pub mod encode;
pub mod text;

use image::{GrayImage, Luma};
use thiserror::Error;

use crate::code::{NormalizedCode, Symbology};

pub use border::{add_border, save_png, to_png_bytes};

const MM_PER_INCH: f32 = 25.4;
const POINTS_PER_INCH: f32 = 72.0;

/// Errors raised while rendering or writing an image.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot encode '{data}' as {symbology}: {reason}")]
    Encode {
        symbology: Symbology,
        data: String,
        reason: String,
    },

    #[error("Font error: {0}")]
    Font(String),

    #[error("Image error: {0}")]
    Image(String),
}

/// Physical rendering parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub dpi: u32,
    /// Width of the narrowest bar.
    pub module_width_mm: f32,
    /// Bar height.
    pub module_height_mm: f32,
    /// Blank margin around the bars.
    pub quiet_zone_mm: f32,
    /// Gap between the bars and the caption.
    pub text_distance_mm: f32,
    /// Caption size; 0 omits the caption.
    pub font_size_pt: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dpi: 200,
            module_width_mm: 0.2,
            module_height_mm: 15.0,
            quiet_zone_mm: 2.0,
            text_distance_mm: 1.0,
            font_size_pt: 6,
        }
    }
}

impl RenderOptions {
    /// Convert millimetres to whole pixels (at least 1).
    #[inline]
    pub fn mm_to_px(&self, mm: f32) -> u32 {
        ((mm * self.dpi as f32 / MM_PER_INCH).round() as u32).max(1)
    }

    /// Caption height in pixels, 0 when the caption is disabled.
    #[inline]
    pub fn text_height_px(&self) -> u32 {
        if self.font_size_pt == 0 {
            0
        } else {
            ((self.font_size_pt as f32 * self.dpi as f32 / POINTS_PER_INCH).round() as u32).max(1)
        }
    }
}

/// Something that turns a code into an image.
///
/// The pipeline and the single export only depend on this trait.
pub trait Renderer: Send + Sync {
    fn render(&self, code: &NormalizedCode) -> Result<GrayImage, RenderError>;
}

/// The barcoders-backed renderer.
#[derive(Debug, Clone, Default)]
pub struct BarcodeRenderer {
    options: RenderOptions,
}

impl BarcodeRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}

impl Renderer for BarcodeRenderer {
    fn render(&self, code: &NormalizedCode) -> Result<GrayImage, RenderError> {
        let encoded = encode::encode(code)?;
        let opts = &self.options;

        let module_px = opts.mm_to_px(opts.module_width_mm);
        let quiet_px = opts.mm_to_px(opts.quiet_zone_mm);
        let bar_px = opts.mm_to_px(opts.module_height_mm);
        let text_px = opts.text_height_px();
        let gap_px = if text_px > 0 {
            opts.mm_to_px(opts.text_distance_mm)
        } else {
            0
        };

        let bars_width = encoded.modules.len() as u32 * module_px;
        let caption_width = text::text_width(&encoded.caption, text_px);
        let width = bars_width.max(caption_width) + 2 * quiet_px;
        let height = quiet_px + bar_px + gap_px + text_px + quiet_px;

        tracing::debug!(
            code = code.as_str(),
            symbology = %code.symbology(),
            width,
            height,
            "rendering barcode"
        );

        let mut img = GrayImage::from_pixel(width, height, Luma([255]));

        let bars_x = (width - bars_width) / 2;
        for (i, &module) in encoded.modules.iter().enumerate() {
            if module != 1 {
                continue;
            }
            let x0 = bars_x + i as u32 * module_px;
            for x in x0..x0 + module_px {
                for y in quiet_px..quiet_px + bar_px {
                    img.put_pixel(x, y, Luma([0]));
                }
            }
        }

        if text_px > 0 {
            let text_x = (width - caption_width) / 2;
            let text_y = quiet_px + bar_px + gap_px;
            text::draw_text(&mut img, &encoded.caption, text_x, text_y, text_px)?;
        }

        Ok(img)
    }
}
