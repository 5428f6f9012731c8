//! Single-barcode export.
//!
//! Renders one code with the current settings, outside of any workbook.

use image::GrayImage;
use std::path::Path;

use crate::code::NormalizedCode;
use crate::config::Settings;
use crate::error::XlBarcodeError;
use crate::render::{BarcodeRenderer, Renderer, add_border, save_png, to_png_bytes};

/// Normalize, render and frame `raw` with `settings`.
pub fn render_one(raw: &str, settings: &Settings) -> Result<GrayImage, XlBarcodeError> {
    settings.validate()?;
    let code = NormalizedCode::new(raw.trim(), settings.symbology, settings.padding)?;
    let renderer = BarcodeRenderer::new(settings.render_options());
    let img = renderer.render(&code)?;
    Ok(add_border(&img, settings.border_px))
}

/// Export one barcode as a PNG file at `path`. Returns `(width, height)`.
pub fn export_one(raw: &str, settings: &Settings, path: &Path) -> Result<(u32, u32), XlBarcodeError> {
    let img = render_one(raw, settings)?;
    save_png(&img, path)?;
    tracing::info!(code = raw, path = %path.display(), "barcode exported");
    Ok(img.dimensions())
}

/// Export one barcode as PNG bytes.
pub fn export_png(raw: &str, settings: &Settings) -> Result<Vec<u8>, XlBarcodeError> {
    let img = render_one(raw, settings)?;
    Ok(to_png_bytes(&img)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Symbology, ValidationError};

    #[test]
    fn test_export_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("code.png");

        let (width, height) = export_one("1234567", &Settings::default(), &path).unwrap();

        let saved = image::open(&path).unwrap();
        assert_eq!((saved.width(), saved.height()), (width, height));
    }

    #[test]
    fn test_border_grows_image() {
        let plain = Settings {
            border_px: 0,
            ..Settings::default()
        };
        let framed = Settings {
            border_px: 10,
            ..Settings::default()
        };

        let a = render_one("1234567", &plain).unwrap();
        let b = render_one("1234567", &framed).unwrap();
        assert_eq!(b.width(), a.width() + 20);
        assert_eq!(b.height(), a.height() + 20);
    }

    #[test]
    fn test_invalid_code_is_validation_error() {
        let settings = Settings {
            symbology: Symbology::Ean13,
            ..Settings::default()
        };
        let err = export_png("12ab", &settings).unwrap_err();
        assert!(matches!(
            err,
            XlBarcodeError::Validation(ValidationError::NotAnInteger)
        ));
    }

    #[test]
    fn test_png_bytes_have_signature() {
        let bytes = export_png("hello world", &Settings {
            symbology: Symbology::Code39,
            ..Settings::default()
        })
        .unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
