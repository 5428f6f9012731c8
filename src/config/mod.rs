//! # Settings
//!
//! User-chosen rendering parameters that survive across runs.
//!
//! ## Accepted Ranges
//!
//! | Key | Range | Default |
//! |-----|-------|---------|
//! | `dpi` | 120–400 | 200 |
//! | `module_height_mm` | 5–50 | 15 |
//! | `border_px` | 0–25 | 10 |
//! | `font_size_pt` | 0–15 (0 hides the text line) | 6 |
//! | `input_column` | `A`–`XFD` | `B` |
//! | `output_column` | `A`–`XFD` | `A` |
//! | `symbology` | `ean8`, `ean13`, `upca`, `code39` | `ean8` |
//! | `padding` | bool | `false` |
//! | `skip_header` | bool | `false` |
//!
//! A settings file with a missing key or an out-of-range value is rejected
//! with [`ConfigError::Corrupt`]; nothing falls back to defaults silently.
//! The user resets the file with `--reset-config`.

mod store;

pub use store::{SettingsStore, default_settings_path};

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use thiserror::Error;

use crate::code::Symbology;
use crate::render::RenderOptions;
use crate::workbook::address::column_index;

pub const DPI_RANGE: RangeInclusive<u32> = 120..=400;
pub const MODULE_HEIGHT_RANGE: RangeInclusive<f32> = 5.0..=50.0;
pub const BORDER_RANGE: RangeInclusive<u32> = 0..=25;
pub const FONT_SIZE_RANGE: RangeInclusive<u32> = 0..=15;

/// Errors from loading, validating or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "Settings file {path} is invalid ({message}). Run with --reset-config to restore defaults"
    )]
    Corrupt { path: PathBuf, message: String },

    #[error("Invalid value for '{key}': {message}")]
    OutOfRange { key: &'static str, message: String },

    #[error("Unknown setting '{0}'")]
    UnknownKey(String),
}

/// Persisted rendering and layout parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Output resolution used to convert millimetres to pixels.
    pub dpi: u32,
    /// Bar height in millimetres.
    pub module_height_mm: f32,
    /// White border added around each image, in pixels.
    pub border_px: u32,
    /// Human-readable text size in points.
    pub font_size_pt: u32,
    /// Column holding the codes.
    pub input_column: String,
    /// Column the images are anchored in.
    pub output_column: String,
    pub symbology: Symbology,
    /// Zero-pad short numeric codes instead of rejecting them.
    pub padding: bool,
    /// Leave row 1 alone (header row).
    pub skip_header: bool,
    #[serde(default)]
    pub last_input_dir: Option<PathBuf>,
    #[serde(default)]
    pub last_output_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dpi: 200,
            module_height_mm: 15.0,
            border_px: 10,
            font_size_pt: 6,
            input_column: "B".to_string(),
            output_column: "A".to_string(),
            symbology: Symbology::Ean8,
            padding: false,
            skip_header: false,
            last_input_dir: None,
            last_output_dir: None,
        }
    }
}

impl Settings {
    /// Keys accepted by [`Settings::set`].
    pub const KEYS: [&'static str; 11] = [
        "dpi",
        "module_height_mm",
        "border_px",
        "font_size_pt",
        "input_column",
        "output_column",
        "symbology",
        "padding",
        "skip_header",
        "last_input_dir",
        "last_output_dir",
    ];

    /// Check every value against its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("dpi", self.dpi, &DPI_RANGE)?;
        if !MODULE_HEIGHT_RANGE.contains(&self.module_height_mm) {
            return Err(ConfigError::OutOfRange {
                key: "module_height_mm",
                message: format!(
                    "{} is outside {}..={}",
                    self.module_height_mm,
                    MODULE_HEIGHT_RANGE.start(),
                    MODULE_HEIGHT_RANGE.end()
                ),
            });
        }
        check_range("border_px", self.border_px, &BORDER_RANGE)?;
        check_range("font_size_pt", self.font_size_pt, &FONT_SIZE_RANGE)?;
        self.input_column_index()?;
        self.output_column_index()?;
        Ok(())
    }

    pub fn input_column_index(&self) -> Result<u16, ConfigError> {
        column_index(&self.input_column).map_err(|message| ConfigError::OutOfRange {
            key: "input_column",
            message,
        })
    }

    pub fn output_column_index(&self) -> Result<u16, ConfigError> {
        column_index(&self.output_column).map_err(|message| ConfigError::OutOfRange {
            key: "output_column",
            message,
        })
    }

    /// First zero-based row the pipeline reads.
    pub fn first_row(&self) -> u32 {
        if self.skip_header { 1 } else { 0 }
    }

    /// Rendering parameters derived from these settings.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            dpi: self.dpi,
            module_height_mm: self.module_height_mm,
            font_size_pt: self.font_size_pt,
            ..RenderOptions::default()
        }
    }

    /// Set one value from its textual form, then re-validate.
    ///
    /// On error the settings are left unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut next = self.clone();
        let value = value.trim();

        match key {
            "dpi" => next.dpi = parse_value("dpi", value)?,
            "module_height_mm" => next.module_height_mm = parse_value("module_height_mm", value)?,
            "border_px" => next.border_px = parse_value("border_px", value)?,
            "font_size_pt" => next.font_size_pt = parse_value("font_size_pt", value)?,
            "input_column" => next.input_column = value.to_ascii_uppercase(),
            "output_column" => next.output_column = value.to_ascii_uppercase(),
            "symbology" => {
                next.symbology = value.parse().map_err(|message| ConfigError::OutOfRange {
                    key: "symbology",
                    message,
                })?
            }
            "padding" => next.padding = parse_value("padding", value)?,
            "skip_header" => next.skip_header = parse_value("skip_header", value)?,
            "last_input_dir" => next.last_input_dir = optional_path(value),
            "last_output_dir" => next.last_output_dir = optional_path(value),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }

        next.validate()?;
        *self = next;
        Ok(())
    }
}

fn check_range(key: &'static str, value: u32, range: &RangeInclusive<u32>) -> Result<(), ConfigError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            key,
            message: format!("{} is outside {}..={}", value, range.start(), range.end()),
        })
    }
}

fn parse_value<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::OutOfRange {
        key,
        message: format!("'{}': {}", value, e),
    })
}

fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}
