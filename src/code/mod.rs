//! # Codes
//!
//! Validation and normalization of the codes read from spreadsheet cells.
//!
//! ## Modules
//!
//! - [`symbology`]: Supported symbologies and their payload rules
//! - [`normalize`]: The normalizer and its error type
//!
//! A [`CodeRecord`] lives for one row (or one single export): it is built
//! from the cell text, handed to the renderer if normalization succeeded, and
//! dropped. Only a [`NormalizedCode`] can be rendered, so a record that
//! failed validation has no way to reach the renderer.

pub mod normalize;
pub mod symbology;

pub use normalize::{ValidationError, normalize};
pub use symbology::{NumericRule, Symbology};

/// A code that passed validation for its symbology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCode {
    symbology: Symbology,
    text: String,
}

impl NormalizedCode {
    /// Normalize `raw` and wrap the result.
    pub fn new(raw: &str, symbology: Symbology, padding: bool) -> Result<Self, ValidationError> {
        let text = normalize(raw, symbology, padding)?;
        Ok(Self { symbology, text })
    }

    pub fn symbology(&self) -> Symbology {
        self.symbology
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// One cell's code, before and after normalization.
#[derive(Debug, Clone)]
pub struct CodeRecord {
    pub raw_text: String,
    pub symbology: Symbology,
    pub padding_enabled: bool,
    pub normalized: Result<NormalizedCode, ValidationError>,
}

impl CodeRecord {
    /// Build a record from cell text. Surrounding whitespace is stripped
    /// before normalization.
    pub fn from_cell(raw_text: &str, symbology: Symbology, padding_enabled: bool) -> Self {
        let normalized = NormalizedCode::new(raw_text.trim(), symbology, padding_enabled);
        Self {
            raw_text: raw_text.to_string(),
            symbology,
            padding_enabled,
            normalized,
        }
    }

    /// The normalized text, if validation succeeded.
    pub fn normalized_text(&self) -> Option<&str> {
        self.normalized.as_ref().ok().map(NormalizedCode::as_str)
    }
}
