//! # Code Normalization
//!
//! Turns the text of a spreadsheet cell into a string the chosen symbology
//! accepts, or explains why it cannot.
//!
//! ## Numeric symbologies
//!
//! ```text
//! raw ──▶ empty? ──▶ all digits? ──▶ padding? ──no──▶ exact length?
//!                                       │
//!                                      yes
//!                                       ▼
//!                        left-pad to L ──▶ len > R? ──▶ right-pad to R
//! ```
//!
//! ## Code 39
//!
//! Uppercased; every run of characters outside `A-Z 0-9 . / * $ % + -`
//! collapses to one space. Spaces belong to such runs, so repeated spaces
//! also collapse.

use thiserror::Error;

use super::symbology::{NumericRule, Symbology};

/// Why a cell could not be turned into a code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("empty input")]
    Empty,

    #[error("not an integer")]
    NotAnInteger,

    #[error("more than {max} characters")]
    TooLong { max: usize },

    #[error("fewer than {required} characters")]
    TooShort { required: usize },
}

/// Normalize `raw` for `symbology`.
///
/// `raw` is expected to be stripped by the caller. The function is pure: the
/// result depends only on its three arguments.
///
/// ```
/// use xlbarcode::code::{normalize, Symbology, ValidationError};
///
/// assert_eq!(normalize("12345", Symbology::Ean8, true).unwrap(), "0123450");
/// assert_eq!(normalize("1234567", Symbology::Ean8, false).unwrap(), "1234567");
/// assert_eq!(
///     normalize("12a34", Symbology::Ean8, true),
///     Err(ValidationError::NotAnInteger)
/// );
/// ```
pub fn normalize(
    raw: &str,
    symbology: Symbology,
    padding: bool,
) -> Result<String, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::Empty);
    }

    match symbology.numeric_rule() {
        Some(rule) => normalize_numeric(raw, rule, padding),
        None => Ok(normalize_code39(raw)),
    }
}

fn normalize_numeric(
    raw: &str,
    rule: NumericRule,
    padding: bool,
) -> Result<String, ValidationError> {
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::NotAnInteger);
    }

    let too_long = ValidationError::TooLong { max: rule.required };

    if !padding {
        return match raw.len() {
            n if n > rule.required => Err(too_long),
            n if n < rule.required => Err(ValidationError::TooShort {
                required: rule.required,
            }),
            _ => Ok(raw.to_string()),
        };
    }

    let left = format!("{:0>width$}", raw, width = rule.pad_left_to);
    if left.len() > rule.pad_right_to {
        return Err(too_long);
    }

    Ok(format!("{:0<width$}", left, width = rule.pad_right_to))
}

/// Characters Code 39 can carry besides the space separator.
fn is_code39_char(ch: char) -> bool {
    matches!(ch, 'A'..='Z' | '0'..='9' | '.' | '/' | '*' | '$' | '%' | '+' | '-')
}

fn normalize_code39(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_gap = false;

    for ch in raw.chars().flat_map(char::to_uppercase) {
        if is_code39_char(ch) {
            out.push(ch);
            in_gap = false;
        } else if !in_gap {
            out.push(' ');
            in_gap = true;
        }
    }

    out
}
