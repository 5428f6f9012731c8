//! # Barcode Symbologies
//!
//! The four encodings a cell can be rendered as, with the payload rules the
//! normalizer enforces for each of them.
//!
//! | Symbology | Encoded as | Payload | Padding targets (left, right) |
//! |-----------|------------|---------|-------------------------------|
//! | `ean8`    | EAN-8      | 7 digits  | 6, 7   |
//! | `ean13`   | EAN-13     | 12 digits | 11, 12 |
//! | `upca`    | UPC-A      | 11 digits | 11, 12 |
//! | `code39`  | Code 39    | `A-Z 0-9 . / * $ % + -` and space | n/a |
//!
//! The payload never includes the check digit; the renderer appends it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported barcode symbology.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbology {
    /// Short EAN (EAN-8), 7-digit payload.
    #[default]
    Ean8,
    /// Long EAN (EAN-13), 12-digit payload.
    Ean13,
    /// UPC-A, 11-digit payload.
    #[serde(alias = "upc_a")]
    UpcA,
    /// Code 39, alphanumeric with no length limit.
    Code39,
}

/// Length rules for the numeric symbologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericRule {
    /// Exact payload length when padding is disabled.
    pub required: usize,
    /// Zero-extend toward the front up to this length.
    pub pad_left_to: usize,
    /// Zero-extend toward the back up to this length.
    pub pad_right_to: usize,
}

impl Symbology {
    /// Every symbology, in menu order.
    pub const ALL: [Symbology; 4] = [
        Symbology::Ean8,
        Symbology::Ean13,
        Symbology::UpcA,
        Symbology::Code39,
    ];

    /// Short identifier used in settings files and on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Ean8 => "ean8",
            Self::Ean13 => "ean13",
            Self::UpcA => "upca",
            Self::Code39 => "code39",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ean8 => "EAN-8",
            Self::Ean13 => "EAN-13",
            Self::UpcA => "UPC-A",
            Self::Code39 => "Code 39",
        }
    }

    /// Whether the payload must consist of decimal digits.
    pub fn is_numeric(&self) -> bool {
        self.numeric_rule().is_some()
    }

    /// Length and padding rules, `None` for Code 39.
    ///
    /// UPC-A pads toward a 12-character intermediate although its unpadded
    /// payload is 11 digits. The renderer only encodes the first 11.
    pub fn numeric_rule(&self) -> Option<NumericRule> {
        match self {
            Self::Ean8 => Some(NumericRule {
                required: 7,
                pad_left_to: 6,
                pad_right_to: 7,
            }),
            Self::Ean13 => Some(NumericRule {
                required: 12,
                pad_left_to: 11,
                pad_right_to: 12,
            }),
            Self::UpcA => Some(NumericRule {
                required: 11,
                pad_left_to: 11,
                pad_right_to: 12,
            }),
            Self::Code39 => None,
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Symbology {
    type Err = String;

    /// Accepts the short id (`ean8`), the display name (`EAN-8`) or the
    /// descriptive aliases (`short-ean`, `long-ean`, `upc`, `alphanumeric`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(sym) = Self::ALL.into_iter().find(|sym| sym.display_name() == s) {
            return Ok(sym);
        }

        match s.to_lowercase().as_str() {
            "ean8" | "ean-8" | "short-ean" => Ok(Self::Ean8),
            "ean13" | "ean-13" | "long-ean" => Ok(Self::Ean13),
            "upca" | "upc-a" | "upc_a" | "upc" => Ok(Self::UpcA),
            "code39" | "code-39" | "alphanumeric" => Ok(Self::Code39),
            _ => Err(format!(
                "Unknown symbology '{}'. Use one of: ean8, ean13, upca, code39",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ids_and_aliases() {
        assert_eq!("ean8".parse::<Symbology>(), Ok(Symbology::Ean8));
        assert_eq!("Long-EAN".parse::<Symbology>(), Ok(Symbology::Ean13));
        assert_eq!("UPC-A".parse::<Symbology>(), Ok(Symbology::UpcA));
        assert_eq!("Code 39".parse::<Symbology>(), Ok(Symbology::Code39));
        assert!("qr".parse::<Symbology>().is_err());
    }

    #[test]
    fn test_id_round_trips() {
        for sym in Symbology::ALL {
            assert_eq!(sym.id().parse::<Symbology>(), Ok(sym));
        }
    }

    #[test]
    fn test_id_matches_serde_and_from_str() {
        for sym in Symbology::ALL {
            let json = serde_json::to_string(&sym).unwrap();
            assert_eq!(json, format!("\"{}\"", sym.id()));
            assert_eq!(serde_json::from_str::<Symbology>(&json).unwrap(), sym);
            assert_eq!(sym.id().parse::<Symbology>(), Ok(sym));
            assert_eq!(sym.to_string().parse::<Symbology>(), Ok(sym));
        }
    }

    #[test]
    fn test_upc_a_spelling_is_accepted() {
        assert_eq!("upc_a".parse::<Symbology>(), Ok(Symbology::UpcA));
        assert_eq!(
            serde_json::from_str::<Symbology>("\"upc_a\"").unwrap(),
            Symbology::UpcA
        );
    }

    #[test]
    fn test_default_is_ean8() {
        assert_eq!(Symbology::default(), Symbology::Ean8);
    }

    #[test]
    fn test_upca_rule_is_asymmetric() {
        let rule = Symbology::UpcA.numeric_rule().unwrap();
        assert_eq!(rule.required, 11);
        assert_eq!(rule.pad_right_to, 12);
    }

    #[test]
    fn test_code39_has_no_numeric_rule() {
        assert!(!Symbology::Code39.is_numeric());
        assert!(Symbology::Ean13.is_numeric());
    }
}
