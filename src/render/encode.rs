//! Barcode encoding.
//!
//! Uses the barcoders crate to turn a normalized code into modules
//! (1 = bar, 0 = space) and computes the human-readable line printed under
//! the bars.

use barcoders::sym::code39::Code39;
use barcoders::sym::ean8::EAN8;
use barcoders::sym::ean13::EAN13;

use super::RenderError;
use crate::code::{NormalizedCode, Symbology};

/// Number of digits UPC-A encodes before its check digit.
const UPCA_DIGITS: usize = 11;

/// Encoded modules plus the text shown beneath them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBarcode {
    pub modules: Vec<u8>,
    pub caption: String,
}

/// Encode a normalized code into bar modules.
pub fn encode(code: &NormalizedCode) -> Result<EncodedBarcode, RenderError> {
    let data = code.as_str();

    match code.symbology() {
        Symbology::Ean8 => {
            let modules = EAN8::new(data)
                .map_err(|e| encode_error(code, format!("{:?}", e)))?
                .encode();
            Ok(EncodedBarcode {
                modules,
                caption: with_check_digit(data),
            })
        }
        Symbology::Ean13 => {
            let modules = EAN13::new(data)
                .map_err(|e| encode_error(code, format!("{:?}", e)))?
                .encode();
            Ok(EncodedBarcode {
                modules,
                caption: with_check_digit(data),
            })
        }
        Symbology::UpcA => {
            // UPC-A is EAN-13 with a leading zero. A padded payload can be 12
            // digits long; only the first 11 are encoded.
            let digits = data.get(..UPCA_DIGITS).unwrap_or(data);
            let ean_payload = format!("0{}", digits);
            let modules = EAN13::new(&ean_payload)
                .map_err(|e| encode_error(code, format!("{:?}", e)))?
                .encode();
            Ok(EncodedBarcode {
                modules,
                caption: with_check_digit(digits),
            })
        }
        Symbology::Code39 => {
            let modules = Code39::new(data)
                .map_err(|e| encode_error(code, format!("{:?}", e)))?
                .encode();
            Ok(EncodedBarcode {
                modules,
                caption: data.to_string(),
            })
        }
    }
}

/// Append the EAN/UPC mod-10 check digit to a digit string.
///
/// Weights alternate 3, 1, 3, ... starting from the rightmost digit.
pub fn with_check_digit(digits: &str) -> String {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = (b - b'0') as u32;
            if i % 2 == 0 { d * 3 } else { d }
        })
        .sum();
    let check = (10 - sum % 10) % 10;
    format!("{}{}", digits, check)
}

fn encode_error(code: &NormalizedCode, reason: String) -> RenderError {
    RenderError::Encode {
        symbology: code.symbology(),
        data: code.as_str().to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: &str, symbology: Symbology) -> NormalizedCode {
        NormalizedCode::new(raw, symbology, false).unwrap()
    }

    #[test]
    fn test_check_digits() {
        // Well-known retail examples.
        assert_eq!(with_check_digit("590123412345"), "5901234123457");
        assert_eq!(with_check_digit("9638507"), "96385074");
        assert_eq!(with_check_digit("03600029145"), "036000291452");
    }

    #[test]
    fn test_ean8_module_count() {
        let encoded = encode(&code("9638507", Symbology::Ean8)).unwrap();
        // 3 + 4*7 + 5 + 4*7 + 3
        assert_eq!(encoded.modules.len(), 67);
        assert_eq!(encoded.caption, "96385074");
    }

    #[test]
    fn test_ean13_module_count() {
        let encoded = encode(&code("590123412345", Symbology::Ean13)).unwrap();
        // 3 + 6*7 + 5 + 6*7 + 3
        assert_eq!(encoded.modules.len(), 95);
        assert_eq!(encoded.caption, "5901234123457");
    }

    #[test]
    fn test_upca_uses_first_eleven_digits() {
        let padded = NormalizedCode::new("3600029145", Symbology::UpcA, true).unwrap();
        assert_eq!(padded.as_str(), "036000291450");

        let encoded = encode(&padded).unwrap();
        assert_eq!(encoded.modules.len(), 95);
        assert_eq!(encoded.caption, "036000291452");
    }

    #[test]
    fn test_code39_encodes_bars() {
        let encoded = encode(&code("HELLO-123", Symbology::Code39)).unwrap();
        assert!(encoded.modules.iter().any(|&m| m == 1));
        assert_eq!(encoded.caption, "HELLO-123");
    }
}
