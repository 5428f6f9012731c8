//! # Cell Addressing
//!
//! Conversions between spreadsheet column letters (`A`, `B`, ..., `XFD`) and
//! zero-based indices, plus a small `CellRef` used in log lines and error
//! messages.

use std::fmt;

/// Largest column index an `.xlsx` sheet allows (`XFD`).
pub const MAX_COLUMN: u16 = 16_383;

/// Largest zero-based row index an `.xlsx` sheet allows.
pub const MAX_ROW: u32 = 1_048_575;

/// Parse column letters into a zero-based index.
///
/// Case-insensitive; surrounding whitespace is ignored.
///
/// ```
/// use xlbarcode::workbook::address::column_index;
///
/// assert_eq!(column_index("A"), Ok(0));
/// assert_eq!(column_index("b"), Ok(1));
/// assert_eq!(column_index("AA"), Ok(26));
/// assert!(column_index("A1").is_err());
/// ```
pub fn column_index(letters: &str) -> Result<u16, String> {
    let letters = letters.trim();
    if letters.is_empty() {
        return Err("Column letters cannot be empty".to_string());
    }

    let mut index: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(format!("Invalid column '{}': use letters only", letters));
        }
        let digit = (ch.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        index = index * 26 + digit;
        if index > MAX_COLUMN as u32 + 1 {
            return Err(format!("Column '{}' is beyond XFD", letters));
        }
    }

    Ok((index - 1) as u16)
}

/// Format a zero-based column index as letters.
pub fn column_letters(index: u16) -> String {
    let mut n = index as u32 + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        out.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// A cell position, zero-based internally and `B3`-style when displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.col), self.row + 1)
    }
}
