//! Reading the input workbook with calamine.
//!
//! Every worksheet is loaded value-for-value so the output copy can carry
//! them; the first worksheet is the one the pipeline walks.

use calamine::{Data, Reader, open_workbook_auto};
use std::collections::BTreeMap;
use std::path::Path;

use super::WorkbookError;

/// A cell value as read from the source.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel serial date number.
    DateTime(f64),
    /// Error cells (`#DIV/0!` and friends) kept as text.
    Error(String),
}

impl CellValue {
    /// Text used as a code. Integral numbers drop their `.0`.
    pub fn as_code_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) | Self::DateTime(n) => format_number(*n),
            Self::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Self::Error(e) => e.clone(),
        }
    }
}

/// Format a number the way a user typed it: integers without decimals.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// One worksheet's non-empty cells, keyed by absolute (row, col).
#[derive(Debug, Clone, Default)]
pub struct SourceSheet {
    pub name: String,
    pub cells: BTreeMap<(u32, u16), CellValue>,
}

impl SourceSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    pub fn get(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// Code text at a cell; `None` for empty cells.
    pub fn text_at(&self, row: u32, col: u16) -> Option<String> {
        self.get(row, col).map(CellValue::as_code_text)
    }

    /// Last row holding any value, zero-based.
    pub fn last_row(&self) -> Option<u32> {
        self.cells.keys().map(|&(row, _)| row).max()
    }
}

/// All worksheets of the input file.
#[derive(Debug, Clone)]
pub struct SourceWorkbook {
    pub sheets: Vec<SourceSheet>,
}

impl SourceWorkbook {
    /// Open any format calamine understands (`.xlsx`, `.xlsm`, `.xls`, `.ods`).
    pub fn open(path: &Path) -> Result<Self, WorkbookError> {
        let open_error = |message: String| WorkbookError::Open {
            path: path.to_path_buf(),
            message,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| open_error(e.to_string()))?;
        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        if sheet_names.is_empty() {
            return Err(WorkbookError::NoSheets {
                path: path.to_path_buf(),
            });
        }

        let mut sheets = Vec::with_capacity(sheet_names.len());
        for name in &sheet_names {
            let range = workbook
                .worksheet_range(name)
                .map_err(|e| open_error(format!("sheet '{}': {}", name, e)))?;

            let mut sheet = SourceSheet::new(name.clone());
            let (start_row, start_col) = range.start().unwrap_or((0, 0));

            for (row, col, data) in range.used_cells() {
                let value = match data {
                    Data::Empty => continue,
                    Data::String(s) => CellValue::Text(s.clone()),
                    Data::Float(n) => CellValue::Number(*n),
                    Data::Int(n) => CellValue::Number(*n as f64),
                    Data::Bool(b) => CellValue::Bool(*b),
                    Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
                    Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
                    Data::Error(e) => CellValue::Error(format!("#{:?}", e)),
                };
                let abs_row = start_row + row as u32;
                let abs_col = (start_col as usize + col) as u16;
                sheet.cells.insert((abs_row, abs_col), value);
            }

            tracing::debug!(sheet = %name, cells = sheet.cells.len(), "sheet loaded");
            sheets.push(sheet);
        }

        Ok(Self { sheets })
    }

    /// The worksheet the pipeline processes (the first one).
    pub fn target(&self) -> Option<&SourceSheet> {
        self.sheets.first()
    }
}
