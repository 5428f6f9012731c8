//! Writing the output workbook with rust_xlsxwriter.
//!
//! The output is rebuilt from the source values, then receives the barcode
//! images. Row heights and column widths are derived from image pixels with
//! two fixed factors:
//!
//! ```text
//! column width = ceil(image width  × 0.15)
//! row height   = ceil(image height × 0.75)
//! ```

use rust_xlsxwriter::{Format, Image, ObjectMovement, Workbook, Worksheet, XlsxError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::WorkbookError;
use super::address::CellRef;
use super::source::{CellValue, SourceSheet, SourceWorkbook};

/// Image width in pixels to column width units.
pub const COLUMN_WIDTH_FACTOR: f64 = 0.15;
/// Image height in pixels to row height units.
pub const ROW_HEIGHT_FACTOR: f64 = 0.75;

const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Column width for an image `width_px` wide.
pub fn column_width_for(width_px: u32) -> f64 {
    (width_px as f64 * COLUMN_WIDTH_FACTOR).ceil()
}

/// Row height for an image `height_px` tall.
pub fn row_height_for(height_px: u32) -> f64 {
    (height_px as f64 * ROW_HEIGHT_FACTOR).ceil()
}

/// The workbook being produced, plus a record of what was changed in it.
pub struct OutputWorkbook {
    workbook: Workbook,
    path: PathBuf,
    column_widths: BTreeMap<u16, f64>,
    row_heights: BTreeMap<u32, f64>,
    images: Vec<CellRef>,
    saves: usize,
}

impl OutputWorkbook {
    /// Copy every worksheet of `source` into a new workbook bound to `path`.
    ///
    /// The first worksheet stays first so image cells line up with the
    /// source rows.
    pub fn from_source(source: &SourceWorkbook, path: &Path) -> Result<Self, WorkbookError> {
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format(DATE_FORMAT);

        for sheet in &source.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(&sheet.name)
                .map_err(|e| WorkbookError::Copy {
                    sheet: sheet.name.clone(),
                    message: e.to_string(),
                })?;
            copy_cells(worksheet, sheet, &date_format).map_err(|e| WorkbookError::Copy {
                sheet: sheet.name.clone(),
                message: e.to_string(),
            })?;
        }

        if source.sheets.is_empty() {
            workbook.add_worksheet();
        }

        Ok(Self {
            workbook,
            path: path.to_path_buf(),
            column_widths: BTreeMap::new(),
            row_heights: BTreeMap::new(),
            images: Vec::new(),
            saves: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Anchor the PNG at `png_path` to `cell` of the first worksheet.
    ///
    /// The image moves with its cell but is not resized by it.
    pub fn insert_image(&mut self, cell: CellRef, png_path: &Path) -> Result<(), WorkbookError> {
        let image = Image::new(png_path)
            .map_err(|e| cell_error(cell, e))?
            .set_object_movement(ObjectMovement::MoveButDontSizeWithCells);

        self.target()
            .and_then(|ws| ws.insert_image(cell.row, cell.col, &image))
            .map_err(|e| cell_error(cell, e))?;

        self.images.push(cell);
        Ok(())
    }

    /// Size `cell`'s row and column to an image of the given pixel size.
    ///
    /// The row takes this image's height; the column keeps the widest
    /// image placed in it so far.
    pub fn fit_cell(&mut self, cell: CellRef, width_px: u32, height_px: u32) -> Result<(), WorkbookError> {
        let height = row_height_for(height_px);
        let width = column_width_for(width_px).max(
            self.column_widths
                .get(&cell.col)
                .copied()
                .unwrap_or(0.0),
        );

        let ws = self.target().map_err(|e| cell_error(cell, e))?;
        ws.set_row_height(cell.row, height)
            .map_err(|e| cell_error(cell, e))?;
        ws.set_column_width(cell.col, width)
            .map_err(|e| cell_error(cell, e))?;

        self.row_heights.insert(cell.row, height);
        self.column_widths.insert(cell.col, width);
        Ok(())
    }

    /// Write the workbook to its path.
    pub fn save(&mut self) -> Result<(), WorkbookError> {
        self.workbook
            .save(&self.path)
            .map_err(|e| WorkbookError::Persistence {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        self.saves += 1;
        tracing::debug!(path = %self.path.display(), saves = self.saves, "workbook saved");
        Ok(())
    }

    /// Cells that received an image, in insertion order.
    pub fn images(&self) -> &[CellRef] {
        &self.images
    }

    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.row_heights.get(&row).copied()
    }

    pub fn column_width(&self, col: u16) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    /// Number of completed saves.
    pub fn saves(&self) -> usize {
        self.saves
    }

    fn target(&mut self) -> Result<&mut Worksheet, XlsxError> {
        self.workbook.worksheet_from_index(0)
    }
}

fn copy_cells(worksheet: &mut Worksheet, sheet: &SourceSheet, date_format: &Format) -> Result<(), XlsxError> {
    for (&(row, col), value) in &sheet.cells {
        match value {
            CellValue::Text(s) | CellValue::Error(s) => {
                worksheet.write_string(row, col, s)?;
            }
            CellValue::Number(n) => {
                worksheet.write_number(row, col, *n)?;
            }
            CellValue::Bool(b) => {
                worksheet.write_boolean(row, col, *b)?;
            }
            CellValue::DateTime(serial) => {
                worksheet.write_number_with_format(row, col, *serial, date_format)?;
            }
        }
    }
    Ok(())
}

fn cell_error(cell: CellRef, e: XlsxError) -> WorkbookError {
    WorkbookError::Cell {
        cell: cell.to_string(),
        message: e.to_string(),
    }
}
