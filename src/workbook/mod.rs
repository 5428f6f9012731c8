//! # Workbook Processing
//!
//! Spreadsheet input, output and the per-row pipeline that ties them to the
//! normalizer and the renderer.
//!
//! ## Modules
//!
//! - [`address`]: Column letters and cell references
//! - [`source`]: Reading the input workbook (calamine)
//! - [`output`]: Writing the output workbook (rust_xlsxwriter)
//! - [`limits`]: Open-file budget for intermediate saves
//! - [`pipeline`]: The row loop

pub mod address;
pub mod limits;
pub mod output;
pub mod pipeline;
pub mod source;

pub use address::{CellRef, column_index, column_letters};
pub use output::OutputWorkbook;
pub use pipeline::{
    ImageLocation, InsertedRow, PipelineStage, PipelineSummary, Session, SkipKind, SkippedRow,
    run,
};
pub use source::{CellValue, SourceSheet, SourceWorkbook};

use std::path::PathBuf;
use thiserror::Error;

/// Workbook-level failures.
///
/// [`WorkbookError::Persistence`] aborts a run; [`WorkbookError::Cell`] only
/// skips its row.
#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("Failed to open workbook {path}: {message}")]
    Open { path: PathBuf, message: String },

    #[error("Workbook {path} contains no worksheets")]
    NoSheets { path: PathBuf },

    #[error("Failed to copy sheet '{sheet}': {message}")]
    Copy { sheet: String, message: String },

    #[error("Error saving workbook to {path} ({message}). Select another output file")]
    Persistence { path: PathBuf, message: String },

    #[error("Failed to update cell {cell}: {message}")]
    Cell { cell: String, message: String },

    #[error("Failed to create image directory {path}: {source}")]
    ImageDir {
        path: PathBuf,
        source: std::io::Error,
    },
}
