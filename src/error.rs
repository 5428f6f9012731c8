//! # Error Types
//!
//! This module defines the crate-level error that rolls up the errors of the
//! individual modules.

use thiserror::Error;

use crate::code::ValidationError;
use crate::config::ConfigError;
use crate::render::RenderError;
use crate::workbook::WorkbookError;

/// Main error type for xlbarcode operations
#[derive(Debug, Error)]
pub enum XlBarcodeError {
    /// A code was rejected by the normalizer
    #[error("Invalid code: {0}")]
    Validation(#[from] ValidationError),

    /// Barcode encoding or image failure
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Opening, copying or saving a workbook
    #[error(transparent)]
    Workbook(#[from] WorkbookError),

    /// Settings could not be loaded, saved or applied
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A background job panicked or was aborted
    #[error("Job failed: {0}")]
    Task(String),

    /// HTTP server error
    #[error("Server error: {0}")]
    Server(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
