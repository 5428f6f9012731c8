//! # xlbarcode - Barcodes for Spreadsheets
//!
//! xlbarcode reads a column of codes from an `.xlsx` workbook, renders a
//! barcode image for each row and saves a copy of the workbook with the
//! images anchored in another column. It provides:
//!
//! - **Normalization**: per-symbology validation and optional zero padding
//! - **Rendering**: EAN-8, EAN-13, UPC-A and Code 39 with a human-readable line
//! - **Workbook pipeline**: row loop with intermediate saves and cancellation
//! - **Front-ends**: a CLI and a small HTTP server
//!
//! ## Quick Start
//!
//! ```no_run
//! use xlbarcode::{
//!     config::Settings,
//!     job::{CancelToken, ProgressSender},
//!     render::BarcodeRenderer,
//!     workbook::{self, Session},
//! };
//!
//! let settings = Settings::default();
//! let renderer = BarcodeRenderer::new(settings.render_options());
//! let session = Session::new("codes.xlsx", "codes-with-barcodes.xlsx", settings);
//!
//! let summary = workbook::run(
//!     &session,
//!     &renderer,
//!     &CancelToken::new(),
//!     &ProgressSender::default(),
//! )?;
//! println!("{} barcodes inserted", summary.inserted.len());
//!
//! # Ok::<(), xlbarcode::XlBarcodeError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`code`] | Symbologies and code normalization |
//! | [`render`] | Barcode rasterization and PNG output |
//! | [`workbook`] | Spreadsheet I/O and the row pipeline |
//! | [`job`] | Background jobs, progress and cancellation |
//! | [`config`] | Persisted settings |
//! | [`export`] | Single barcode export |
//! | [`server`] | HTTP interface |
//! | [`logging`] | Subscriber setup |
//! | [`error`] | Error types |

pub mod code;
pub mod config;
pub mod error;
pub mod export;
pub mod job;
pub mod logging;
pub mod render;
pub mod server;
pub mod workbook;

// Re-exports for convenience
pub use code::{NormalizedCode, Symbology};
pub use config::Settings;
pub use error::XlBarcodeError;
