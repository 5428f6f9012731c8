//! # Workbook Pipeline
//!
//! Walks the target worksheet row by row, renders a barcode for every valid
//! code and anchors it in the output column of the same row.
//!
//! ## Stages
//!
//! ```text
//! Idle → Opening → Running(row) ⇄ SavingIntermediate → Finalizing → Cleanup → Idle
//!           │            │                 │                │
//!           └────────────┴─────────────────┴────────────────┴──▶ Failed
//! ```
//!
//! - **Opening** reads the source, copies it and saves the copy once to make
//!   sure the output location is writable.
//! - **Running** skips rows whose code fails validation or rendering.
//! - **SavingIntermediate** happens whenever the images inserted since the
//!   last save reach the open-file threshold.
//! - **Finalizing** saves once more, also after cancellation.
//! - **Cleanup** deletes the PNG files unless they are kept.

use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

use super::WorkbookError;
use super::address::CellRef;
use super::limits::{open_file_limit, persist_threshold};
use super::output::OutputWorkbook;
use super::source::SourceWorkbook;
use crate::code::{CodeRecord, NormalizedCode, ValidationError};
use crate::config::Settings;
use crate::error::XlBarcodeError;
use crate::job::{CancelToken, ProgressEvent, ProgressSender};
use crate::render::{Renderer, add_border, save_png};

/// Pipeline state, reported through progress events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    Opening,
    Running,
    SavingIntermediate,
    Finalizing,
    Cleanup,
    Failed,
}

/// Where rendered PNG files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLocation {
    /// A fresh directory under the system temp dir.
    SystemTemp,
    /// A fresh directory inside the given one.
    Within(PathBuf),
}

/// Everything one batch run needs.
#[derive(Debug, Clone)]
pub struct Session {
    pub input: PathBuf,
    pub output: PathBuf,
    pub settings: Settings,
    pub images: ImageLocation,
    /// Leave the rendered PNG files on disk.
    pub keep_images: bool,
    /// Override for the detected open-file limit.
    pub file_limit: Option<u64>,
}

impl Session {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            settings,
            images: ImageLocation::SystemTemp,
            keep_images: false,
            file_limit: None,
        }
    }
}

/// Why a row was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    Validation,
    Render,
    Workbook,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertedRow {
    /// Anchor cell, e.g. `A3`.
    pub cell: String,
    pub row: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// Input cell, e.g. `B3`.
    pub cell: String,
    pub row: u32,
    pub kind: SkipKind,
    pub reason: String,
}

/// Result of a finished (or cancelled) run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineSummary {
    pub output: PathBuf,
    pub rows_seen: u32,
    pub inserted: Vec<InsertedRow>,
    pub skipped: Vec<SkippedRow>,
    pub intermediate_saves: u32,
    pub cancelled: bool,
    /// Set when the PNG files were kept.
    pub image_dir: Option<PathBuf>,
}

/// Directory holding the rendered PNG files of one run.
struct ImageDir {
    path: PathBuf,
    files: Vec<PathBuf>,
    keep: bool,
}

impl ImageDir {
    fn create(location: &ImageLocation, keep: bool) -> Result<Self, WorkbookError> {
        let name = format!("xlbarcode-{}", Uuid::new_v4());
        let path = match location {
            ImageLocation::SystemTemp => std::env::temp_dir().join(name),
            ImageLocation::Within(dir) => dir.join(name),
        };
        fs::create_dir_all(&path).map_err(|source| WorkbookError::ImageDir {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "image directory created");
        Ok(Self {
            path,
            files: Vec::new(),
            keep,
        })
    }

    fn file_for(&mut self, cell: CellRef) -> PathBuf {
        let file = self.path.join(format!("{}.png", cell));
        self.files.push(file.clone());
        file
    }

    /// Remove the files this run wrote, then the directory if it is empty.
    /// Returns the directory when the files are kept.
    fn cleanup(self) -> Option<PathBuf> {
        if self.keep {
            tracing::info!(path = %self.path.display(), "keeping barcode images");
            return Some(self.path);
        }
        for file in &self.files {
            if let Err(e) = fs::remove_file(file)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                tracing::warn!(file = %file.display(), error = %e, "failed to remove image");
            }
        }
        if let Err(e) = fs::remove_dir(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove image directory");
        }
        None
    }
}

/// Run the pipeline to completion or cancellation.
///
/// Row-level failures are recorded in the summary. Opening, persistence and
/// settings errors abort the run; the image directory is still cleaned up.
pub fn run(
    session: &Session,
    renderer: &dyn Renderer,
    cancel: &CancelToken,
    progress: &ProgressSender,
) -> Result<PipelineSummary, XlBarcodeError> {
    let settings = &session.settings;
    settings.validate()?;
    let input_col = settings.input_column_index()?;
    let output_col = settings.output_column_index()?;

    progress.stage(PipelineStage::Opening);
    tracing::info!(input = %session.input.display(), "opening workbook");
    let source = SourceWorkbook::open(&session.input)?;
    let sheet = source.target().ok_or_else(|| WorkbookError::NoSheets {
        path: session.input.clone(),
    })?;

    let mut output = OutputWorkbook::from_source(&source, &session.output)?;
    tracing::info!(output = %session.output.display(), "testing workbook save");
    output.save()?;

    let mut images = ImageDir::create(&session.images, session.keep_images)?;
    let threshold = persist_threshold(session.file_limit.unwrap_or_else(open_file_limit));

    let mut summary = PipelineSummary {
        output: session.output.clone(),
        ..Default::default()
    };

    let first_row = settings.first_row();
    let last_row = sheet.last_row().filter(|&last| last >= first_row);
    let total = last_row.map_or(0, |last| last - first_row + 1);

    progress.stage(PipelineStage::Running);
    let mut outcome: Result<(), XlBarcodeError> = Ok(());
    let mut since_save: u64 = 0;

    for row in last_row.map(|last| first_row..=last).into_iter().flatten() {
        if cancel.is_cancelled() {
            tracing::info!(row = row + 1, "cancellation requested, stopping");
            summary.cancelled = true;
            break;
        }

        summary.rows_seen += 1;
        progress.send(ProgressEvent::Row {
            done: summary.rows_seen,
            total,
        });

        let input_cell = CellRef::new(row, input_col);
        let output_cell = CellRef::new(row, output_col);
        let raw = sheet.text_at(row, input_col).unwrap_or_default();
        tracing::debug!(cell = %input_cell, raw = %raw, "processing row");

        let record = CodeRecord::from_cell(&raw, settings.symbology, settings.padding);
        let placed = match &record.normalized {
            Ok(code) => place_barcode(code, output_cell, renderer, settings, &mut images, &mut output),
            Err(e) => Err(RowFailure::Validation(e.clone())),
        };

        match placed {
            Ok((width, height)) => {
                tracing::debug!(cell = %output_cell, width, height, "image inserted");
                progress.send(ProgressEvent::Inserted {
                    cell: output_cell.to_string(),
                    width,
                    height,
                });
                summary.inserted.push(InsertedRow {
                    cell: output_cell.to_string(),
                    row,
                    width,
                    height,
                });
                since_save += 1;
            }
            Err(failure) => {
                let blank = matches!(failure, RowFailure::Validation(ValidationError::Empty));
                let skipped = failure.into_skipped(input_cell);
                if blank {
                    tracing::debug!(cell = %input_cell, "empty cell, skipping row");
                } else {
                    tracing::warn!(cell = %input_cell, reason = %skipped.reason, "skipping row");
                }
                progress.send(ProgressEvent::Skipped {
                    cell: skipped.cell.clone(),
                    reason: skipped.reason.clone(),
                });
                summary.skipped.push(skipped);
            }
        }

        if since_save >= threshold {
            progress.stage(PipelineStage::SavingIntermediate);
            tracing::info!(row = row + 1, images = since_save, "saving intermediate workbook");
            if let Err(e) = output.save() {
                outcome = Err(e.into());
                break;
            }
            summary.intermediate_saves += 1;
            since_save = 0;
            progress.stage(PipelineStage::Running);
        }
    }

    if outcome.is_ok() {
        progress.stage(PipelineStage::Finalizing);
        tracing::info!(output = %session.output.display(), "saving workbook");
        outcome = output.save().map_err(XlBarcodeError::from);
    }

    progress.stage(PipelineStage::Cleanup);
    summary.image_dir = images.cleanup();
    outcome?;

    tracing::info!(
        inserted = summary.inserted.len(),
        skipped = summary.skipped.len(),
        cancelled = summary.cancelled,
        "workbook processed"
    );
    progress.stage(PipelineStage::Idle);
    Ok(summary)
}

/// A row-local failure.
#[derive(Debug)]
enum RowFailure {
    Validation(ValidationError),
    Render(crate::render::RenderError),
    Workbook(WorkbookError),
}

impl RowFailure {
    fn into_skipped(self, cell: CellRef) -> SkippedRow {
        let (kind, reason) = match self {
            Self::Validation(e) => (SkipKind::Validation, e.to_string()),
            Self::Render(e) => (SkipKind::Render, e.to_string()),
            Self::Workbook(e) => (SkipKind::Workbook, e.to_string()),
        };
        SkippedRow {
            cell: cell.to_string(),
            row: cell.row,
            kind,
            reason,
        }
    }
}

/// Render, frame, write and anchor one barcode. Returns the image size.
fn place_barcode(
    code: &NormalizedCode,
    cell: CellRef,
    renderer: &dyn Renderer,
    settings: &Settings,
    images: &mut ImageDir,
    output: &mut OutputWorkbook,
) -> Result<(u32, u32), RowFailure> {
    let img = renderer.render(code).map_err(RowFailure::Render)?;
    let img = add_border(&img, settings.border_px);
    let (width, height) = img.dimensions();

    let png = images.file_for(cell);
    save_png(&img, &png).map_err(RowFailure::Render)?;

    output.insert_image(cell, &png).map_err(RowFailure::Workbook)?;
    output.fit_cell(cell, width, height).map_err(RowFailure::Workbook)?;
    Ok((width, height))
}
