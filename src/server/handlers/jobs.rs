//! Workbook job handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::job;
use crate::render::BarcodeRenderer;
use crate::workbook::Session;

use crate::config::Settings;

use super::super::state::{AppState, JobEntry, JobStatus, MAX_FINISHED_JOBS, prune_finished};

/// Form data for starting a job.
#[derive(Debug, Deserialize)]
pub struct StartJobForm {
    /// Workbook to read
    pub input: PathBuf,
    /// Workbook to write
    pub output: PathBuf,
}

/// Handle POST /api/jobs - start processing a workbook.
pub async fn start(
    State(state): State<Arc<AppState>>,
    Json(form): Json<StartJobForm>,
) -> Result<(StatusCode, Json<JobStatus>), (StatusCode, String)> {
    if form.input.as_os_str().is_empty() || form.output.as_os_str().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Input and output paths are required".to_string(),
        ));
    }

    let settings = remember_dirs(&state, &form.input, &form.output).await?;

    let mut session = Session::new(form.input.clone(), form.output.clone(), settings.clone());
    session.images = state.config.images.clone();
    session.keep_images = state.config.keep_images;

    let renderer = Arc::new(BarcodeRenderer::new(settings.render_options()));
    let job = job::spawn(session, renderer);
    let id = job.id;
    let (cancel, mut events, handle) = job.into_parts();

    let status = JobStatus::new(id, form.input, form.output);
    {
        let mut jobs = state.jobs.write().await;
        let removed = prune_finished(&mut jobs, MAX_FINISHED_JOBS);
        if removed > 0 {
            tracing::debug!(removed, "dropped finished jobs");
        }
        jobs.insert(id, JobEntry::new(status.clone(), cancel));
    }

    let tracker = state.clone();
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Some(entry) = tracker.jobs.write().await.get_mut(&id) {
                entry.status.apply(event);
            }
        }
        if let Err(e) = handle.await {
            tracing::error!(job = %id, error = %e, "job task aborted");
            if let Some(entry) = tracker.jobs.write().await.get_mut(&id) {
                entry.status.finished = true;
                entry.status.error = Some(e.to_string());
            }
        }
    });

    Ok((StatusCode::ACCEPTED, Json(status)))
}

/// Handle GET /api/jobs - list all jobs.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<JobStatus>> {
    let jobs = state.jobs.read().await;
    let mut statuses: Vec<JobStatus> = jobs.values().map(|e| e.status.clone()).collect();
    statuses.sort_by(|a, b| a.input.cmp(&b.input));
    Json(statuses)
}

/// Handle GET /api/jobs/:id - job status.
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobStatus>, (StatusCode, String)> {
    let jobs = state.jobs.read().await;
    jobs.get(&id)
        .map(|entry| Json(entry.status.clone()))
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Unknown job {}", id)))
}

/// Handle POST /api/jobs/:id/cancel - request cancellation.
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobStatus>, (StatusCode, String)> {
    let jobs = state.jobs.read().await;
    let entry = jobs
        .get(&id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Unknown job {}", id)))?;

    if !entry.status.finished {
        tracing::info!(job = %id, "cancellation requested");
        entry.cancel.cancel();
    }
    Ok(Json(entry.status.clone()))
}

/// Store the parent directories of the chosen files as the new defaults.
///
/// The settings lock is released before the file is written; the write runs
/// on the blocking pool.
async fn remember_dirs(
    state: &Arc<AppState>,
    input: &std::path::Path,
    output: &std::path::Path,
) -> Result<Settings, (StatusCode, String)> {
    let settings = {
        let mut settings = state.settings.write().await;
        settings.last_input_dir = input.parent().map(|p| p.to_path_buf());
        settings.last_output_dir = output.parent().map(|p| p.to_path_buf());
        settings.clone()
    };

    let store = state.store.clone();
    let to_save = settings.clone();
    let saved = tokio::task::spawn_blocking(move || store.save(&to_save))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task error: {}", e)))?;
    if let Err(e) = saved {
        tracing::warn!(error = %e, "failed to remember directories");
    }
    Ok(settings)
}
