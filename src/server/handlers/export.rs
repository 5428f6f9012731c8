//! Single barcode export handler.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::config::Settings;
use crate::error::XlBarcodeError;
use crate::export::export_png;

use super::super::state::AppState;

/// Form data for an export.
#[derive(Debug, Deserialize)]
pub struct ExportForm {
    /// Code to render
    pub code: String,
    /// Settings for this export only; defaults to the saved settings
    pub settings: Option<Settings>,
}

/// Handle POST /api/export - render one barcode as PNG.
pub async fn export(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ExportForm>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let settings = match form.settings {
        Some(settings) => settings,
        None => state.settings.read().await.clone(),
    };

    let png_bytes = export_png(&form.code, &settings).map_err(|e| {
        let status = match &e {
            XlBarcodeError::Validation(_) | XlBarcodeError::Configuration(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, e.to_string())
    })?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png_bytes))
}
