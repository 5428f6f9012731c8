//! Settings API handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use crate::config::Settings;

use super::super::state::AppState;

/// GET /api/settings - Current settings.
pub async fn get(State(state): State<Arc<AppState>>) -> Json<Settings> {
    let settings = state.settings.read().await;
    Json(settings.clone())
}

/// Request body for updating settings.
///
/// Either a complete settings object or a single `{"key": ..., "value": ...}`
/// pair. Full settings are tried first.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum UpdateSettingsRequest {
    Full(Settings),
    Field {
        key: String,
        value: serde_json::Value,
    },
}

/// PUT /api/settings - Validate, persist and apply new settings.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<Settings>, (StatusCode, String)> {
    let mut settings = state.settings.write().await;

    let next = match req {
        UpdateSettingsRequest::Full(next) => {
            next.validate()
                .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
            next
        }
        UpdateSettingsRequest::Field { key, value } => {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            let mut next = settings.clone();
            next.set(&key, &value)
                .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
            next
        }
    };

    state
        .store
        .save(&next)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    tracing::info!(path = %state.store.path().display(), "settings updated");

    *settings = next.clone();
    Ok(Json(next))
}
