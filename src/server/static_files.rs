//! Static file serving for the frontend.

use axum::{extract::State, response::Html};
use std::sync::Arc;

use super::state::AppState;

/// Embedded single-page frontend.
static INDEX_HTML: &str = include_str!("../../frontend/index.html");

/// Serve index.html with the boot time injected for cache busting.
pub async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let script = format!(
        "<script>window.__BOOT_TIME={}</script></head>",
        state.boot_time
    );
    Html(INDEX_HTML.replace("</head>", &script))
}
