//! # HTTP Server
//!
//! Provides a web interface for editing settings, exporting single barcodes
//! and running workbook jobs.
//!
//! ## Usage
//!
//! ```bash
//! xlbarcode serve --listen 127.0.0.1:8080
//! ```
//!
//! Then open http://localhost:8080 in a browser to access the UI.
//!
//! ## Routes
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Web page |
//! | GET, PUT | `/api/settings` | Read or replace settings |
//! | POST | `/api/export` | Render one barcode (PNG) |
//! | GET, POST | `/api/jobs` | List jobs, start a job |
//! | GET | `/api/jobs/:id` | Job status |
//! | POST | `/api/jobs/:id/cancel` | Request cancellation |

mod handlers;
mod state;
mod static_files;

pub use state::{AppState, JobStatus, ServerConfig};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::error::XlBarcodeError;

/// Build the router for `state`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Frontend
        .route("/", get(static_files::index_handler))
        // Settings API
        .route(
            "/api/settings",
            get(handlers::settings::get).put(handlers::settings::update),
        )
        // Export API
        .route("/api/export", post(handlers::export::export))
        // Jobs API
        .route(
            "/api/jobs",
            get(handlers::jobs::list).post(handlers::jobs::start),
        )
        .route("/api/jobs/:id", get(handlers::jobs::status))
        .route("/api/jobs/:id/cancel", post(handlers::jobs::cancel))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use xlbarcode::server::{serve, ServerConfig};
/// use xlbarcode::config::default_settings_path;
/// use xlbarcode::workbook::ImageLocation;
///
/// # async fn example() -> Result<(), xlbarcode::XlBarcodeError> {
/// let config = ServerConfig {
///     listen_addr: "127.0.0.1:8080".to_string(),
///     settings_path: default_settings_path(),
///     images: ImageLocation::SystemTemp,
///     keep_images: false,
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), XlBarcodeError> {
    let app_state = Arc::new(AppState::new(config.clone())?);
    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            XlBarcodeError::Server(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    tracing::info!(
        listen = %config.listen_addr,
        settings = %config.settings_path.display(),
        "xlbarcode HTTP server started"
    );
    println!("Open http://{}/ in your browser", config.listen_addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| XlBarcodeError::Server(e.to_string()))?;

    Ok(())
}
