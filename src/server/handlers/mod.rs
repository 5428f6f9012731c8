//! HTTP handlers for the server.

pub mod export;
pub mod jobs;
pub mod settings;
