//! Site inventory reconciliation server
//!
//! Operators record equipment against telecom sites. This crate holds the
//! reconciliation engine (duplicate detection, catalog cascade, category
//! requirement gate, draft lifecycle) and a REST JSON API over it.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod reconcile;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
