//! BiblioApp Library Management Backend
//!
//! A Rust implementation of the BiblioApp library server: catalog and loans
//! in PostgreSQL, free-text reviews in MongoDB, and a REST JSON API for the
//! presentation layer.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
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
