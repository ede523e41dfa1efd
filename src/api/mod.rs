//! API handlers for BiblioApp REST endpoints

pub mod auth;
pub mod books;
pub mod comments;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod stats;
