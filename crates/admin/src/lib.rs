//! Berkasman admin portal library.
//!
//! Authentication, role-based authorization and Super Admin account
//! management for the Berkasman document and book-production portal. The
//! binary in `main.rs` wires these pieces to configuration and a server; the
//! library form lets integration tests drive the full router in-process.
//!
//! # Layers
//!
//! - [`db`] - credential store (`PostgreSQL` or in-memory)
//! - [`services`] - password hashing, session tokens, login, account management
//! - [`middleware`] - the authorization gate and session cookie handling
//! - [`routes`] - axum handlers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use config::AdminConfig;
pub use error::AppError;
pub use state::AppState;
