//! Berkasman Core - Shared types library.
//!
//! This crate provides common types used across all Berkasman components:
//! - `admin` - The administration portal (HTTP server and account management)
//! - `cli` - Command-line tools for migrations and user bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database access,
//! no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails, plus the role model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
