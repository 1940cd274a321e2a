//! Marigold Core - Shared types library.
//!
//! This crate provides common types used across all Marigold components:
//! - `server` - REST API serving the storefront and admin back office
//! - `cli` - Command-line tools for index sync, seeding, and admin bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Email, shipping address, role, and status types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
