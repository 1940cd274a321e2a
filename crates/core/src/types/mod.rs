//! Core types for Marigold.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod email;
pub mod status;

pub use address::Address;
pub use email::{Email, EmailError};
pub use status::*;
