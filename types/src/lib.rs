//! Core domain types for boxit.
//!
//! This crate contains the tagged result and its opaque error payload. No IO,
//! no async, and minimal dependencies, so every layer can depend on it.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod mode;
mod result;
mod thrown;

pub use mode::ExecutionMode;
pub use result::ResultBox;
pub use thrown::Thrown;
