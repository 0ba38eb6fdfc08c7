//! Request middleware.
//!
//! Purpose: define middleware components for request lifecycle concerns.
//! Trace correlation lives here; bearer authentication and CORS sit with the
//! HTTP adapter because they depend on its ports and settings.

pub mod trace;

pub use trace::Trace;
