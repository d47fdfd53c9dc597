//! # anamnesis-observability
//!
//! Tracing subscriber initialisation and one named span per engine phase.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, init_tracing_with_filter};
