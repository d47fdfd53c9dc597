//! Span definitions per phase: density estimation, distance fill, calibration,
//! contrastive training, evaluation scoring.

/// Create a density estimation span.
#[macro_export]
macro_rules! density_span {
    ($space:expr, $task:expr) => {
        tracing::info_span!("anamnesis.density", space = %$space, task = $task)
    };
}

/// Create a distance-matrix fill span.
#[macro_export]
macro_rules! transport_span {
    ($space:expr, $classes:expr) => {
        tracing::info_span!("anamnesis.transport", space = %$space, classes = $classes)
    };
}

/// Create a calibration span.
#[macro_export]
macro_rules! calibration_span {
    ($task:expr, $epochs:expr) => {
        tracing::info_span!("anamnesis.calibration", task = $task, epochs = $epochs)
    };
}

/// Create a contrastive objective span.
#[macro_export]
macro_rules! contrastive_span {
    ($task:expr) => {
        tracing::debug_span!("anamnesis.contrastive", task = $task)
    };
}

/// Create an evaluation scoring span.
#[macro_export]
macro_rules! scoring_span {
    ($rows:expr) => {
        tracing::debug_span!("anamnesis.scoring", rows = $rows)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const DENSITY: &str = "anamnesis.density";
    pub const TRANSPORT: &str = "anamnesis.transport";
    pub const CALIBRATION: &str = "anamnesis.calibration";
    pub const CONTRASTIVE: &str = "anamnesis.contrastive";
    pub const SCORING: &str = "anamnesis.scoring";
}
