/// Anamnesis version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Diagonal regulariser added to every covariance / variance before it is
/// inverted, factorised, or square-rooted.
pub const COVARIANCE_REGULARIZER: f64 = 1e-4;

/// Per-class synthetic sample unit is `batch_size * SAMPLES_PER_CLASS_MULTIPLIER`.
pub const SAMPLES_PER_CLASS_MULTIPLIER: usize = 5;

/// Distance reported for classes without a stored distribution when scoring.
pub const UNKNOWN_CLASS_DISTANCE: f64 = 1e12;

/// Checkpoint format version written by the calibration crate.
pub const CHECKPOINT_FORMAT_VERSION: u32 = 1;
