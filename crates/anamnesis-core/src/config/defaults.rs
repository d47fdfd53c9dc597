// Single source of truth for all default values.

// --- Density ---
pub const DEFAULT_DISTRIBUTION_MODE: &str = "covariance";
pub const DEFAULT_N_CENTROIDS: usize = 10;
pub const DEFAULT_KMEANS_MAX_ITERATIONS: usize = 100;
pub const DEFAULT_KMEANS_TOLERANCE: f64 = 1e-4;

// --- Rehearsal ---
pub const DEFAULT_BATCH_SIZE: usize = 24;
pub const DEFAULT_SAMPLE_MULTIPLIER: usize = 5;
pub const DEFAULT_SEED: u64 = 42;

// --- Transport ---
pub const DEFAULT_DISTANCE_STRATEGY: &str = "sampling";
pub const DEFAULT_GROUND_COST: &str = "squared-euclidean";

// --- Contrastive ---
pub const DEFAULT_TEMPERATURE: f64 = 0.1;
pub const DEFAULT_OT_WEIGHTING: bool = true;
pub const DEFAULT_DELTA: f64 = 1.0;
pub const DEFAULT_REG_GLOB: f64 = 0.1;
pub const DEFAULT_REG_SUB: f64 = 0.1;
pub const DEFAULT_PROTOTYPE_COEFFICIENT: f64 = 0.1;
pub const DEFAULT_PROTOTYPE_TEMPERATURE: f64 = 0.8;

// --- Calibration ---
pub const DEFAULT_CALIBRATION_EPOCHS: usize = 30;
pub const DEFAULT_CALIBRATION_LR: f64 = 0.005;
pub const DEFAULT_MOMENTUM: f64 = 0.9;
pub const DEFAULT_WEIGHT_DECAY: f64 = 5e-4;
pub const DEFAULT_OPTIMIZER: &str = "sgd";
pub const DEFAULT_ETA_MIN: f64 = 0.0;
pub const DEFAULT_MASK_UNSEEN: bool = true;
pub const DEFAULT_CALIBRATE_FIRST_TASK: bool = false;

// --- Scoring ---
pub const DEFAULT_MAHALANOBIS_JITTER: f64 = 1e-6;
pub const DEFAULT_ETA0: f64 = 1.0;
pub const DEFAULT_ETA: f64 = 0.1;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
