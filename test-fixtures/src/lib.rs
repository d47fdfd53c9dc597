//! Test fixture loader and synthetic feature generators shared by the
//! anamnesis crates' tests.

use std::path::PathBuf;

use anamnesis_core::errors::AnamnesisResult;
use anamnesis_core::models::TaskId;
use anamnesis_core::traits::{ExtractorOutput, FeatureExtractor};
use nalgebra::DMatrix;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::de::DeserializeOwned;

/// Root directory of the test-fixtures folder.
fn fixtures_root() -> PathBuf {
    // Works from any crate in the workspace: walk up to find test-fixtures.
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut path = PathBuf::from(&manifest_dir);

    while !path.join("test-fixtures").join("taxonomy").exists() {
        if !path.pop() {
            panic!(
                "Could not find test-fixtures directory from CARGO_MANIFEST_DIR={}",
                manifest_dir
            );
        }
    }
    path.join("test-fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let content = load_fixture_text(relative_path);
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", relative_path, e))
}

/// Read a fixture file as text (TOML configs, raw JSON).
pub fn load_fixture_text(relative_path: &str) -> String {
    let path = fixtures_root().join(relative_path);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// `n` rows drawn i.i.d. from N(mean, std²·I).
pub fn gaussian_cloud(mean: &[f64], std: f64, n: usize, seed: u64) -> DMatrix<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    DMatrix::from_fn(n, mean.len(), |_, c| {
        let z: f64 = StandardNormal.sample(&mut rng);
        mean[c] + std * z
    })
}

/// A backbone stand-in that looks inputs up in a fixed feature table.
///
/// An input is a list of row indices; `pre_logits` are those rows,
/// `features` their L2-normalised copies, and `logits` their projection
/// onto `num_classes` fixed directions.
#[derive(Debug, Clone)]
pub struct TableExtractor {
    pub table: DMatrix<f64>,
    pub num_classes: usize,
}

impl TableExtractor {
    pub fn new(table: DMatrix<f64>, num_classes: usize) -> Self {
        Self { table, num_classes }
    }
}

impl FeatureExtractor for TableExtractor {
    type Input = Vec<usize>;

    fn extract(&self, input: &Vec<usize>, _task: Option<TaskId>) -> AnamnesisResult<ExtractorOutput> {
        let d = self.table.ncols();
        let pre_logits = DMatrix::from_fn(input.len(), d, |r, c| self.table[(input[r], c)]);
        let mut features = pre_logits.clone();
        for mut row in features.row_iter_mut() {
            let norm = row.norm();
            if norm > 0.0 {
                row /= norm;
            }
        }
        let logits = DMatrix::from_fn(input.len(), self.num_classes, |r, k| {
            pre_logits[(r, k % d.max(1))]
        });
        Ok(ExtractorOutput {
            features,
            logits,
            pre_logits,
        })
    }

    fn feature_dim(&self) -> usize {
        self.table.ncols()
    }
}
