//! `Collective` implementations.

mod local;
mod worker_group;

pub use local::LocalCollective;
pub use worker_group::{ThreadCollective, WorkerGroup};

use anamnesis_core::errors::DensityError;
use nalgebra::DMatrix;

/// Stack gathered row sets in rank order.
pub fn concat_rows(parts: &[DMatrix<f64>]) -> Result<DMatrix<f64>, DensityError> {
    let dim = parts.iter().find(|p| p.nrows() > 0).map(|p| p.ncols()).unwrap_or(0);
    let mut total = 0;
    for part in parts.iter().filter(|p| p.nrows() > 0) {
        if part.ncols() != dim {
            return Err(DensityError::DimensionMismatch {
                expected: dim,
                actual: part.ncols(),
            });
        }
        total += part.nrows();
    }
    let mut out = DMatrix::zeros(total, dim);
    let mut row = 0;
    for part in parts.iter().filter(|p| p.nrows() > 0) {
        out.rows_mut(row, part.nrows()).copy_from(part);
        row += part.nrows();
    }
    Ok(out)
}
