use nalgebra::DMatrix;

use crate::errors::DensityError;

/// Exact collective over cooperating workers.
///
/// All workers must call the same operations in the same order. There is no
/// timeout: a stalled worker stalls everyone.
pub trait Collective: Send + Sync {
    fn rank(&self) -> usize;

    fn world_size(&self) -> usize;

    /// Block until every worker has arrived.
    fn barrier(&self) -> Result<(), DensityError>;

    /// Exchange local row sets. Returns every worker's rows in rank order,
    /// identical on all workers.
    fn all_gather(&self, local: &DMatrix<f64>) -> Result<Vec<DMatrix<f64>>, DensityError>;
}
