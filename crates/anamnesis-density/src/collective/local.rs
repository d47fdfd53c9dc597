use anamnesis_core::errors::DensityError;
use anamnesis_core::traits::Collective;
use nalgebra::DMatrix;

/// The single-worker collective: gathering returns the local set.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCollective;

impl Collective for LocalCollective {
    fn rank(&self) -> usize {
        0
    }

    fn world_size(&self) -> usize {
        1
    }

    fn barrier(&self) -> Result<(), DensityError> {
        Ok(())
    }

    fn all_gather(&self, local: &DMatrix<f64>) -> Result<Vec<DMatrix<f64>>, DensityError> {
        Ok(vec![local.clone()])
    }
}
