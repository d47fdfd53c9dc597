//! RehearsalBuffer: the last calibration epoch's synthetic samples.

use anamnesis_core::models::SyntheticBatch;
use rand::seq::index;
use rand::Rng;

/// Synthetic rows kept from the most recent calibration epoch, replayed in
/// small slices during the next task's ordinary training.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RehearsalBuffer {
    batch: Option<SyntheticBatch>,
}

impl RehearsalBuffer {
    pub fn new(batch: SyntheticBatch) -> Self {
        Self { batch: Some(batch) }
    }

    pub fn len(&self) -> usize {
        self.batch.as_ref().map_or(0, SyntheticBatch::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn batch(&self) -> Option<&SyntheticBatch> {
        self.batch.as_ref()
    }

    /// Swap in a new epoch's samples.
    pub fn replace(&mut self, batch: SyntheticBatch) {
        self.batch = Some(batch);
    }

    /// Up to `n` rows chosen uniformly without replacement. Returns `None`
    /// when nothing is buffered.
    pub fn replay_slice<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Option<SyntheticBatch> {
        let batch = self.batch.as_ref().filter(|b| !b.is_empty())?;
        let amount = n.min(batch.len());
        let picked = index::sample(rng, batch.len(), amount).into_vec();
        Some(batch.select(&picked))
    }
}
