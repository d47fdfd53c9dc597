//! In-process worker group: one `ThreadCollective` per worker thread.

use std::sync::{Arc, Barrier, Mutex};

use anamnesis_core::errors::DensityError;
use anamnesis_core::traits::Collective;
use nalgebra::DMatrix;

struct Shared {
    barrier: Barrier,
    slots: Mutex<Vec<Option<DMatrix<f64>>>>,
}

/// Factory for a fixed-size group of cooperating in-process workers.
pub struct WorkerGroup;

impl WorkerGroup {
    /// Create `world_size` handles, one per worker. Each handle must be moved
    /// to its own thread; all of them must take part in every collective call.
    pub fn spawn_handles(world_size: usize) -> Vec<ThreadCollective> {
        let world_size = world_size.max(1);
        let shared = Arc::new(Shared {
            barrier: Barrier::new(world_size),
            slots: Mutex::new(vec![None; world_size]),
        });
        (0..world_size)
            .map(|rank| ThreadCollective {
                rank,
                world_size,
                shared: Arc::clone(&shared),
            })
            .collect()
    }
}

/// One worker's view of a `WorkerGroup`.
pub struct ThreadCollective {
    rank: usize,
    world_size: usize,
    shared: Arc<Shared>,
}

impl Collective for ThreadCollective {
    fn rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.world_size
    }

    fn barrier(&self) -> Result<(), DensityError> {
        self.shared.barrier.wait();
        Ok(())
    }

    fn all_gather(&self, local: &DMatrix<f64>) -> Result<Vec<DMatrix<f64>>, DensityError> {
        // Nobody writes until everyone finished reading the previous round.
        self.barrier()?;
        {
            let mut slots = self.shared.slots.lock().map_err(|_| self.poisoned())?;
            slots[self.rank] = Some(local.clone());
        }
        self.barrier()?;
        let gathered = {
            let slots = self.shared.slots.lock().map_err(|_| self.poisoned())?;
            slots
                .iter()
                .enumerate()
                .map(|(rank, slot)| {
                    slot.clone().ok_or_else(|| DensityError::CollectiveFailed {
                        rank,
                        reason: "worker did not contribute".to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        };
        self.barrier()?;
        gathered
    }
}

impl ThreadCollective {
    fn poisoned(&self) -> DensityError {
        DensityError::CollectiveFailed {
            rank: self.rank,
            reason: "exchange slot lock poisoned".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_worker_sees_rank_ordered_sets() {
        let handles = WorkerGroup::spawn_handles(3);
        let results: Vec<Vec<DMatrix<f64>>> = std::thread::scope(|s| {
            let joins: Vec<_> = handles
                .iter()
                .map(|h| {
                    s.spawn(move || {
                        let local = DMatrix::from_element(h.rank() + 1, 2, h.rank() as f64);
                        h.all_gather(&local).unwrap()
                    })
                })
                .collect();
            joins.into_iter().map(|j| j.join().unwrap()).collect()
        });
        for gathered in &results {
            assert_eq!(gathered, &results[0]);
            assert_eq!(gathered.len(), 3);
            assert_eq!(gathered[2].nrows(), 3);
            assert_eq!(gathered[1][(0, 0)], 1.0);
        }
    }

    #[test]
    fn repeated_rounds_do_not_mix() {
        let handles = WorkerGroup::spawn_handles(2);
        std::thread::scope(|s| {
            for h in &handles {
                s.spawn(move || {
                    for round in 0..5 {
                        let local = DMatrix::from_element(1, 1, (round * 10 + h.rank()) as f64);
                        let gathered = h.all_gather(&local).unwrap();
                        assert_eq!(gathered[0][(0, 0)], (round * 10) as f64);
                        assert_eq!(gathered[1][(0, 0)], (round * 10 + 1) as f64);
                    }
                });
            }
        });
    }
}
