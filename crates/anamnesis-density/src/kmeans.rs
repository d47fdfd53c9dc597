//! Seeded k-means (k-means++ initialisation, Lloyd iterations).
//!
//! Deterministic for a given seed, so workers holding the same pooled rows
//! obtain the same clustering without further communication.

use nalgebra::{DMatrix, DVector};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// K-means parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeans {
    pub k: usize,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub seed: u64,
}

/// Result of a k-means fit.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub centroids: Vec<DVector<f64>>,
    /// Cluster index per input row.
    pub assignments: Vec<usize>,
    pub iterations: usize,
}

impl Clustering {
    /// Rows assigned to `cluster`, stacked.
    pub fn members(&self, data: &DMatrix<f64>, cluster: usize) -> DMatrix<f64> {
        let rows: Vec<usize> = self
            .assignments
            .iter()
            .enumerate()
            .filter(|(_, &a)| a == cluster)
            .map(|(i, _)| i)
            .collect();
        DMatrix::from_fn(rows.len(), data.ncols(), |r, c| data[(rows[r], c)])
    }
}

impl KMeans {
    /// Cluster the rows of `data`. K is clamped to the number of rows.
    /// Returns no clusters for an empty input.
    pub fn fit(&self, data: &DMatrix<f64>) -> Clustering {
        let n = data.nrows();
        let k = self.k.min(n);
        if k == 0 {
            return Clustering {
                centroids: Vec::new(),
                assignments: Vec::new(),
                iterations: 0,
            };
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let rows: Vec<DVector<f64>> = data.row_iter().map(|r| r.transpose()).collect();
        let mut centroids = plus_plus_init(&rows, k, &mut rng);
        let mut assignments = vec![0; n];
        let mut iterations = 0;

        for _ in 0..self.max_iterations.max(1) {
            iterations += 1;
            for (i, row) in rows.iter().enumerate() {
                assignments[i] = nearest(row, &centroids).0;
            }

            let mut sums = vec![DVector::zeros(data.ncols()); k];
            let mut counts = vec![0usize; k];
            for (row, &a) in rows.iter().zip(&assignments) {
                sums[a] += row;
                counts[a] += 1;
            }

            let mut shift: f64 = 0.0;
            for c in 0..k {
                let next = if counts[c] == 0 {
                    // Re-seed an empty cluster from the row farthest from its centroid.
                    let far = farthest(&rows, &centroids, &assignments);
                    assignments[far] = c;
                    rows[far].clone()
                } else {
                    &sums[c] / counts[c] as f64
                };
                shift = shift.max((&next - &centroids[c]).norm());
                centroids[c] = next;
            }

            if shift <= self.tolerance {
                break;
            }
        }

        for (i, row) in rows.iter().enumerate() {
            assignments[i] = nearest(row, &centroids).0;
        }

        Clustering {
            centroids,
            assignments,
            iterations,
        }
    }
}

fn plus_plus_init(rows: &[DVector<f64>], k: usize, rng: &mut ChaCha8Rng) -> Vec<DVector<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(rows[rng.gen_range(0..rows.len())].clone());

    while centroids.len() < k {
        let weights: Vec<f64> = rows.iter().map(|r| nearest(r, &centroids).1).collect();
        let total: f64 = weights.iter().sum();
        let next = if total <= 0.0 {
            // All rows coincide with existing centroids.
            rng.gen_range(0..rows.len())
        } else {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = rows.len() - 1;
            for (i, w) in weights.iter().enumerate() {
                if target < *w {
                    chosen = i;
                    break;
                }
                target -= w;
            }
            chosen
        };
        centroids.push(rows[next].clone());
    }
    centroids
}

/// Index of and squared distance to the nearest centroid.
fn nearest(row: &DVector<f64>, centroids: &[DVector<f64>]) -> (usize, f64) {
    centroids
        .iter()
        .enumerate()
        .map(|(i, c)| (i, (row - c).norm_squared()))
        .fold((0, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
}

fn farthest(rows: &[DVector<f64>], centroids: &[DVector<f64>], assignments: &[usize]) -> usize {
    rows.iter()
        .zip(assignments)
        .map(|(r, &a)| (r - &centroids[a]).norm_squared())
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, d)| if d > best.1 { (i, d) } else { best })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> DMatrix<f64> {
        let mut rows = Vec::new();
        for i in 0..10 {
            let jitter = i as f64 * 0.01;
            rows.extend_from_slice(&[jitter, -jitter]);
            rows.extend_from_slice(&[10.0 + jitter, 10.0 - jitter]);
        }
        DMatrix::from_row_slice(20, 2, &rows)
    }

    #[test]
    fn separates_two_blobs() {
        let km = KMeans {
            k: 2,
            max_iterations: 50,
            tolerance: 1e-6,
            seed: 1,
        };
        let data = two_blobs();
        let clustering = km.fit(&data);
        assert_eq!(clustering.centroids.len(), 2);
        let first = clustering.assignments[0];
        for (i, &a) in clustering.assignments.iter().enumerate() {
            assert_eq!(a == first, i % 2 == 0);
        }
        assert_eq!(clustering.members(&data, first).nrows(), 10);
    }

    #[test]
    fn k_is_clamped_to_rows() {
        let km = KMeans {
            k: 10,
            max_iterations: 10,
            tolerance: 1e-4,
            seed: 0,
        };
        let data = DMatrix::from_row_slice(3, 1, &[0.0, 1.0, 2.0]);
        assert_eq!(km.fit(&data).centroids.len(), 3);
    }

    #[test]
    fn same_seed_same_clustering() {
        let km = KMeans {
            k: 3,
            max_iterations: 20,
            tolerance: 1e-4,
            seed: 99,
        };
        let data = two_blobs();
        assert_eq!(km.fit(&data), km.fit(&data));
    }
}
