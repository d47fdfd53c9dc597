//! Exact (unregularised) discrete optimal transport with uniform marginals.
//!
//! Rows carry mass `1/n`, columns `1/m`. Masses are scaled to integers
//! (`m/g` units per row, `n/g` per column, `g = gcd(n, m)`) and the
//! transportation problem is solved by successive shortest augmenting paths
//! with node potentials, which keeps every reduced cost non-negative so
//! Dijkstra applies. Each search stops at the first column with unmet
//! demand.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use anamnesis_core::errors::TransportError;
use nalgebra::DMatrix;

/// Optimal plan and its cost.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportPlan {
    /// Σ plan[i, j] · cost[i, j].
    pub cost: f64,
    /// n×m transported mass. Rows sum to `1/n`, columns to `1/m`.
    pub plan: DMatrix<f64>,
}

/// Optimal transport cost between uniform empirical measures.
pub fn solve(cost: &DMatrix<f64>) -> Result<f64, TransportError> {
    Ok(solve_plan(cost)?.cost)
}

/// Optimal plan between uniform empirical measures.
pub fn solve_plan(cost: &DMatrix<f64>) -> Result<TransportPlan, TransportError> {
    let (n, m) = cost.shape();
    if n == 0 || m == 0 {
        return Err(TransportError::EmptyProblem { rows: n, cols: m });
    }
    for i in 0..n {
        for j in 0..m {
            if !cost[(i, j)].is_finite() {
                return Err(TransportError::NonFiniteCost { row: i, col: j });
            }
        }
    }

    let g = gcd(n, m);
    let total = (n / g) as u64 * m as u64;
    let mut supply = vec![(m / g) as u64; n];
    let mut demand = vec![(n / g) as u64; m];
    let mut flow = vec![0u64; n * m];

    // Node ids: rows 0..n, columns n..n+m.
    let nodes = n + m;
    let mut potential = vec![0.0f64; nodes];
    for j in 0..m {
        potential[n + j] = (0..n).map(|i| cost[(i, j)]).fold(f64::INFINITY, f64::min);
    }

    let mut dist = vec![0.0f64; nodes];
    let mut prev: Vec<Option<usize>> = vec![None; nodes];
    let mut done = vec![false; nodes];
    let mut shipped = 0u64;

    while shipped < total {
        dist.iter_mut().for_each(|d| *d = f64::INFINITY);
        prev.iter_mut().for_each(|p| *p = None);
        done.iter_mut().for_each(|d| *d = false);
        for i in 0..n {
            if supply[i] > 0 {
                dist[i] = 0.0;
            }
        }

        let mut heap: BinaryHeap<Frontier> = (0..n)
            .filter(|&i| supply[i] > 0)
            .map(|node| Frontier { dist: 0.0, node })
            .collect();
        let mut target = None;
        while let Some(Frontier { dist: d, node: u }) = heap.pop() {
            if done[u] || d > dist[u] {
                continue;
            }
            done[u] = true;

            if u < n {
                for j in 0..m {
                    let v = n + j;
                    if done[v] {
                        continue;
                    }
                    let reduced = (cost[(u, j)] + potential[u] - potential[v]).max(0.0);
                    if d + reduced < dist[v] {
                        dist[v] = d + reduced;
                        prev[v] = Some(u);
                        heap.push(Frontier { dist: dist[v], node: v });
                    }
                }
            } else {
                let j = u - n;
                if demand[j] > 0 {
                    target = Some(u);
                    break;
                }
                for i in 0..n {
                    if done[i] || flow[i * m + j] == 0 {
                        continue;
                    }
                    let reduced = (potential[u] - potential[i] - cost[(i, j)]).max(0.0);
                    if d + reduced < dist[i] {
                        dist[i] = d + reduced;
                        prev[i] = Some(u);
                        heap.push(Frontier { dist: dist[i], node: i });
                    }
                }
            }
        }

        let Some(t) = target else {
            return Err(TransportError::SolverFailed {
                reason: format!("no augmenting path after shipping {shipped} of {total} units"),
            });
        };

        let cap = dist[t];
        for v in 0..nodes {
            potential[v] += dist[v].min(cap);
        }

        // Walk back to the source row, collecting the bottleneck.
        let mut delta = demand[t - n];
        let mut v = t;
        let source = loop {
            match prev[v] {
                Some(u) if v >= n => v = u,
                Some(u) => {
                    delta = delta.min(flow[v * m + (u - n)]);
                    v = u;
                }
                None => break v,
            }
        };
        delta = delta.min(supply[source]);

        let mut v = t;
        while let Some(u) = prev[v] {
            if v >= n {
                flow[u * m + (v - n)] += delta;
            } else {
                flow[v * m + (u - n)] -= delta;
            }
            v = u;
        }
        supply[source] -= delta;
        demand[t - n] -= delta;
        shipped += delta;
    }

    let scale = 1.0 / total as f64;
    let plan = DMatrix::from_fn(n, m, |i, j| flow[i * m + j] as f64 * scale);
    let cost_total = plan.component_mul(cost).sum();
    Ok(TransportPlan {
        cost: cost_total,
        plan,
    })
}

/// Heap entry ordered so the smallest distance pops first.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    dist: f64,
    node: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}
