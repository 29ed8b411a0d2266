//! DBSCAN: density-based clustering with a hand-rolled spatial index.

use arcos_core::{Clusterer, KdTree};

/// Configuration for the [`DbscanClusterer`] backend.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DbscanConfig {
    /// Neighborhood radius (`eps`).
    pub eps: f64,
    /// Minimum neighborhood size (including the point itself) for a point
    /// to seed or join a cluster (`minClSz`).
    pub min_cluster_size: usize,
}

impl DbscanConfig {
    /// Creates a configuration with the given radius and minimum cluster size.
    #[must_use]
    pub fn new(eps: f64, min_cluster_size: usize) -> Self {
        Self { eps, min_cluster_size }
    }
}

/// Density-Based Spatial Clustering of Applications with Noise, over a
/// single frame's active points.
///
/// Labels follow the [`Clusterer`] contract: `0` is noise, `1..=k` are the
/// `k` clusters found, in the order their seed point was first visited.
#[derive(Debug, Clone, Copy)]
pub struct DbscanClusterer {
    config: DbscanConfig,
}

impl DbscanClusterer {
    /// Creates a clusterer from the given configuration.
    #[must_use]
    pub fn new(config: DbscanConfig) -> Self {
        Self { config }
    }
}

impl<const D: usize> Clusterer<D> for DbscanClusterer {
    fn cluster(&self, coords: &[[f64; D]]) -> Vec<i64> {
        let n = coords.len();
        let mut labels = vec![0i64; n];
        if n == 0 {
            return labels;
        }

        let tree = KdTree::build(coords);
        let mut visited = vec![false; n];
        let mut next_label = 1i64;

        for i in 0..n {
            if visited[i] {
                continue;
            }
            visited[i] = true;

            let neighbors = tree.within_radius(&coords[i], self.config.eps);
            if neighbors.len() < self.config.min_cluster_size {
                continue;
            }

            labels[i] = next_label;
            let mut seeds: Vec<usize> = neighbors.into_iter().filter(|&j| j != i).collect();

            while let Some(q) = seeds.pop() {
                if labels[q] == 0 {
                    labels[q] = next_label;
                }
                if visited[q] {
                    continue;
                }
                visited[q] = true;

                let q_neighbors = tree.within_radius(&coords[q], self.config.eps);
                if q_neighbors.len() >= self.config.min_cluster_size {
                    for neighbor in q_neighbors {
                        if !visited[neighbor] || labels[neighbor] == 0 {
                            seeds.push(neighbor);
                        }
                    }
                }
            }

            next_label += 1;
        }

        labels
    }

    fn name(&self) -> &'static str {
        "dbscan"
    }
}
