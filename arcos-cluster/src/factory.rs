//! Resolves the string-based `clusteringMethod` parameter into a concrete
//! [`Clusterer`] backend, and validates the parameters that belong to it
//! rather than to the Linker (see `arcos_core::LinkerConfig` for the rest).

use arcos_core::{Clusterer, Error, Result};

use crate::dbscan::{DbscanClusterer, DbscanConfig};
use crate::hdbscan::{HdbscanClusterer, HdbscanConfig};

/// Builds the clustering backend named by `method` ("dbscan" or "hdbscan").
///
/// Custom callables never go through this factory: wrap the closure in
/// `Box::new(...)` directly, since any `Fn(&[[f64; D]]) -> Vec<i64> + Send +
/// Sync` already implements [`Clusterer`].
///
/// # Errors
/// Returns an error if `method` names neither backend, or if `eps`,
/// `min_cluster_size`, or `min_samples` are out of range.
pub fn build_clusterer<const D: usize>(
    method: &str,
    eps: f64,
    min_cluster_size: usize,
    min_samples: Option<usize>,
    cluster_selection_epsilon: f64,
) -> Result<Box<dyn Clusterer<D>>> {
    if !(eps.is_finite() && eps > 0.0) {
        return Err(Error::InvalidEps(eps));
    }
    if min_cluster_size == 0 {
        return Err(Error::InvalidParameter {
            field: "minClSz",
            value: 0,
        });
    }
    if let Some(0) = min_samples {
        return Err(Error::InvalidParameter {
            field: "minSamples",
            value: 0,
        });
    }

    match method {
        "dbscan" => Ok(Box::new(DbscanClusterer::new(DbscanConfig::new(eps, min_cluster_size)))),
        "hdbscan" => {
            let mut config = HdbscanConfig::new(min_cluster_size).with_cluster_selection_epsilon(cluster_selection_epsilon);
            if let Some(min_samples) = min_samples {
                config = config.with_min_samples(min_samples);
            }
            Ok(Box::new(HdbscanClusterer::new(config)))
        }
        other => Err(Error::UnknownClusteringMethod(other.to_string())),
    }
}

/// `epsPrev` defaults to `eps` when the caller leaves it unset.
#[must_use]
pub fn resolve_eps_prev(eps: f64, eps_prev: Option<f64>) -> f64 {
    eps_prev.unwrap_or(eps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_dbscan_backend() {
        let clusterer = build_clusterer::<2>("dbscan", 1.0, 2, None, 0.0).unwrap();
        let labels = clusterer.cluster(&[[0.0, 0.0], [0.0, 0.5]]);
        assert_eq!(labels, vec![1, 1]);
    }

    #[test]
    fn builds_hdbscan_backend() {
        let clusterer = build_clusterer::<2>("hdbscan", 1.0, 2, Some(2), 0.0).unwrap();
        let labels = clusterer.cluster(&[[0.0, 0.0], [0.0, 0.1], [0.0, 0.2]]);
        assert!(labels.iter().all(|&l| l == 1));
    }

    #[test]
    fn rejects_unknown_method() {
        let result = build_clusterer::<2>("optics", 1.0, 2, None, 0.0);
        assert!(matches!(result, Err(Error::UnknownClusteringMethod(m)) if m == "optics"));
    }

    #[test]
    fn rejects_non_positive_eps() {
        let result = build_clusterer::<2>("dbscan", 0.0, 2, None, 0.0);
        assert!(result.is_err());
    }

    #[test]
    fn eps_prev_defaults_to_eps() {
        assert_eq!(resolve_eps_prev(2.5, None), 2.5);
        assert_eq!(resolve_eps_prev(2.5, Some(0.3)), 0.3);
    }
}
