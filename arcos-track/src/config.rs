//! Bundles a clustering method choice with the Linker's own parameters, so
//! a driver function only needs one argument to build a `Linker<D>`.

use arcos_core::{Linker, LinkerConfig};
use arcos_cluster::{build_clusterer, resolve_eps_prev};

use crate::error::Result;

/// Parameters needed to build a `Linker<D>` end to end: which clustering
/// backend to use, its own parameters, and the Linker's memory/linking
/// parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusteringConfig {
    method: String,
    eps: f64,
    eps_prev: Option<f64>,
    min_cluster_size: usize,
    min_samples: Option<usize>,
    cluster_selection_epsilon: f64,
    propagation_threshold: usize,
    n_prev: usize,
    n_jobs: usize,
}

impl ClusteringConfig {
    /// Starts a config for the named clustering method ("dbscan" or
    /// "hdbscan") with the given `eps`. Every other field defaults to the
    /// same values [`arcos_core::LinkerConfig::default`] and the clustering
    /// backends themselves use.
    #[must_use]
    pub fn new(method: impl Into<String>, eps: f64) -> Self {
        Self {
            method: method.into(),
            eps,
            eps_prev: None,
            min_cluster_size: 1,
            min_samples: None,
            cluster_selection_epsilon: 0.0,
            propagation_threshold: 1,
            n_prev: 1,
            n_jobs: 1,
        }
    }

    /// Sets `epsPrev`; defaults to `eps` if left unset.
    #[must_use]
    pub fn with_eps_prev(mut self, eps_prev: f64) -> Self {
        self.eps_prev = Some(eps_prev);
        self
    }

    /// Sets the minimum cluster size.
    #[must_use]
    pub fn with_min_cluster_size(mut self, min_cluster_size: usize) -> Self {
        self.min_cluster_size = min_cluster_size;
        self
    }

    /// Sets `minSamples` (HDBSCAN only; ignored by DBSCAN).
    #[must_use]
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = Some(min_samples);
        self
    }

    /// Sets the HDBSCAN cluster-selection epsilon.
    #[must_use]
    pub fn with_cluster_selection_epsilon(mut self, cluster_selection_epsilon: f64) -> Self {
        self.cluster_selection_epsilon = cluster_selection_epsilon;
        self
    }

    /// Sets the minimum overlap required to link a current-frame cluster to
    /// a collective event already tracked in memory.
    #[must_use]
    pub fn with_propagation_threshold(mut self, propagation_threshold: usize) -> Self {
        self.propagation_threshold = propagation_threshold;
        self
    }

    /// Sets how many prior frames' worth of points remain eligible for linking.
    #[must_use]
    pub fn with_n_prev(mut self, n_prev: usize) -> Self {
        self.n_prev = n_prev;
        self
    }

    /// Sets the worker pool size used for per-frame clustering.
    #[must_use]
    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    /// Resolves this config into a ready-to-use `Linker<D>`.
    ///
    /// # Errors
    /// Returns an error if the clustering method is unknown, any parameter
    /// is out of range, or the Linker's own configuration is invalid.
    pub fn build_linker<const D: usize>(&self) -> Result<Linker<D>> {
        let clusterer = build_clusterer::<D>(
            &self.method,
            self.eps,
            self.min_cluster_size,
            self.min_samples,
            self.cluster_selection_epsilon,
        )?;
        let eps_prev = resolve_eps_prev(self.eps, self.eps_prev);
        let linker_config = LinkerConfig::new(eps_prev)
            .with_propagation_threshold(self.propagation_threshold)
            .with_n_prev(self.n_prev)
            .with_n_jobs(self.n_jobs);
        Ok(Linker::new(clusterer, linker_config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_dbscan_linker() {
        let config = ClusteringConfig::new("dbscan", 1.0).with_min_cluster_size(2).with_n_prev(2);
        let linker = config.build_linker::<2>();
        assert!(linker.is_ok());
    }

    #[test]
    fn builds_an_hdbscan_linker() {
        let config = ClusteringConfig::new("hdbscan", 1.0)
            .with_min_cluster_size(2)
            .with_min_samples(2)
            .with_cluster_selection_epsilon(0.1);
        let linker = config.build_linker::<2>();
        assert!(linker.is_ok());
    }

    #[test]
    fn rejects_unknown_method() {
        let config = ClusteringConfig::new("optics", 1.0);
        assert!(config.build_linker::<2>().is_err());
    }

    #[test]
    fn eps_prev_defaults_to_eps_when_unset() {
        let config = ClusteringConfig::new("dbscan", 2.0).with_min_cluster_size(1);
        assert!(config.build_linker::<2>().is_ok());
    }
}
