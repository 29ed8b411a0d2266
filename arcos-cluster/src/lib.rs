//! arcos-cluster: concrete per-frame clustering backends for arcos-core.
//!
//! Two algorithms implement `arcos_core::Clusterer`: [`DbscanClusterer`] and
//! [`HdbscanClusterer`]. [`build_clusterer`] resolves the string-based
//! `clusteringMethod` parameter into one of them.

mod dbscan;
mod factory;
mod hdbscan;

pub use dbscan::{DbscanClusterer, DbscanConfig};
pub use factory::{build_clusterer, resolve_eps_prev};
pub use hdbscan::{HdbscanClusterer, HdbscanConfig};
