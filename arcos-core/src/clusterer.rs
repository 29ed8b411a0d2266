//! The pluggable per-frame clustering backend.

/// Partitions one frame's active points into density-based clusters.
///
/// Implementations receive the raw coordinate array and return a label of
/// equal length: `0` marks noise, `1..=k` mark the `k` clusters found.
/// Labels need not be contiguous on input to [`Linker`](crate::Linker) —
/// only the normalization contract (noise is `0`, clusters are positive)
/// is required of a [`Clusterer`] itself.
///
/// Built-in backends (DBSCAN, HDBSCAN) live in the `arcos-cluster` crate,
/// which depends on `arcos-core` rather than the other way around — this
/// trait is the seam that keeps the Linker ignorant of any concrete
/// clustering algorithm.
pub trait Clusterer<const D: usize>: Send + Sync {
    /// Clusters `coords` and returns a label vector of the same length.
    ///
    /// Called with a non-empty slice; `Linker` handles the empty-frame case
    /// itself and never invokes the backend on zero points.
    fn cluster(&self, coords: &[[f64; D]]) -> Vec<i64>;

    /// A short name for diagnostics and `tracing` fields.
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl<const D: usize, F> Clusterer<D> for F
where
    F: Fn(&[[f64; D]]) -> Vec<i64> + Send + Sync,
{
    fn cluster(&self, coords: &[[f64; D]]) -> Vec<i64> {
        self(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_implement_clusterer() {
        let backend: Box<dyn Clusterer<2>> = Box::new(|coords: &[[f64; 2]]| vec![1; coords.len()]);
        let labels = backend.cluster(&[[0.0, 0.0], [1.0, 1.0]]);
        assert_eq!(labels, vec![1, 1]);
        assert_eq!(backend.name(), "custom");
    }
}
