//! The inter-frame linker: the heart of the system.

use crate::clusterer::Clusterer;
use crate::error::{Error, Result};
use crate::kdtree::KdTree;
use crate::memory::Memory;
use crate::point::NOISE_EVENT_ID;

/// Configuration consumed directly by the [`Linker`] itself.
///
/// `eps`, `minClSz`, and `minSamples` from the reference design belong to
/// the chosen [`Clusterer`] backend (see `arcos-cluster::DbscanConfig` /
/// `HdbscanConfig`), not to the Linker — the Linker only ever looks at the
/// *previous-frame* linking radius and its own bookkeeping knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkerConfig {
    /// Linking radius across frames (`epsPrev`).
    pub eps_prev: f64,
    /// Minimum number of within-`eps_prev` memory neighbors required for a
    /// current cluster to inherit an id instead of minting a fresh one.
    pub propagation_threshold: usize,
    /// Memory depth in frames (`nPrev`).
    pub n_prev: usize,
    /// Parallelism hint for the nearest-neighbor queries within a `link()` call.
    pub n_jobs: usize,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            eps_prev: 1.0,
            propagation_threshold: 1,
            n_prev: 1,
            n_jobs: 1,
        }
    }
}

impl LinkerConfig {
    /// Creates a configuration with the given linking radius and all other
    /// fields at their defaults.
    #[must_use]
    pub fn new(eps_prev: f64) -> Self {
        Self {
            eps_prev,
            ..Self::default()
        }
    }

    /// Sets the propagation threshold.
    #[must_use]
    pub fn with_propagation_threshold(mut self, propagation_threshold: usize) -> Self {
        self.propagation_threshold = propagation_threshold;
        self
    }

    /// Sets the memory depth in frames.
    #[must_use]
    pub fn with_n_prev(mut self, n_prev: usize) -> Self {
        self.n_prev = n_prev;
        self
    }

    /// Sets the parallelism hint.
    #[must_use]
    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.eps_prev.is_finite() && self.eps_prev >= 0.0) {
            return Err(Error::InvalidEpsPrev(self.eps_prev));
        }
        if self.propagation_threshold == 0 {
            return Err(Error::InvalidParameter {
                field: "propagationThreshold",
                value: 0,
            });
        }
        if self.n_prev == 0 {
            return Err(Error::InvalidParameter {
                field: "nPrev",
                value: 0,
            });
        }
        if self.n_jobs == 0 {
            return Err(Error::InvalidParameter {
                field: "nJobs",
                value: 0,
            });
        }
        Ok(())
    }
}

/// Stateful operator linking per-frame clusters into persistent events.
///
/// One `Linker` is created per stream and lives for its entire duration; it
/// exclusively owns its [`Memory`] and the [`Clusterer`] backend it was
/// built with. See `SPEC_FULL.md` §4.3 for the full algorithm description.
pub struct Linker<const D: usize> {
    clusterer: Box<dyn Clusterer<D>>,
    memory: Memory<D>,
    config: LinkerConfig,
    event_ids: Vec<i64>,
}

impl<const D: usize> Linker<D> {
    /// Builds a Linker around `clusterer`, validating `config`.
    ///
    /// # Errors
    /// Returns an error if any of `config`'s fields are out of range.
    pub fn new(clusterer: Box<dyn Clusterer<D>>, config: LinkerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            clusterer,
            memory: Memory::new(config.n_prev),
            config,
            event_ids: Vec::new(),
        })
    }

    /// The event ids produced by the most recent [`Linker::link`] call,
    /// aligned to that call's input rows.
    #[must_use]
    pub fn event_ids(&self) -> &[i64] {
        &self.event_ids
    }

    /// True iff no frame with active points has been linked yet (Memory empty).
    #[must_use]
    pub fn is_cold(&self) -> bool {
        self.memory.is_empty()
    }

    /// Consumes one frame's active-filtered coordinates, mutates internal
    /// state, and returns the event id assigned to each input row
    /// (noise rows carry [`crate::point::NOISE_EVENT_ID`]).
    pub fn link(&mut self, coords: &[[f64; D]]) -> &[i64] {
        if coords.is_empty() {
            tracing::trace!(frame_size = 0, "link: empty frame, pushing empty memory entry");
            self.memory.update(Vec::new(), Vec::new());
            self.event_ids = Vec::new();
            return &self.event_ids;
        }

        let raw_labels = self.clusterer.cluster(coords);
        debug_assert_eq!(raw_labels.len(), coords.len());

        let mut kept_coords = Vec::with_capacity(coords.len());
        let mut kept_labels = Vec::with_capacity(coords.len());
        let mut noise_mask = vec![false; coords.len()];
        for (i, &label) in raw_labels.iter().enumerate() {
            if label == 0 {
                noise_mask[i] = true;
            } else {
                kept_coords.push(coords[i]);
                kept_labels.push(label);
            }
        }

        let use_fresh_path = self.memory.is_empty() || kept_labels.is_empty() || self.memory.has_no_kept_points();

        let linked_kept_ids = if use_fresh_path {
            tracing::debug!(
                cold = self.memory.is_empty(),
                kept = kept_labels.len(),
                "link: first-frame/empty-memory path"
            );
            self.mint_fresh_ids(&kept_labels)
        } else {
            tracing::debug!(kept = kept_labels.len(), "link: normal linking path");
            self.link_against_memory(&kept_labels, &kept_coords)
        };

        self.memory.update(kept_coords, linked_kept_ids.clone());

        let mut output = vec![NOISE_EVENT_ID; coords.len()];
        let mut kept_iter = linked_kept_ids.into_iter();
        for (i, &is_noise) in noise_mask.iter().enumerate() {
            if !is_noise {
                output[i] = kept_iter.next().expect("kept count matches non-noise rows");
            }
        }
        self.event_ids = output;
        &self.event_ids
    }

    fn mint_fresh_ids(&mut self, kept_labels: &[i64]) -> Vec<i64> {
        let offset = self.memory.max_prev_event_id();
        let ids: Vec<i64> = kept_labels.iter().map(|&label| label + offset).collect();
        if let Some(&max_id) = ids.iter().max() {
            self.memory.observe_event_id(max_id);
        }
        ids
    }

    fn link_against_memory(&mut self, kept_labels: &[i64], kept_coords: &[[f64; D]]) -> Vec<i64> {
        let memory_coords = self.memory.all_coordinates();
        let memory_event_ids = self.memory.all_event_ids();
        let tree = KdTree::build(&memory_coords);

        let n = kept_labels.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&i| kept_labels[i]);

        let pool = build_pool(self.config.n_jobs);

        let mut assigned = vec![0i64; n];
        let mut group_start = 0;
        while group_start < n {
            let label = kept_labels[order[group_start]];
            let mut group_end = group_start + 1;
            while group_end < n && kept_labels[order[group_end]] == label {
                group_end += 1;
            }
            let group_indices = &order[group_start..group_end];

            let neighbors = query_nearest(pool.as_ref(), &tree, group_indices, kept_coords);
            let neighbor_ids: Vec<i64> = neighbors.iter().map(|&(_, idx)| memory_event_ids[idx]).collect();
            let eligible_count = neighbors
                .iter()
                .filter(|&&(dist, _)| dist <= self.config.eps_prev)
                .count();

            if eligible_count < self.config.propagation_threshold {
                let new_id = self.memory.max_prev_event_id() + 1;
                self.memory.observe_event_id(new_id);
                tracing::trace!(label, new_id, "link: minted fresh event id");
                for &i in group_indices {
                    assigned[i] = new_id;
                }
            } else {
                if let Some(&max_id) = neighbor_ids.iter().max() {
                    self.memory.observe_event_id(max_id);
                }
                tracing::trace!(label, "link: propagated event ids from memory");
                for (k, &i) in group_indices.iter().enumerate() {
                    assigned[i] = neighbor_ids[k];
                }
            }

            group_start = group_end;
        }

        assigned
    }
}

fn build_pool(n_jobs: usize) -> Option<rayon::ThreadPool> {
    if n_jobs <= 1 {
        return None;
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_jobs)
        .build()
        .inspect_err(|err| tracing::warn!(%err, n_jobs, "falling back to serial nearest-neighbor queries"))
        .ok()
}

fn query_nearest<const D: usize>(
    pool: Option<&rayon::ThreadPool>,
    tree: &KdTree<D>,
    group_indices: &[usize],
    kept_coords: &[[f64; D]],
) -> Vec<(f64, usize)> {
    match pool {
        Some(pool) => {
            use rayon::prelude::*;
            pool.install(|| group_indices.par_iter().map(|&i| tree.nearest(&kept_coords[i])).collect())
        }
        None => group_indices.iter().map(|&i| tree.nearest(&kept_coords[i])).collect(),
    }
}
