//! HDBSCAN: hierarchical density-based clustering via a single-linkage
//! dendrogram over mutual reachability distance, condensed by the "leaf"
//! selection method.
//!
//! Unlike DBSCAN, HDBSCAN needs no fixed `eps` — it builds the full
//! single-linkage hierarchy and condenses it, trading a flat radius search
//! for a minimum spanning tree over a denser graph. The pipeline:
//!
//! 1. `core_distances` — the `minSamples`-th nearest neighbor distance for each point.
//! 2. `prim_mst` — minimum spanning tree over mutual reachability distance.
//! 3. `build_dendrogram` — single-linkage merge tree via union-find over the sorted MST edges.
//! 4. `select_leaves` — "leaf" selection: the minimal qualifying sub-clusters, not the
//!    most-stable ones (no excess-of-mass climb).
//! 5. `apply_epsilon` — merges selected clusters formed below `clusterSelectionEpsilon`
//!    back into their parent, coarsening overly fine splits.

use arcos_core::{distance, Clusterer};

/// Configuration for the [`HdbscanClusterer`] backend.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HdbscanConfig {
    /// Minimum number of points for a sub-cluster to be selected (`minClSz`).
    pub min_cluster_size: usize,
    /// Neighbor count used for the core-distance estimate (`minSamples`).
    /// Defaults to `min_cluster_size` when unset, matching the reference
    /// implementation's convention.
    pub min_samples: Option<usize>,
    /// Distance below which sibling splits are merged back together.
    pub cluster_selection_epsilon: f64,
}

impl HdbscanConfig {
    /// Creates a configuration with the given minimum cluster size.
    #[must_use]
    pub fn new(min_cluster_size: usize) -> Self {
        Self {
            min_cluster_size,
            min_samples: None,
            cluster_selection_epsilon: 0.0,
        }
    }

    /// Overrides the neighbor count used for core distances.
    #[must_use]
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = Some(min_samples);
        self
    }

    /// Sets the epsilon below which sibling splits are merged back together.
    #[must_use]
    pub fn with_cluster_selection_epsilon(mut self, epsilon: f64) -> Self {
        self.cluster_selection_epsilon = epsilon;
        self
    }
}

/// Hierarchical DBSCAN over a single frame's active points, using the
/// "leaf" cluster selection method.
#[derive(Debug, Clone, Copy)]
pub struct HdbscanClusterer {
    config: HdbscanConfig,
}

impl HdbscanClusterer {
    /// Creates a clusterer from the given configuration.
    #[must_use]
    pub fn new(config: HdbscanConfig) -> Self {
        Self { config }
    }
}

impl<const D: usize> Clusterer<D> for HdbscanClusterer {
    fn cluster(&self, coords: &[[f64; D]]) -> Vec<i64> {
        let n = coords.len();
        if n == 0 {
            return Vec::new();
        }
        if n < self.config.min_cluster_size {
            return vec![0; n];
        }

        let min_samples = self.config.min_samples.unwrap_or(self.config.min_cluster_size);
        let core_dist = core_distances(coords, min_samples);
        let mut edges = prim_mst(coords, &core_dist);
        edges.sort_by(|a, b| a.2.partial_cmp(&b.2).expect("mutual reachability distances must not be NaN"));

        let tree = Dendrogram::build(n, &edges);
        let root = tree.size.len() - 1;
        let leaves = select_leaves(root, self.config.min_cluster_size, &tree);
        let leaves = apply_epsilon(leaves, self.config.cluster_selection_epsilon, &tree);

        assign_labels(n, &leaves, &tree)
    }

    fn name(&self) -> &'static str {
        "hdbscan"
    }
}

fn core_distances<const D: usize>(coords: &[[f64; D]], min_samples: usize) -> Vec<f64> {
    let n = coords.len();
    let k = min_samples.clamp(1, n.saturating_sub(1).max(1));
    (0..n)
        .map(|i| {
            let mut dists: Vec<f64> = (0..n).filter(|&j| j != i).map(|j| distance(&coords[i], &coords[j])).collect();
            if dists.is_empty() {
                return 0.0;
            }
            let idx = (k - 1).min(dists.len() - 1);
            dists.select_nth_unstable_by(idx, |a, b| a.partial_cmp(b).expect("coordinates must not be NaN"));
            dists[idx]
        })
        .collect()
}

fn mutual_reachability<const D: usize>(coords: &[[f64; D]], core_dist: &[f64], i: usize, j: usize) -> f64 {
    distance(&coords[i], &coords[j]).max(core_dist[i]).max(core_dist[j])
}

/// Brute-force O(n^2) Prim's algorithm over the mutual reachability graph.
fn prim_mst<const D: usize>(coords: &[[f64; D]], core_dist: &[f64]) -> Vec<(usize, usize, f64)> {
    let n = coords.len();
    let mut in_tree = vec![false; n];
    let mut best_dist = vec![f64::INFINITY; n];
    let mut best_from = vec![0usize; n];
    let mut edges = Vec::with_capacity(n.saturating_sub(1));

    in_tree[0] = true;
    for j in 1..n {
        best_dist[j] = mutual_reachability(coords, core_dist, 0, j);
    }

    for _ in 1..n {
        let mut next = None;
        let mut next_dist = f64::INFINITY;
        for j in 0..n {
            if !in_tree[j] && best_dist[j] < next_dist {
                next_dist = best_dist[j];
                next = Some(j);
            }
        }
        let Some(next) = next else { break };
        in_tree[next] = true;
        edges.push((best_from[next], next, next_dist));

        for j in 0..n {
            if !in_tree[j] {
                let mrd = mutual_reachability(coords, core_dist, next, j);
                if mrd < best_dist[j] {
                    best_dist[j] = mrd;
                    best_from[j] = next;
                }
            }
        }
    }

    edges
}

/// A single-linkage merge tree. Nodes `0..n` are the original points
/// (always leaves); nodes `n..2n-1` are merges, in the order they occurred.
struct Dendrogram {
    size: Vec<usize>,
    distance: Vec<f64>,
    left: Vec<Option<usize>>,
    right: Vec<Option<usize>>,
    parent: Vec<Option<usize>>,
}

impl Dendrogram {
    fn build(n: usize, sorted_edges: &[(usize, usize, f64)]) -> Self {
        let mut uf = UnionFind::new(n);
        let mut component_node = vec![0usize; n];
        for (i, slot) in component_node.iter_mut().enumerate() {
            *slot = i;
        }

        let mut size = (0..n).map(|_| 1usize).collect::<Vec<_>>();
        let mut distance = vec![0.0f64; n];
        let mut left = vec![None; n];
        let mut right = vec![None; n];
        let mut parent = vec![None; n];

        for &(a, b, dist) in sorted_edges {
            let ra = uf.find(a);
            let rb = uf.find(b);
            if ra == rb {
                continue;
            }
            let na = component_node[ra];
            let nb = component_node[rb];
            let new_id = size.len();

            size.push(size[na] + size[nb]);
            distance.push(dist);
            left.push(Some(na));
            right.push(Some(nb));
            parent.push(None);
            parent[na] = Some(new_id);
            parent[nb] = Some(new_id);

            let new_root = uf.union(ra, rb);
            component_node[new_root] = new_id;
        }

        Self {
            size,
            distance,
            left,
            right,
            parent,
        }
    }
}

/// "Leaf" selection: returns the minimal sub-clusters that still satisfy
/// `min_cluster_size`, without climbing for excess-of-mass stability.
fn select_leaves(node: usize, min_cluster_size: usize, tree: &Dendrogram) -> Vec<usize> {
    if tree.size[node] < min_cluster_size {
        return Vec::new();
    }
    match (tree.left[node], tree.right[node]) {
        (Some(l), Some(r)) => {
            let left_ok = tree.size[l] >= min_cluster_size;
            let right_ok = tree.size[r] >= min_cluster_size;
            match (left_ok, right_ok) {
                (true, true) => {
                    let mut leaves = select_leaves(l, min_cluster_size, tree);
                    leaves.extend(select_leaves(r, min_cluster_size, tree));
                    leaves
                }
                (true, false) => select_leaves(l, min_cluster_size, tree),
                (false, true) => select_leaves(r, min_cluster_size, tree),
                (false, false) => vec![node],
            }
        }
        _ => vec![node],
    }
}

/// Merges selected clusters formed at a distance below `epsilon` back into
/// their parent, repeating until stable.
fn apply_epsilon(leaves: Vec<usize>, epsilon: f64, tree: &Dendrogram) -> Vec<usize> {
    if epsilon <= 0.0 {
        return leaves;
    }
    let mut current = leaves;
    loop {
        let mut changed = false;
        let mut next = Vec::with_capacity(current.len());
        for node in current {
            if tree.distance[node] < epsilon {
                if let Some(parent) = tree.parent[node] {
                    next.push(parent);
                    changed = true;
                    continue;
                }
            }
            next.push(node);
        }
        next.sort_unstable();
        next.dedup();
        current = next;
        if !changed {
            return current;
        }
    }
}

fn collect_members(node: usize, tree: &Dendrogram) -> Vec<usize> {
    let mut stack = vec![node];
    let mut members = Vec::new();
    while let Some(current) = stack.pop() {
        match (tree.left[current], tree.right[current]) {
            (Some(l), Some(r)) => {
                stack.push(l);
                stack.push(r);
            }
            _ => members.push(current),
        }
    }
    members
}

fn assign_labels(n: usize, leaves: &[usize], tree: &Dendrogram) -> Vec<i64> {
    let mut labels = vec![0i64; n];
    let mut clusters: Vec<(usize, Vec<usize>)> = leaves
        .iter()
        .map(|&node| {
            let members = collect_members(node, tree);
            let representative = *members.iter().min().expect("a selected cluster has at least one member");
            (representative, members)
        })
        .collect();
    clusters.sort_by_key(|&(representative, _)| representative);

    for (next_label, (_, members)) in clusters.into_iter().enumerate() {
        let label = i64::try_from(next_label + 1).expect("cluster count fits in i64");
        for member in members {
            labels[member] = label;
        }
    }
    labels
}

struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    /// Unions the components rooted at `a` and `b` (must already be roots'
    /// representatives via `find`) and returns the new root.
    fn union(&mut self, a: usize, b: usize) -> usize {
        let (big, small) = if self.size[a] >= self.size[b] { (a, b) } else { (b, a) };
        self.parent[small] = big;
        self.size[big] += self.size[small];
        big
    }
}
