//! A small kd-tree over fixed-dimension float points.
//!
//! The Linker needs two things from a spatial index: a 1-nearest-neighbor
//! query from every point of a current cluster into the previous frames'
//! memory, and (inside the DBSCAN/HDBSCAN backends, see `arcos-cluster`) a
//! radius region query. Both are served by the same tree.
//!
//! The teacher's own `SpatialIndex` keyed neighbor buckets by an integer
//! pixel grid, which only works for small-integer 2D coordinates. Our
//! coordinates are real-valued and can be 1, 2, or 3 dimensional, so the
//! grid is generalized here into an ordinary balanced kd-tree instead of an
//! external crate, keeping the "hand-roll the spatial index" idiom rather
//! than reaching outside it.

use crate::point::squared_distance;

#[derive(Debug)]
struct Node {
    /// Index into the `points` slice the tree was built from.
    point_idx: usize,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// A static kd-tree over `D`-dimensional points.
///
/// Built once per `link()` call (or per clustering pass) and queried
/// read-only afterward.
#[derive(Debug)]
pub struct KdTree<const D: usize> {
    points: Vec<[f64; D]>,
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl<const D: usize> KdTree<D> {
    /// Builds a kd-tree over `points`. Indices returned by queries refer
    /// back into this slice (copied internally).
    #[must_use]
    pub fn build(points: &[[f64; D]]) -> Self {
        let mut tree = Self {
            points: points.to_vec(),
            nodes: Vec::with_capacity(points.len()),
            root: None,
        };
        if points.is_empty() {
            return tree;
        }
        let mut indices: Vec<usize> = (0..points.len()).collect();
        tree.root = Some(tree.build_subtree(&mut indices, 0));
        tree
    }

    /// Number of points indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the tree indexes no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn build_subtree(&mut self, indices: &mut [usize], depth: usize) -> usize {
        let axis = depth % D;
        let mid = indices.len() / 2;
        indices.select_nth_unstable_by(mid, |&a, &b| {
            self.points[a][axis]
                .partial_cmp(&self.points[b][axis])
                .expect("coordinates must not be NaN")
        });
        let point_idx = indices[mid];

        let (left_indices, right_indices) = indices.split_at_mut(mid);
        let right_indices = &mut right_indices[1..];

        let left = if left_indices.is_empty() {
            None
        } else {
            Some(self.build_subtree(left_indices, depth + 1))
        };
        let right = if right_indices.is_empty() {
            None
        } else {
            Some(self.build_subtree(right_indices, depth + 1))
        };

        self.nodes.push(Node {
            point_idx,
            axis,
            left,
            right,
        });
        self.nodes.len() - 1
    }

    /// Finds the single nearest indexed point to `query`.
    ///
    /// Returns `(distance, index)` where `index` refers to the slice passed
    /// to [`KdTree::build`]. Panics if the tree is empty (callers always
    /// check [`KdTree::is_empty`] first, matching the Linker's "normal path
    /// requires non-empty memory" precondition).
    #[must_use]
    pub fn nearest(&self, query: &[f64; D]) -> (f64, usize) {
        let root = self.root.expect("nearest() called on an empty KdTree");
        let mut best_idx = self.nodes[root].point_idx;
        let mut best_dist_sq = squared_distance(query, &self.points[best_idx]);
        self.search(root, query, &mut best_dist_sq, &mut best_idx);
        (best_dist_sq.sqrt(), best_idx)
    }

    fn search(&self, node_idx: usize, query: &[f64; D], best_dist_sq: &mut f64, best_idx: &mut usize) {
        let node = &self.nodes[node_idx];
        let candidate = &self.points[node.point_idx];
        let dist_sq = squared_distance(query, candidate);
        if dist_sq < *best_dist_sq {
            *best_dist_sq = dist_sq;
            *best_idx = node.point_idx;
        }

        let diff = query[node.axis] - candidate[node.axis];
        let (near, far) = if diff <= 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(near) = near {
            self.search(near, query, best_dist_sq, best_idx);
        }
        // Only descend into the far branch if the splitting hyperplane is
        // closer than the current best — otherwise it cannot hold a closer point.
        if diff * diff < *best_dist_sq {
            if let Some(far) = far {
                self.search(far, query, best_dist_sq, best_idx);
            }
        }
    }

    /// Collects the indices of every point within `radius` of `query`
    /// (inclusive). Used by the DBSCAN/HDBSCAN region queries.
    pub fn within_radius(&self, query: &[f64; D], radius: f64) -> Vec<usize> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            let radius_sq = radius * radius;
            self.collect_within(root, query, radius_sq, &mut out);
        }
        out
    }

    fn collect_within(&self, node_idx: usize, query: &[f64; D], radius_sq: f64, out: &mut Vec<usize>) {
        let node = &self.nodes[node_idx];
        let candidate = &self.points[node.point_idx];
        if squared_distance(query, candidate) <= radius_sq {
            out.push(node.point_idx);
        }

        let diff = query[node.axis] - candidate[node.axis];
        if let Some(left) = node.left {
            if diff <= 0.0 || diff * diff <= radius_sq {
                self.collect_within(left, query, radius_sq, out);
            }
        }
        if let Some(right) = node.right {
            if diff >= 0.0 || diff * diff <= radius_sq {
                self.collect_within(right, query, radius_sq, out);
            }
        }
    }
}
