//! DBSCAN: Density-Based Spatial Clustering of Applications with Noise.
//!
//! A point with at least `min_pts` points (itself included) within `epsilon`
//! is a **core** point. Core points that are within `epsilon` of each other
//! share a cluster; non-core points within `epsilon` of a core point join it as
//! **border** points; everything else is **noise**.
//!
//! The number of clusters is discovered, not configured, and clusters can be
//! any shape. Neighborhoods are found by a linear scan, so a run is O(n²).
//!
//! Noise is reported as `None` by [`DbscanExt::fit_predict_with_noise`].
//!
//! ## References
//!
//! Ester et al. (1996). "A Density-Based Algorithm for Discovering Clusters
//! in Large Spatial Databases with Noise." KDD-96.

use super::util;
use super::Point;
use crate::error::{Error, Result};

/// DBSCAN clustering algorithm.
#[derive(Debug, Clone)]
pub struct Dbscan {
    /// Epsilon: maximum distance for neighborhood.
    epsilon: f64,
    /// Minimum points for core point classification.
    min_pts: usize,
}

// Internal label encoding.
// - UNCLASSIFIED: never assigned yet
// - NOISE_LABEL: visited, but not density-reachable from any core point (may be promoted later)
const UNCLASSIFIED: i32 = -2;
const NOISE_LABEL: i32 = -1;

impl Dbscan {
    /// Create a new DBSCAN clusterer.
    ///
    /// # Arguments
    ///
    /// * `epsilon` - Maximum distance between two points to be neighbors.
    /// * `min_pts` - Minimum number of points (the point itself included) to form a dense region.
    ///
    /// # Typical Values
    ///
    /// - `epsilon`: Often determined by k-distance plot (k = min_pts - 1).
    /// - `min_pts`: 2 * dimension is a common heuristic, so 4 for planar data.
    pub fn new(epsilon: f64, min_pts: usize) -> Self {
        Self { epsilon, min_pts }
    }

    fn validate(&self, points: &[Point]) -> Result<()> {
        if points.is_empty() {
            return Err(Error::EmptyInput);
        }

        if self.epsilon.is_nan() || self.epsilon <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "epsilon",
                message: "must be positive",
            });
        }

        if self.min_pts == 0 {
            return Err(Error::InvalidParameter {
                name: "min_pts",
                message: "must be at least 1",
            });
        }

        Ok(())
    }

    /// Find all neighbors within epsilon.
    fn region_query(&self, points: &[Point], point_idx: usize) -> Vec<usize> {
        let point = &points[point_idx];
        points
            .iter()
            .enumerate()
            .filter(|(idx, other)| *idx != point_idx && util::euclidean(point, other) <= self.epsilon)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Expand cluster from a core point.
    fn expand_cluster(
        &self,
        points: &[Point],
        point_idx: usize,
        neighbors: &[usize],
        labels: &mut [i32],
        cluster_id: i32,
        visited: &mut [bool],
    ) {
        labels[point_idx] = cluster_id;

        // Use a queue for iterative expansion (avoid deep recursion)
        let mut to_process: Vec<usize> = neighbors.to_vec();

        while let Some(neighbor_idx) = to_process.pop() {
            // A point previously labeled NOISE can later become a border point,
            // so assign the label *before* checking `visited`.
            if labels[neighbor_idx] == UNCLASSIFIED || labels[neighbor_idx] == NOISE_LABEL {
                labels[neighbor_idx] = cluster_id;
            }

            if visited[neighbor_idx] {
                continue;
            }
            visited[neighbor_idx] = true;

            let neighbor_neighbors = self.region_query(points, neighbor_idx);

            // MinPts includes the point itself
            if neighbor_neighbors.len() + 1 >= self.min_pts {
                for nn in neighbor_neighbors {
                    if !visited[nn] {
                        to_process.push(nn);
                    }
                }
            }
        }
    }

    /// Run DBSCAN, returning internal labels.
    fn run(&self, points: &[Point]) -> Result<Vec<i32>> {
        self.validate(points)?;

        let n = points.len();
        let mut labels = vec![UNCLASSIFIED; n];
        let mut visited = vec![false; n];
        let mut cluster_id: i32 = 0;

        for point_idx in 0..n {
            if visited[point_idx] {
                continue;
            }
            visited[point_idx] = true;

            let neighbors = self.region_query(points, point_idx);

            // MinPts includes the point itself, so we need >= min_pts - 1 other neighbors
            if neighbors.len() + 1 < self.min_pts {
                // Not enough neighbors: mark as noise (might be border later)
                labels[point_idx] = NOISE_LABEL;
                continue;
            }

            self.expand_cluster(
                points,
                point_idx,
                &neighbors,
                &mut labels,
                cluster_id,
                &mut visited,
            );
            cluster_id += 1;
        }

        Ok(labels)
    }
}

/// Extended DBSCAN interface with noise detection.
pub trait DbscanExt {
    /// Fit and predict, returning labels where noise is marked as `None`.
    fn fit_predict_with_noise(&self, points: &[Point]) -> Result<Vec<Option<usize>>>;
}

impl DbscanExt for Dbscan {
    fn fit_predict_with_noise(&self, points: &[Point]) -> Result<Vec<Option<usize>>> {
        let labels = self.run(points)?;
        Ok(labels
            .into_iter()
            .map(|l| if l >= 0 { Some(l as usize) } else { None })
            .collect())
    }
}
