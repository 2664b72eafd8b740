//! Clustering algorithms for planar point sets.
//!
//! Every algorithm takes a slice of [`Point`]s and returns one label per point,
//! in input order.
//!
//! ## Algorithms
//!
//! ### K-means
//!
//! Assign each point to the nearest centroid, then move each centroid to the
//! mean of its points. Repeat.
//!
//! **Objective**: Minimize within-cluster sum of squares:
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! **Assumptions**:
//! - Clusters are roughly spherical
//! - Clusters have similar sizes
//! - You know k in advance
//!
//! K-means is the only algorithm here that produces centroids natively; see
//! [`KmeansFit`].
//!
//! ### Agglomerative
//!
//! Bottom-up hierarchical merging until `k` clusters remain. Deterministic, no
//! spherical assumption with single linkage, but O(n³) in the worst case.
//!
//! ### DBSCAN
//!
//! Density-based clustering that can discover non-convex clusters and identify
//! outliers (noise points). DBSCAN does not require specifying the number of
//! clusters in advance.
//!
//! ## Centroids for label-only algorithms
//!
//! [`centroids_from_labels`] turns any `(points, labels)` pair into per-cluster
//! means, so callers get a uniform output regardless of the algorithm.
//!
//! ## Usage
//!
//! ```rust
//! use plotcluster::cluster::{Agglomerative, Clustering, Dbscan, DbscanExt, Kmeans};
//!
//! let data = vec![[0.0, 0.0], [0.1, 0.1], [10.0, 10.0], [10.1, 10.1]];
//!
//! let fit = Kmeans::new(2).with_seed(42).fit(&data).unwrap();
//! assert_eq!(fit.labels[0], fit.labels[1]);
//! assert_ne!(fit.labels[0], fit.labels[2]);
//!
//! let labels = Agglomerative::new(2).fit_predict(&data).unwrap();
//! assert_eq!(labels, vec![0, 0, 1, 1]);
//!
//! let labels = Dbscan::new(0.5, 2).fit_predict_with_noise(&data).unwrap();
//! assert_eq!(labels.len(), data.len());
//! ```

mod agglomerative;
mod centroid;
mod dbscan;
mod kmeans;
mod traits;
mod util;

pub use agglomerative::{Agglomerative, Linkage};
pub use centroid::centroids_from_labels;
pub use dbscan::{Dbscan, DbscanExt};
pub use kmeans::{Kmeans, KmeansFit};
pub use traits::Clustering;

/// A planar point `[x, y]`.
pub type Point = [f64; 2];

/// Label reserved for points that belong to no cluster.
pub const NOISE: i64 = -1;
