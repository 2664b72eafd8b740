//! Request validation, algorithm dispatch and result normalization.
//!
//! A [`ClusterRequest`] names an algorithm by string and carries every
//! parameter any algorithm might need. [`ClusterDispatcher::cluster`] checks the
//! request, turns it into a typed [`Algorithm`], runs exactly one clustering
//! strategy and returns a [`ClusterResult`] of the same shape whichever
//! algorithm ran:
//!
//! | algorithm       | labels            | centroids                        |
//! |-----------------|-------------------|----------------------------------|
//! | `kmeans`        | `0..k`            | fitted by k-means                |
//! | `agglomerative` | `0..k`            | mean of each label's points      |
//! | `dbscan`        | `-1` or `0..`     | always empty                     |
//!
//! Validation failures are reported before any computation starts. Errors from
//! the algorithms themselves become [`ClusterError::AlgorithmFailure`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cluster::{
    centroids_from_labels, Agglomerative, Clustering, Dbscan, DbscanExt, Kmeans, Linkage, Point,
    NOISE,
};

/// Algorithm names accepted by [`Algorithm::parse`], in documentation order.
pub const ALGORITHMS: [&str; 3] = ["kmeans", "agglomerative", "dbscan"];

/// Errors reported by the dispatcher.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    /// No points were supplied.
    #[error("no points supplied")]
    EmptyInput,

    /// A parameter required by the selected algorithm is missing or out of range.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name as it appears on the wire.
        name: &'static str,
        /// Human-readable explanation.
        message: String,
    },

    /// The algorithm name matches no supported strategy.
    #[error("unknown algorithm '{0}'; expected one of: kmeans, agglomerative, dbscan")]
    UnknownAlgorithm(String),

    /// The clustering computation failed after validation passed.
    #[error("clustering failed: {0}")]
    AlgorithmFailure(String),
}

impl ClusterError {
    /// `true` for failures caused by the request itself rather than the computation.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::AlgorithmFailure(_))
    }

    fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

impl From<crate::error::Error> for ClusterError {
    fn from(err: crate::error::Error) -> Self {
        Self::AlgorithmFailure(err.to_string())
    }
}

fn default_k() -> i64 {
    1
}

fn default_eps() -> f64 {
    0.5
}

fn default_min_samples() -> i64 {
    5
}

/// A clustering request as received at the HTTP boundary.
///
/// Parameters the selected algorithm does not use are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRequest {
    /// One of [`ALGORITHMS`], case-sensitive.
    pub algorithm: String,
    /// Input points; label `i` of the result belongs to `points[i]`.
    pub points: Vec<Point>,
    /// Cluster count for `kmeans` and `agglomerative`.
    #[serde(default = "default_k")]
    pub k: i64,
    /// Neighborhood radius for `dbscan`.
    #[serde(default = "default_eps")]
    pub eps: f64,
    /// Minimum neighborhood size for `dbscan`, the point itself included.
    #[serde(default = "default_min_samples")]
    pub min_samples: i64,
}

impl ClusterRequest {
    /// Build a request with default parameters.
    pub fn new(algorithm: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            algorithm: algorithm.into(),
            points,
            k: default_k(),
            eps: default_eps(),
            min_samples: default_min_samples(),
        }
    }

    pub fn with_k(mut self, k: i64) -> Self {
        self.k = k;
        self
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    pub fn with_min_samples(mut self, min_samples: i64) -> Self {
        self.min_samples = min_samples;
        self
    }
}

/// Uniform clustering output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterResult {
    /// One label per input point; [`NOISE`] marks DBSCAN outliers.
    pub labels: Vec<i64>,
    /// One centroid per distinct non-negative label in ascending order, or empty.
    pub centroids: Vec<Point>,
    /// Name of the algorithm that ran.
    pub algorithm: String,
}

/// A validated algorithm selection with exactly the parameters it uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Algorithm {
    KMeans { k: usize },
    Agglomerative { k: usize },
    /// `eps` and `min_samples` are passed through unchecked; the algorithm rejects bad values.
    Dbscan { eps: f64, min_samples: i64 },
}

impl Algorithm {
    /// Select the algorithm named in `request` and validate its parameters
    /// against a point set of `n_points` points.
    pub fn parse(request: &ClusterRequest, n_points: usize) -> Result<Self, ClusterError> {
        match request.algorithm.as_str() {
            "kmeans" => Ok(Self::KMeans {
                k: validate_k(request.k, n_points)?,
            }),
            "agglomerative" => Ok(Self::Agglomerative {
                k: validate_k(request.k, n_points)?,
            }),
            "dbscan" => Ok(Self::Dbscan {
                eps: request.eps,
                min_samples: request.min_samples,
            }),
            other => Err(ClusterError::UnknownAlgorithm(other.to_string())),
        }
    }

    /// Wire name of the algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            Self::KMeans { .. } => "kmeans",
            Self::Agglomerative { .. } => "agglomerative",
            Self::Dbscan { .. } => "dbscan",
        }
    }
}

fn validate_k(k: i64, n_points: usize) -> Result<usize, ClusterError> {
    if k <= 0 {
        return Err(ClusterError::invalid("k", "must be a positive integer"));
    }
    match usize::try_from(k) {
        Ok(k) if k <= n_points => Ok(k),
        _ => Err(ClusterError::invalid(
            "k",
            format!("must not exceed the number of points ({n_points})"),
        )),
    }
}

fn validate_points(points: &[Point]) -> Result<(), ClusterError> {
    if points.is_empty() {
        return Err(ClusterError::EmptyInput);
    }
    if let Some(i) = points.iter().position(|p| !p[0].is_finite() || !p[1].is_finite()) {
        return Err(ClusterError::invalid(
            "points",
            format!("point {i} has a non-finite coordinate"),
        ));
    }
    Ok(())
}

/// Runs clustering requests. Holds tuning knobs only; no state survives a call.
#[derive(Debug, Clone)]
pub struct ClusterDispatcher {
    /// k-means restarts; the lowest-inertia run wins.
    pub kmeans_n_init: usize,
    /// Maximum Lloyd iterations per k-means run.
    pub kmeans_max_iter: usize,
    /// Fixed RNG seed for k-means, `None` for fresh entropy on every call.
    pub seed: Option<u64>,
    /// Linkage used by agglomerative clustering.
    pub linkage: Linkage,
}

impl Default for ClusterDispatcher {
    fn default() -> Self {
        Self {
            kmeans_n_init: 10,
            kmeans_max_iter: 300,
            seed: None,
            linkage: Linkage::Ward,
        }
    }
}

impl ClusterDispatcher {
    /// Validate `request`, run the selected algorithm and normalize its output.
    pub fn cluster(&self, request: &ClusterRequest) -> Result<ClusterResult, ClusterError> {
        let n_points = request.points.len();
        let algorithm = validate_points(&request.points)
            .and_then(|()| Algorithm::parse(request, n_points))
            .inspect_err(|e| {
                info!(algorithm = %request.algorithm, n_points, error = %e, "rejected clustering request");
            })?;

        self.run(&request.points, algorithm).inspect_err(|e| {
            warn!(algorithm = algorithm.name(), n_points, error = %e, "clustering failed");
        })
    }

    /// Run an already-validated algorithm over `points`.
    pub fn run(&self, points: &[Point], algorithm: Algorithm) -> Result<ClusterResult, ClusterError> {
        debug!(algorithm = algorithm.name(), n_points = points.len(), "clustering");

        let (labels, centroids) = match algorithm {
            Algorithm::KMeans { k } => {
                let mut kmeans = Kmeans::new(k)
                    .with_n_init(self.kmeans_n_init)
                    .with_max_iter(self.kmeans_max_iter);
                if let Some(seed) = self.seed {
                    kmeans = kmeans.with_seed(seed);
                }
                let fit = kmeans.fit(points)?;
                (to_labels(fit.labels), fit.centroids)
            }
            Algorithm::Agglomerative { k } => {
                let labels = Agglomerative::new(k)
                    .with_linkage(self.linkage)
                    .fit_predict(points)
                    .map(to_labels)?;
                let centroids = centroids_from_labels(points, &labels);
                (labels, centroids)
            }
            Algorithm::Dbscan { eps, min_samples } => {
                // Negative counts map to 0, which the algorithm rejects.
                let min_pts = usize::try_from(min_samples).unwrap_or(0);
                let labels: Vec<i64> = Dbscan::new(eps, min_pts)
                    .fit_predict_with_noise(points)?
                    .into_iter()
                    .map(|l| l.map_or(NOISE, |c| c as i64))
                    .collect();
                (labels, Vec::new())
            }
        };

        if labels.len() != points.len() {
            return Err(ClusterError::AlgorithmFailure(format!(
                "{} returned {} labels for {} points",
                algorithm.name(),
                labels.len(),
                points.len()
            )));
        }

        Ok(ClusterResult {
            labels,
            centroids,
            algorithm: algorithm.name().to_string(),
        })
    }
}

fn to_labels(labels: Vec<usize>) -> Vec<i64> {
    labels.into_iter().map(|l| l as i64).collect()
}

/// Run `request` with default dispatcher settings.
pub fn cluster(request: &ClusterRequest) -> Result<ClusterResult, ClusterError> {
    ClusterDispatcher::default().cluster(request)
}
