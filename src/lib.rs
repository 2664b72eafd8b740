//! Planar point clustering behind a small HTTP service.
//!
//! `plotcluster` accepts a set of 2-D points and an algorithm choice, runs the
//! algorithm, and returns one label per point plus, where defined, one centroid
//! per cluster.
//!
//! - [`cluster`]: the algorithms (k-means, agglomerative, DBSCAN) and the
//!   centroid post-processing step.
//! - [`dispatch`]: request validation, algorithm selection and result
//!   normalization into a single [`ClusterResult`] shape.
//! - [`server`]: the axum router exposing `POST /cluster`.
//! - [`config`]: environment-driven server configuration.

#![forbid(unsafe_code)]

pub mod cluster;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod server;

pub use cluster::{
    centroids_from_labels, Agglomerative, Clustering, Dbscan, DbscanExt, Kmeans, KmeansFit,
    Linkage, Point, NOISE,
};
pub use dispatch::{cluster, Algorithm, ClusterDispatcher, ClusterError, ClusterRequest, ClusterResult};
pub use error::{Error, Result};
