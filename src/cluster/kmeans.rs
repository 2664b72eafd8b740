//! K-means: centroid-based partitioning (Lloyd's algorithm).
//!
//! # The Algorithm
//!
//! 1. **Seeding** (k-means++, Arthur & Vassilvitskii 2007): pick the first
//!    centroid uniformly at random, then each further centroid with probability
//!    proportional to its squared distance from the nearest centroid chosen so far.
//! 2. **Assignment**: label every point with its nearest centroid.
//! 3. **Update**: move every centroid to the mean of its points.
//! 4. Repeat 2–3 until the total squared centroid shift drops below `tol`
//!    or `max_iter` is reached.
//!
//! The whole procedure is restarted `n_init` times with different seeds and the
//! run with the lowest inertia (within-cluster sum of squares) is kept.
//!
//! ## Empty clusters
//!
//! If a cluster loses all of its points during the update step, its centroid is
//! moved onto the point that is currently farthest from its own centroid, taken
//! from a cluster that can spare it.
//!
//! ## Degenerate input
//!
//! With fewer than `k` distinct points some cluster ids necessarily stay unused.
//! Those ids are dropped from the fit: the surviving ids are renumbered in
//! ascending order, so `centroids.len()` always equals the number of distinct
//! labels and may be smaller than `k`.

use rand::prelude::*;

use super::traits::Clustering;
use super::util;
use super::Point;
use crate::error::{Error, Result};

/// Convergence threshold on total squared centroid movement.
const TOL: f64 = 1e-4;

/// K-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmeans {
    k: usize,
    max_iter: usize,
    n_init: usize,
    seed: Option<u64>,
}

/// Result of a k-means fit.
#[derive(Debug, Clone)]
pub struct KmeansFit {
    /// One centroid per cluster id, `centroids[c]` for label `c`.
    pub centroids: Vec<Point>,
    /// One label per input point, contiguous from 0 and below `centroids.len()`.
    pub labels: Vec<usize>,
    /// Sum of squared distances from each point to its centroid.
    pub inertia: f64,
    /// Lloyd iterations performed by the winning run.
    pub iterations: usize,
}

impl Kmeans {
    /// Create a k-means clusterer for `k` clusters.
    ///
    /// Defaults: `max_iter = 300`, `n_init = 10`, unseeded.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 300,
            n_init: 10,
            seed: None,
        }
    }

    /// Set the maximum number of Lloyd iterations per run.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the number of restarts; the lowest-inertia run wins.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Fix the RNG seed for reproducible results.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fit the model and return centroids, labels and inertia.
    pub fn fit(&self, points: &[Point]) -> Result<KmeansFit> {
        let n = points.len();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if self.k == 0 || self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }
        if self.n_init == 0 {
            return Err(Error::InvalidParameter {
                name: "n_init",
                message: "must be at least 1",
            });
        }

        let mut rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let mut best: Option<KmeansFit> = None;
        for _ in 0..self.n_init {
            let run = self.fit_single(points, &mut rng);
            if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
                best = Some(run);
            }
        }

        best.map(compact)
            .ok_or_else(|| Error::Other("k-means produced no run".to_string()))
    }

    fn fit_single(&self, points: &[Point], rng: &mut StdRng) -> KmeansFit {
        let mut centroids = plus_plus_init(points, self.k, rng);
        let mut labels = assign(points, &centroids);
        let mut iterations = 0;

        for _ in 0..self.max_iter {
            iterations += 1;
            let updated = update(points, &labels, &centroids);
            let shift: f64 = centroids
                .iter()
                .zip(updated.iter())
                .map(|(a, b)| util::squared_euclidean(a, b))
                .sum();
            centroids = updated;
            labels = assign(points, &centroids);
            if shift <= TOL {
                break;
            }
        }

        let inertia = points
            .iter()
            .zip(labels.iter())
            .map(|(p, &c)| util::squared_euclidean(p, &centroids[c]))
            .sum();

        KmeansFit {
            centroids,
            labels,
            inertia,
            iterations,
        }
    }
}

impl Clustering for Kmeans {
    fn fit_predict(&self, points: &[Point]) -> Result<Vec<usize>> {
        Ok(self.fit(points)?.labels)
    }
}

/// Drop cluster ids no point uses and renumber the rest in ascending order.
fn compact(mut fit: KmeansFit) -> KmeansFit {
    let k = fit.centroids.len();
    let mut used = vec![false; k];
    for &l in &fit.labels {
        used[l] = true;
    }
    if used.iter().all(|&u| u) {
        return fit;
    }

    let mut remap = vec![usize::MAX; k];
    let mut centroids = Vec::with_capacity(k);
    for (c, centroid) in fit.centroids.iter().enumerate() {
        if used[c] {
            remap[c] = centroids.len();
            centroids.push(*centroid);
        }
    }
    for l in fit.labels.iter_mut() {
        *l = remap[*l];
    }
    fit.centroids = centroids;
    fit
}

fn plus_plus_init(points: &[Point], k: usize, rng: &mut StdRng) -> Vec<Point> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.random_range(0..points.len())]);

    let mut closest: Vec<f64> = points
        .iter()
        .map(|p| util::squared_euclidean(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = closest.iter().sum();
        let chosen = if total > 0.0 {
            let threshold = rng.random::<f64>() * total;
            let mut cumsum = 0.0;
            let mut selected = 0;
            for (i, &d) in closest.iter().enumerate() {
                if d <= 0.0 {
                    continue;
                }
                selected = i;
                cumsum += d;
                if cumsum > threshold {
                    break;
                }
            }
            selected
        } else {
            // Every point already sits on a centroid.
            rng.random_range(0..points.len())
        };

        let c = points[chosen];
        for (d, p) in closest.iter_mut().zip(points.iter()) {
            *d = d.min(util::squared_euclidean(p, &c));
        }
        centroids.push(c);
    }

    centroids
}

fn nearest(point: &Point, centroids: &[Point]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = util::squared_euclidean(point, c);
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

fn assign(points: &[Point], centroids: &[Point]) -> Vec<usize> {
    points.iter().map(|p| nearest(p, centroids)).collect()
}

fn update(points: &[Point], labels: &[usize], previous: &[Point]) -> Vec<Point> {
    let k = previous.len();
    let mut sums = vec![[0.0f64; 2]; k];
    let mut counts = vec![0usize; k];
    for (p, &c) in points.iter().zip(labels.iter()) {
        sums[c][0] += p[0];
        sums[c][1] += p[1];
        counts[c] += 1;
    }

    let mut centroids: Vec<Point> = sums
        .iter()
        .zip(counts.iter())
        .zip(previous.iter())
        .map(|((s, &cnt), prev)| {
            if cnt > 0 {
                [s[0] / cnt as f64, s[1] / cnt as f64]
            } else {
                *prev
            }
        })
        .collect();

    // Re-seed empty clusters from the worst-fitting point of a cluster with spare members.
    let mut taken = vec![false; points.len()];
    for c in 0..k {
        if counts[c] > 0 {
            continue;
        }
        let donor = points
            .iter()
            .enumerate()
            .filter(|&(i, _)| !taken[i] && counts[labels[i]] > 1)
            .map(|(i, p)| (i, util::squared_euclidean(p, &centroids[labels[i]])))
            .max_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((i, _)) = donor {
            taken[i] = true;
            counts[labels[i]] -= 1;
            counts[c] = 1;
            centroids[c] = points[i];
        }
    }

    centroids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Vec<Point> {
        vec![
            [0.0, 0.0],
            [0.1, 0.1],
            [0.0, 0.2],
            [10.0, 10.0],
            [10.1, 10.1],
            [10.0, 10.2],
        ]
    }

    #[test]
    fn test_kmeans_two_clusters() {
        let fit = Kmeans::new(2).with_seed(42).fit(&two_blobs()).unwrap();

        assert_eq!(fit.labels.len(), 6);
        assert_eq!(fit.centroids.len(), 2);
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[0], fit.labels[2]);
        assert_eq!(fit.labels[3], fit.labels[4]);
        assert_eq!(fit.labels[3], fit.labels[5]);
        assert_ne!(fit.labels[0], fit.labels[3]);

        let near = fit.centroids[fit.labels[0]];
        assert!((near[0] - 0.1 / 3.0).abs() < 1e-9);
        assert!((near[1] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_kmeans_fit_predict_matches_fit() {
        let data = two_blobs();
        let kmeans = Kmeans::new(2).with_seed(42);
        assert_eq!(kmeans.fit_predict(&data).unwrap(), kmeans.fit(&data).unwrap().labels);
    }

    #[test]
    fn test_kmeans_inertia_matches_labels() {
        let data = two_blobs();
        let fit = Kmeans::new(2).with_seed(7).fit(&data).unwrap();
        let expected: f64 = data
            .iter()
            .zip(fit.labels.iter())
            .map(|(p, &c)| util::squared_euclidean(p, &fit.centroids[c]))
            .sum();
        assert!((fit.inertia - expected).abs() < 1e-9);
        assert!(fit.iterations >= 1);
    }

    #[test]
    fn test_kmeans_seed_is_reproducible() {
        let data: Vec<Point> = (0..30).map(|i| [(i % 7) as f64, (i / 7) as f64]).collect();
        let a = Kmeans::new(3).with_seed(11).fit(&data).unwrap();
        let b = Kmeans::new(3).with_seed(11).fit(&data).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.centroids, b.centroids);
    }

    #[test]
    fn test_kmeans_k_equals_n() {
        let data: Vec<Point> = vec![[0.0, 0.0], [5.0, 0.0], [0.0, 5.0]];
        let fit = Kmeans::new(3).with_seed(1).fit(&data).unwrap();
        let mut labels = fit.labels.clone();
        labels.sort_unstable();
        assert_eq!(labels, vec![0, 1, 2]);
        assert!(fit.inertia.abs() < 1e-12);
    }

    #[test]
    fn test_kmeans_single_cluster_is_mean() {
        let data: Vec<Point> = vec![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let fit = Kmeans::new(1).fit(&data).unwrap();
        assert_eq!(fit.labels, vec![0, 0, 0]);
        assert!((fit.centroids[0][0] - 3.0).abs() < 1e-12);
        assert!((fit.centroids[0][1] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_kmeans_duplicate_points() {
        let data: Vec<Point> = vec![[1.0, 1.0]; 4];
        let fit = Kmeans::new(2).with_seed(3).fit(&data).unwrap();
        assert_eq!(fit.labels, vec![0, 0, 0, 0]);
        assert_eq!(fit.centroids, vec![[1.0, 1.0]]);
        assert!(fit.inertia.abs() < 1e-12);
    }

    #[test]
    fn test_compact_renumbers_in_ascending_order() {
        let fit = compact(KmeansFit {
            centroids: vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]],
            labels: vec![2, 0, 2],
            inertia: 0.0,
            iterations: 1,
        });
        assert_eq!(fit.labels, vec![1, 0, 1]);
        assert_eq!(fit.centroids, vec![[0.0, 0.0], [2.0, 2.0]]);
    }

    #[test]
    fn test_kmeans_invalid_params() {
        let data: Vec<Point> = vec![[0.0, 0.0], [1.0, 1.0]];
        assert!(matches!(Kmeans::new(0).fit(&data), Err(Error::InvalidClusterCount { .. })));
        assert!(matches!(
            Kmeans::new(3).fit(&data),
            Err(Error::InvalidClusterCount { requested: 3, n_items: 2 })
        ));
        assert!(matches!(
            Kmeans::new(1).with_n_init(0).fit(&data),
            Err(Error::InvalidParameter { name: "n_init", .. })
        ));
        assert!(matches!(Kmeans::new(1).fit(&[]), Err(Error::EmptyInput)));
    }
}
