//! Agglomerative (bottom-up hierarchical) clustering.
//!
//! Every point starts as its own cluster. The two closest clusters are merged
//! repeatedly until exactly `k` clusters remain. "Closest" is defined by the
//! [`Linkage`] criterion.
//!
//! ## Linkages
//!
//! - **Ward** (default): merge the pair whose union increases the within-cluster
//!   sum of squares the least. Produces compact, similarly sized clusters.
//! - **Complete**: distance between the farthest members.
//! - **Average**: mean pairwise distance between members (UPGMA).
//! - **Single**: distance between the closest members. Computed by cutting the
//!   minimum spanning tree, which is exactly the single-linkage dendrogram.
//!
//! Ward, complete and average use Lance–Williams updates on a dense distance
//! matrix: O(n²) memory, O(n³) time. Fine for interactive point sets.
//!
//! The algorithm produces labels only. Cluster centroids, if needed, come from
//! [`super::centroids_from_labels`].
//!
//! ## References
//!
//! Lance, G. N., Williams, W. T. (1967). "A General Theory of Classificatory
//! Sorting Strategies." The Computer Journal 9(4).

use super::traits::Clustering;
use super::util::{self, UnionFind};
use super::Point;
use crate::error::{Error, Result};

/// Inter-cluster distance criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Linkage {
    /// Minimum increase of within-cluster variance.
    #[default]
    Ward,
    /// Maximum pairwise distance.
    Complete,
    /// Mean pairwise distance.
    Average,
    /// Minimum pairwise distance.
    Single,
}

/// Agglomerative clustering algorithm.
#[derive(Debug, Clone)]
pub struct Agglomerative {
    k: usize,
    linkage: Linkage,
}

impl Agglomerative {
    /// Create a clusterer that stops merging at `k` clusters, using Ward linkage.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            linkage: Linkage::default(),
        }
    }

    /// Set the linkage criterion.
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    fn single_linkage(&self, points: &[Point]) -> UnionFind {
        let n = points.len();
        let mut mst = util::prim_mst(n, |i, j| util::euclidean(&points[i], &points[j]));
        mst.sort_by(|a, b| a.2.total_cmp(&b.2));

        let mut uf = UnionFind::new(n);
        for (u, v, _) in mst.into_iter().take(n - self.k) {
            uf.union(u, v);
        }
        uf
    }

    fn lance_williams(&self, points: &[Point]) -> Result<UnionFind> {
        let n = points.len();

        // Ward works on squared distances; the others on plain Euclidean ones.
        let base = |i: usize, j: usize| match self.linkage {
            Linkage::Ward => util::squared_euclidean(&points[i], &points[j]),
            _ => util::euclidean(&points[i], &points[j]),
        };

        let mut dist = vec![0.0f64; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = base(i, j);
                dist[i * n + j] = d;
                dist[j * n + i] = d;
            }
        }

        let mut active = vec![true; n];
        let mut sizes = vec![1usize; n];
        let mut uf = UnionFind::new(n);
        let mut remaining = n;

        while remaining > self.k {
            // Total order so a pair is always chosen, even when distances overflowed to inf.
            let mut best: Option<(usize, usize, f64)> = None;
            for i in 0..n {
                if !active[i] {
                    continue;
                }
                for j in (i + 1)..n {
                    let d = dist[i * n + j];
                    if active[j] && best.map_or(true, |(_, _, bd)| d.total_cmp(&bd).is_lt()) {
                        best = Some((i, j, d));
                    }
                }
            }

            let Some((a, b, best_d)) = best else {
                return Err(Error::Other(format!(
                    "agglomerative merging stalled at {remaining} clusters, wanted {}",
                    self.k
                )));
            };

            let (na, nb) = (sizes[a] as f64, sizes[b] as f64);
            for c in 0..n {
                if !active[c] || c == a || c == b {
                    continue;
                }
                let d_ac = dist[a * n + c];
                let d_bc = dist[b * n + c];
                let merged = match self.linkage {
                    Linkage::Ward => {
                        let nc = sizes[c] as f64;
                        ((na + nc) * d_ac + (nb + nc) * d_bc - nc * best_d) / (na + nb + nc)
                    }
                    Linkage::Complete => d_ac.max(d_bc),
                    Linkage::Average => (na * d_ac + nb * d_bc) / (na + nb),
                    Linkage::Single => d_ac.min(d_bc),
                };
                dist[a * n + c] = merged;
                dist[c * n + a] = merged;
            }

            active[b] = false;
            sizes[a] += sizes[b];
            uf.union(a, b);
            remaining -= 1;
        }

        Ok(uf)
    }
}

impl Clustering for Agglomerative {
    fn fit_predict(&self, points: &[Point]) -> Result<Vec<usize>> {
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

        let mut uf = match self.linkage {
            Linkage::Single => self.single_linkage(points),
            _ => self.lance_williams(points)?,
        };

        let roots: Vec<usize> = (0..n).map(|i| uf.find(i)).collect();
        Ok(util::relabel_contiguous(&roots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_groups() -> Vec<Point> {
        vec![
            [1.0, 1.0],
            [1.1, 1.1],
            [1.2, 1.0],
            [5.0, 5.0],
            [5.1, 5.1],
            [5.0, 5.2],
            [3.0, 3.0],
            [3.1, 3.0],
            [3.0, 3.1],
        ]
    }

    fn assert_three_groups(labels: &[usize]) {
        assert_eq!(labels.len(), 9);
        for g in 0..3 {
            let l = labels[g * 3];
            assert_eq!(labels[g * 3 + 1], l);
            assert_eq!(labels[g * 3 + 2], l);
        }
        assert_ne!(labels[0], labels[3]);
        assert_ne!(labels[0], labels[6]);
        assert_ne!(labels[3], labels[6]);
    }

    #[test]
    fn test_every_linkage_recovers_groups() {
        let data = three_groups();
        for linkage in [Linkage::Ward, Linkage::Complete, Linkage::Average, Linkage::Single] {
            let labels = Agglomerative::new(3)
                .with_linkage(linkage)
                .fit_predict(&data)
                .unwrap();
            assert_three_groups(&labels);
            assert!(labels.iter().all(|&l| l < 3), "{linkage:?}");
        }
    }

    #[test]
    fn test_labels_in_first_appearance_order() {
        let labels = Agglomerative::new(3).fit_predict(&three_groups()).unwrap();
        assert_eq!(labels[0], 0);
        assert_eq!(labels[3], 1);
        assert_eq!(labels[6], 2);
    }

    #[test]
    fn test_k_equals_n_keeps_singletons() {
        let data: Vec<Point> = vec![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]];
        let labels = Agglomerative::new(3).fit_predict(&data).unwrap();
        assert_eq!(labels, vec![0, 1, 2]);
    }

    #[test]
    fn test_k_one_merges_everything() {
        let labels = Agglomerative::new(1).fit_predict(&three_groups()).unwrap();
        assert!(labels.iter().all(|&l| l == 0));
    }

    #[test]
    fn test_single_linkage_follows_chain() {
        // A chain and a far point: single linkage keeps the chain together,
        // even though its ends are farther apart than the gap to the outlier.
        let data: Vec<Point> = vec![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [5.5, 0.0]];
        let labels = Agglomerative::new(2)
            .with_linkage(Linkage::Single)
            .fit_predict(&data)
            .unwrap();
        assert_eq!(labels, vec![0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_duplicate_points() {
        let data: Vec<Point> = vec![[2.0, 2.0]; 5];
        let labels = Agglomerative::new(2).fit_predict(&data).unwrap();
        let mut distinct = labels.clone();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(distinct, vec![0, 1]);
    }

    #[test]
    fn test_overflowing_distances_still_give_k_clusters() {
        // Squared distances between these points overflow to inf.
        let data: Vec<Point> = vec![[0.0, 0.0], [1e160, 0.0], [2e160, 0.0], [3e160, 0.0]];
        for linkage in [Linkage::Ward, Linkage::Complete, Linkage::Average, Linkage::Single] {
            let labels = Agglomerative::new(2)
                .with_linkage(linkage)
                .fit_predict(&data)
                .unwrap();
            let mut distinct = labels.clone();
            distinct.sort_unstable();
            distinct.dedup();
            assert_eq!(distinct, vec![0, 1], "{linkage:?}");
        }
    }

    #[test]
    fn test_invalid_params() {
        let data: Vec<Point> = vec![[0.0, 0.0], [1.0, 1.0]];
        assert!(matches!(Agglomerative::new(0).fit_predict(&data), Err(Error::InvalidClusterCount { .. })));
        assert!(matches!(Agglomerative::new(3).fit_predict(&data), Err(Error::InvalidClusterCount { .. })));
        assert!(matches!(Agglomerative::new(1).fit_predict(&[]), Err(Error::EmptyInput)));
    }
}
