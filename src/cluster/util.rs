use super::Point;

#[derive(Clone, Debug)]
pub(crate) struct UnionFind {
    pub(crate) parent: Vec<usize>,
    pub(crate) size: Vec<usize>,
}

impl UnionFind {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    pub(crate) fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    /// Merge the sets holding `a` and `b`. Returns `false` if they were already joined.
    pub(crate) fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }

        // Union by size.
        let (mut big, mut small) = (ra, rb);
        if self.size[big] < self.size[small] {
            std::mem::swap(&mut big, &mut small);
        }

        self.parent[small] = big;
        self.size[big] += self.size[small];
        true
    }
}

#[inline]
pub(crate) fn squared_euclidean(a: &Point, b: &Point) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

#[inline]
pub(crate) fn euclidean(a: &Point, b: &Point) -> f64 {
    squared_euclidean(a, b).sqrt()
}

/// Compute an MST for a dense complete graph using Prim's algorithm.
///
/// `dist_fn(i, j)` returns the edge weight between points `i` and `j`.
/// Returns edges `(u, v, dist)`.
pub(crate) fn prim_mst(n: usize, dist_fn: impl Fn(usize, usize) -> f64) -> Vec<(usize, usize, f64)> {
    if n <= 1 {
        return Vec::new();
    }

    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];
    let mut parent = vec![usize::MAX; n];

    best[0] = 0.0;

    for _ in 0..n {
        // Any vertex outside the tree qualifies, so inf-weight edges still connect it.
        let mut u = usize::MAX;
        for i in 0..n {
            if !in_tree[i] && (u == usize::MAX || best[i] < best[u]) {
                u = i;
            }
        }

        if u == usize::MAX {
            break;
        }
        in_tree[u] = true;

        for v in 0..n {
            if in_tree[v] {
                continue;
            }
            let d = dist_fn(u, v);
            if parent[v] == usize::MAX || d < best[v] {
                best[v] = d;
                parent[v] = u;
            }
        }
    }

    let mut edges: Vec<(usize, usize, f64)> = Vec::with_capacity(n - 1);
    for v in 1..n {
        let u = parent[v];
        if u != usize::MAX {
            edges.push((u, v, best[v]));
        }
    }
    edges
}

/// Renumber arbitrary group ids into `0..k` in order of first appearance.
pub(crate) fn relabel_contiguous(raw: &[usize]) -> Vec<usize> {
    let mut mapping: std::collections::HashMap<usize, usize> = std::collections::HashMap::new();
    raw.iter()
        .map(|&r| {
            let next = mapping.len();
            *mapping.entry(r).or_insert(next)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_find_joins_once() {
        let mut uf = UnionFind::new(4);
        assert!(uf.union(0, 1));
        assert!(uf.union(2, 3));
        assert!(!uf.union(1, 0));
        assert!(uf.union(1, 3));
        assert_eq!(uf.find(0), uf.find(2));
        let root = uf.find(0);
        assert_eq!(uf.size[root], 4);
    }

    #[test]
    fn prim_mst_on_a_line() {
        let pts: Vec<Point> = vec![[0.0, 0.0], [1.0, 0.0], [3.0, 0.0]];
        let mut edges = prim_mst(pts.len(), |i, j| euclidean(&pts[i], &pts[j]));
        edges.sort_by(|a, b| a.2.total_cmp(&b.2));
        assert_eq!(edges.len(), 2);
        assert!((edges[0].2 - 1.0).abs() < 1e-12);
        assert!((edges[1].2 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn prim_mst_spans_infinite_weights() {
        let edges = prim_mst(4, |_, _| f64::INFINITY);
        assert_eq!(edges.len(), 3);
    }

    #[test]
    fn relabel_by_first_appearance() {
        assert_eq!(relabel_contiguous(&[7, 7, 3, 9, 3]), vec![0, 0, 1, 2, 1]);
    }
}
