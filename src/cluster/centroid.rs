use std::collections::BTreeMap;

use super::Point;

/// Compute one centroid per distinct non-negative label, in ascending label order.
///
/// Each centroid is the coordinate-wise mean of the points carrying that label.
/// Negative labels (noise) are skipped. Labels that never occur get no centroid,
/// so the output length always equals the number of distinct non-negative labels.
///
/// `points` and `labels` are zipped; extra entries on either side are ignored.
pub fn centroids_from_labels(points: &[Point], labels: &[i64]) -> Vec<Point> {
    let mut acc: BTreeMap<i64, ([f64; 2], usize)> = BTreeMap::new();
    for (p, &label) in points.iter().zip(labels.iter()) {
        if label < 0 {
            continue;
        }
        let (sum, count) = acc.entry(label).or_insert(([0.0, 0.0], 0));
        sum[0] += p[0];
        sum[1] += p[1];
        *count += 1;
    }

    acc.into_values()
        .map(|(sum, count)| [sum[0] / count as f64, sum[1] / count as f64])
        .collect()
}
