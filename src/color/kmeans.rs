//! Small deterministic k-means for pixel colors.

/// One cluster: its centroid and how many points it absorbed.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    pub center: [f32; 3],
    pub size: usize,
}

const MAX_ITERATIONS: usize = 10;
/// Stop once no centroid moves further than this.
const EPSILON: f32 = 1.0;

fn distance_sq(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    (0..3).map(|i| (a[i] - b[i]).powi(2)).sum()
}

fn mean(points: &[[f32; 3]]) -> [f32; 3] {
    let mut sum = [0f64; 3];
    for p in points {
        for i in 0..3 {
            sum[i] += p[i] as f64;
        }
    }
    let n = points.len().max(1) as f64;
    [(sum[0] / n) as f32, (sum[1] / n) as f32, (sum[2] / n) as f32]
}

/// Seeds with the global mean, then repeatedly adds the point farthest
/// from every existing center.
fn seed_centers(points: &[[f32; 3]], k: usize) -> Vec<[f32; 3]> {
    let mut centers = vec![mean(points)];
    while centers.len() < k {
        let farthest = points
            .iter()
            .map(|p| {
                let d = centers
                    .iter()
                    .map(|c| distance_sq(p, c))
                    .fold(f32::INFINITY, f32::min);
                (p, d)
            })
            .fold((None, -1.0f32), |(best, best_d), (p, d)| {
                if d > best_d { (Some(p), d) } else { (best, best_d) }
            });
        match farthest {
            (Some(p), _) => centers.push(*p),
            (None, _) => break,
        }
    }
    centers
}

fn nearest(point: &[f32; 3], centers: &[[f32; 3]]) -> usize {
    let mut best = 0;
    let mut best_d = f32::INFINITY;
    for (i, c) in centers.iter().enumerate() {
        let d = distance_sq(point, c);
        if d < best_d {
            best = i;
            best_d = d;
        }
    }
    best
}

/// Clusters `points` into at most `k` groups. Output order follows the
/// seeding order, so results are reproducible for identical input.
pub fn kmeans(points: &[[f32; 3]], k: usize) -> Vec<Cluster> {
    if points.is_empty() || k == 0 {
        return Vec::new();
    }
    let k = k.min(points.len());
    let mut centers = seed_centers(points, k);
    let mut labels = vec![0usize; points.len()];

    for _ in 0..MAX_ITERATIONS {
        for (label, p) in labels.iter_mut().zip(points) {
            *label = nearest(p, &centers);
        }

        let mut sums = vec![[0f64; 3]; centers.len()];
        let mut counts = vec![0usize; centers.len()];
        for (&label, p) in labels.iter().zip(points) {
            counts[label] += 1;
            for i in 0..3 {
                sums[label][i] += p[i] as f64;
            }
        }

        let mut max_shift = 0f32;
        for (c, (sum, &count)) in centers.iter_mut().zip(sums.iter().zip(&counts)) {
            // Empty clusters keep their previous center
            if count == 0 {
                continue;
            }
            let updated = [
                (sum[0] / count as f64) as f32,
                (sum[1] / count as f64) as f32,
                (sum[2] / count as f64) as f32,
            ];
            max_shift = max_shift.max(distance_sq(c, &updated).sqrt());
            *c = updated;
        }

        if max_shift < EPSILON {
            break;
        }
    }

    for (label, p) in labels.iter_mut().zip(points) {
        *label = nearest(p, &centers);
    }
    let mut sizes = vec![0usize; centers.len()];
    for &label in &labels {
        sizes[label] += 1;
    }

    centers
        .into_iter()
        .zip(sizes)
        .map(|(center, size)| Cluster { center, size })
        .collect()
}

/// Centroid of the most populated cluster; ties go to the earlier cluster.
pub fn dominant_center(points: &[[f32; 3]], k: usize) -> Option<[f32; 3]> {
    let clusters = kmeans(points, k);
    let mut best: Option<&Cluster> = None;
    for cluster in &clusters {
        if best.is_none_or(|b| cluster.size > b.size) {
            best = Some(cluster);
        }
    }
    best.map(|c| c.center)
}
