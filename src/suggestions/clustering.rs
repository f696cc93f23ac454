//! Standardised k-means over small patient feature vectors.
//!
//! Deterministic: centroids are seeded from the first point and then by
//! farthest-point selection, so identical inputs always cluster identically.

use crate::models::enums::Gender;
use crate::models::Patient;

const MAX_ITERATIONS: usize = 100;

pub type Features = [f64; 4];

/// Gender flag, allergy count, active-medication count, history presence.
pub fn patient_features(patient: &Patient) -> Features {
    [
        if patient.gender == Gender::Male { 1.0 } else { 0.0 },
        patient.allergy_names().len() as f64,
        patient.active_medications.len() as f64,
        if patient.has_history() { 1.0 } else { 0.0 },
    ]
}

/// Zero-mean, unit-variance scaling fitted on a sample. Constant columns scale by 1.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Features,
    scale: Features,
}

impl StandardScaler {
    pub fn fit(points: &[Features]) -> Self {
        let n = points.len().max(1) as f64;
        let mut mean = [0.0; 4];
        for p in points {
            for (m, v) in mean.iter_mut().zip(p) {
                *m += v / n;
            }
        }
        let mut scale = [0.0; 4];
        for p in points {
            for ((s, v), m) in scale.iter_mut().zip(p).zip(&mean) {
                *s += (v - m).powi(2) / n;
            }
        }
        for s in &mut scale {
            *s = s.sqrt();
            if *s < f64::EPSILON {
                *s = 1.0;
            }
        }
        Self { mean, scale }
    }

    pub fn transform(&self, point: &Features) -> Features {
        std::array::from_fn(|i| (point[i] - self.mean[i]) / self.scale[i])
    }
}

fn distance_sq(a: &Features, b: &Features) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

fn nearest(point: &Features, centroids: &[Features]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = distance_sq(point, c);
        if d < best_distance {
            best = i;
            best_distance = d;
        }
    }
    best
}

/// Fitted k-means model.
#[derive(Debug, Clone)]
pub struct KMeans {
    centroids: Vec<Features>,
}

impl KMeans {
    /// Fit `k` clusters (clamped to `1..=points.len()`); returns the model
    /// and each point's cluster label.
    pub fn fit(points: &[Features], k: usize) -> (Self, Vec<usize>) {
        if points.is_empty() {
            return (Self { centroids: Vec::new() }, Vec::new());
        }
        let k = k.clamp(1, points.len());

        let mut centroids = vec![points[0]];
        while centroids.len() < k {
            let farthest = points
                .iter()
                .map(|p| {
                    centroids
                        .iter()
                        .map(|c| distance_sq(p, c))
                        .fold(f64::INFINITY, f64::min)
                })
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |best, (i, d)| if d > best.1 { (i, d) } else { best })
                .0;
            centroids.push(points[farthest]);
        }

        let mut labels = vec![0; points.len()];
        for _ in 0..MAX_ITERATIONS {
            let mut changed = false;
            for (label, p) in labels.iter_mut().zip(points) {
                let assigned = nearest(p, &centroids);
                if *label != assigned {
                    *label = assigned;
                    changed = true;
                }
            }

            for (c, centroid) in centroids.iter_mut().enumerate() {
                let members: Vec<&Features> = points
                    .iter()
                    .zip(&labels)
                    .filter(|(_, l)| **l == c)
                    .map(|(p, _)| p)
                    .collect();
                if members.is_empty() {
                    continue;
                }
                let count = members.len() as f64;
                let mut mean = [0.0; 4];
                for m in members {
                    for (acc, v) in mean.iter_mut().zip(m) {
                        *acc += v / count;
                    }
                }
                *centroid = mean;
            }

            if !changed {
                break;
            }
        }

        (Self { centroids }, labels)
    }

    pub fn predict(&self, point: &Features) -> usize {
        nearest(point, &self.centroids)
    }
}

/// Indices of the candidates that share the subject's cluster, in input order.
///
/// Fewer than two candidates cannot be clustered and are returned as-is.
pub fn same_cluster(subject: &Features, candidates: &[Features], cluster_count: usize) -> Vec<usize> {
    if candidates.len() < 2 {
        return (0..candidates.len()).collect();
    }
    let scaler = StandardScaler::fit(candidates);
    let scaled: Vec<Features> = candidates.iter().map(|c| scaler.transform(c)).collect();
    let (model, labels) = KMeans::fit(&scaled, cluster_count.min(candidates.len()));
    let target = model.predict(&scaler.transform(subject));
    labels
        .iter()
        .enumerate()
        .filter(|(_, l)| **l == target)
        .map(|(i, _)| i)
        .collect()
}
