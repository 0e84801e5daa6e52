//! Palette quantization: Lloyd-style k-means over Lab samples.
//!
//! Centroids are seeded by plain uniform-random sampling (duplicates are
//! possible and not repaired) rather than k-means++, training runs over a
//! stride-sampled subset for a bounded number of rounds with an early-exit
//! on small centroid movement, and the final per-pixel assignment always
//! runs at full resolution regardless of the training stride.

use crate::execution::should_parallelize;
use crate::types::{Lab, Palette};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

const MAX_ROUNDS: u32 = 10;
const CONVERGENCE_THRESHOLD: f32 = 0.01;

/// Run k-means over `lab_buffer` (one Lab sample per pixel, row-major) and
/// return the palette plus a full-resolution label map.
///
/// `width`/`height` are only used to derive the sampling stride; the buffer
/// itself is already flat.
pub fn quantize(
    lab_buffer: &[Lab],
    width: u32,
    height: u32,
    k: u32,
    seed: Option<u64>,
) -> (Palette, Vec<u8>) {
    assert!(k > 0, "k must be positive");
    assert!(!lab_buffer.is_empty(), "lab_buffer must not be empty");

    let k = k as usize;
    let mut rng: ChaCha8Rng = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut centroids = initialize_centroids(lab_buffer, k, &mut rng);

    // Stride-sampled training set: bounds cost on large images, full
    // precision on small ones.
    let total = (width as usize) * (height as usize);
    let stride = (total / 50_000).max(1);
    let sample_indices: Vec<usize> = (0..total).step_by(stride).collect();

    for round in 0..MAX_ROUNDS {
        let assignments: Vec<usize> = if should_parallelize(sample_indices.len()) {
            sample_indices
                .par_iter()
                .map(|&i| nearest_centroid(&lab_buffer[i], &centroids))
                .collect()
        } else {
            sample_indices
                .iter()
                .map(|&i| nearest_centroid(&lab_buffer[i], &centroids))
                .collect()
        };

        let mut sums = vec![(0.0f32, 0.0f32, 0.0f32); k];
        let mut counts = vec![0u32; k];
        for (&idx, &cluster) in sample_indices.iter().zip(assignments.iter()) {
            let sample = &lab_buffer[idx];
            sums[cluster].0 += sample.l;
            sums[cluster].1 += sample.a;
            sums[cluster].2 += sample.b;
            counts[cluster] += 1;
        }

        let mut movement = 0.0f32;
        for j in 0..k {
            if counts[j] == 0 {
                continue; // empty cluster retains its previous centroid
            }
            let n = counts[j] as f32;
            let new_centroid = Lab::new(sums[j].0 / n, sums[j].1 / n, sums[j].2 / n);
            movement += centroids[j].distance_sq(&new_centroid);
            centroids[j] = new_centroid;
        }

        log::debug!(
            "k-means round {} of {}: centroid movement {:.5}",
            round + 1,
            MAX_ROUNDS,
            movement
        );

        if movement < CONVERGENCE_THRESHOLD {
            log::debug!("k-means converged after {} rounds", round + 1);
            break;
        }
    }

    // Final assignment pass: full resolution regardless of stride.
    let labels: Vec<u8> = if should_parallelize(lab_buffer.len()) {
        lab_buffer
            .par_iter()
            .map(|sample| nearest_centroid(sample, &centroids) as u8)
            .collect()
    } else {
        lab_buffer
            .iter()
            .map(|sample| nearest_centroid(sample, &centroids) as u8)
            .collect()
    };

    (centroids, labels)
}

fn initialize_centroids(lab_buffer: &[Lab], k: usize, rng: &mut ChaCha8Rng) -> Vec<Lab> {
    (0..k)
        .map(|_| lab_buffer[rng.gen_range(0..lab_buffer.len())])
        .collect()
}

/// Lowest index wins on equal distance.
fn nearest_centroid(sample: &Lab, centroids: &[Lab]) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (j, centroid) in centroids.iter().enumerate() {
        let d = sample.distance_sq(centroid);
        if d < best_dist {
            best_dist = d;
            best = j;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_well_separated_clusters_converge() {
        let mut samples = Vec::new();
        for _ in 0..50 {
            samples.push(Lab::new(0.0, 0.0, 0.0));
        }
        for _ in 0..50 {
            samples.push(Lab::new(100.0, 0.0, 0.0));
        }
        let (palette, labels) = quantize(&samples, 100, 1, 2, Some(42));
        assert_eq!(palette.len(), 2);
        let label0 = labels[0];
        let label_last = labels[99];
        assert_ne!(label0, label_last);
        assert!(labels[0..50].iter().all(|&l| l == label0));
        assert!(labels[50..100].iter().all(|&l| l == label_last));
    }

    #[test]
    fn deterministic_with_same_seed() {
        let samples: Vec<Lab> = (0..200)
            .map(|i| Lab::new((i % 7) as f32 * 10.0, 0.0, (i % 3) as f32 * 5.0))
            .collect();
        let (p1, l1) = quantize(&samples, 200, 1, 4, Some(7));
        let (p2, l2) = quantize(&samples, 200, 1, 4, Some(7));
        assert_eq!(p1.len(), p2.len());
        for (a, b) in p1.iter().zip(p2.iter()) {
            assert_eq!(a.l, b.l);
            assert_eq!(a.a, b.a);
            assert_eq!(a.b, b.b);
        }
        assert_eq!(l1, l2);
    }

    #[test]
    fn every_label_is_in_range() {
        let samples: Vec<Lab> = (0..500)
            .map(|i| Lab::new((i % 100) as f32, (i % 17) as f32 - 8.0, (i % 13) as f32 - 6.0))
            .collect();
        let (palette, labels) = quantize(&samples, 500, 1, 5, Some(1));
        assert!(labels.iter().all(|&l| (l as usize) < palette.len()));
    }
}
