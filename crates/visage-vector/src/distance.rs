//! Distance computations for the exact-scan backend.
//!
//! Lower distance always means more similar. Cosine and inner-product are
//! expressed as `1 - similarity` so all metrics sort the same direction.

use visage_types::DistanceMetric;

/// Euclidean (L2) distance.
pub fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    let sum_squares: f32 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum();
    sum_squares.sqrt()
}

/// Dot product.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Cosine distance: `1 - cos(a, b)`. Zero-norm vectors are treated as
/// maximally distant.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = dot(a, a).sqrt();
    let norm_b = dot(b, b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot(a, b) / (norm_a * norm_b)
}

/// Distance between two vectors under the given metric.
pub fn between(metric: DistanceMetric, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        DistanceMetric::L2 => euclidean(a, b),
        DistanceMetric::Cosine => cosine(a, b),
        DistanceMetric::Ip => 1.0 - dot(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_unit_step() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert_eq!(euclidean(&a, &b), 1.0);
    }

    #[test]
    fn test_euclidean_345() {
        assert!((euclidean(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_identical_is_zero() {
        let v = vec![0.5, 0.5, 0.7];
        assert!(cosine(&v, &v).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_is_one() {
        assert!((cosine(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_norm_is_max() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[test]
    fn test_ip_distance_decreases_with_alignment() {
        let query = vec![1.0, 0.0];
        let near = between(DistanceMetric::Ip, &query, &[1.0, 0.0]);
        let far = between(DistanceMetric::Ip, &query, &[0.2, 0.0]);
        assert!(near < far);
    }
}
