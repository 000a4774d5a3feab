//! Exact vector similarity primitives.
//!
//! Every sum is a left-to-right fold accumulated in `f64`, so identical
//! inputs always produce bit-identical scores regardless of thread or run.

use crate::domain::errors::{Result, RetrievalError};

fn ensure_same_dimension(a: &[f32], b: &[f32]) -> Result<()> {
    if a.len() != b.len() {
        return Err(RetrievalError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(())
}

pub fn dot(a: &[f32], b: &[f32]) -> Result<f64> {
    ensure_same_dimension(a, b)?;

    Ok(a.iter()
        .zip(b.iter())
        .fold(0.0f64, |acc, (&x, &y)| acc + f64::from(x) * f64::from(y)))
}

pub fn magnitude(v: &[f32]) -> f64 {
    v.iter()
        .fold(0.0f64, |acc, &x| {
            let x = f64::from(x);
            acc + x * x
        })
        .sqrt()
}

/// Cosine of the angle between `a` and `b`, in `[-1, 1]`.
///
/// A zero-magnitude operand scores `0.0` instead of failing.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    let dot = dot(a, b)?;
    let norm_a = magnitude(a);
    let norm_b = magnitude(b);

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_product() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, -5.0, 6.0];
        assert_eq!(dot(&a, &b).unwrap(), 12.0);
    }

    #[test]
    fn test_magnitude() {
        assert_eq!(magnitude(&[3.0, 4.0]), 5.0);
        assert_eq!(magnitude(&[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_self_similarity_is_one() {
        let v = [0.3, -1.7, 2.25, 0.01];
        let similarity = cosine_similarity(&v, &v).unwrap();
        assert!((similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_orthogonal_and_opposite() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
        let opposite = cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]).unwrap();
        assert!((opposite + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 1.0], &[0.0, 0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]);
        assert_eq!(
            result,
            Err(RetrievalError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
        assert!(dot(&[1.0], &[]).is_err());
    }

    #[test]
    fn test_bit_reproducible() {
        let a: Vec<f32> = (0..512).map(|i| (i as f32 * 0.37).sin()).collect();
        let b: Vec<f32> = (0..512).map(|i| (i as f32 * 0.11).cos()).collect();
        let first = cosine_similarity(&a, &b).unwrap();
        for _ in 0..10 {
            assert_eq!(cosine_similarity(&a, &b).unwrap().to_bits(), first.to_bits());
        }
    }
}
