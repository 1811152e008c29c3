#![warn(missing_docs)]

//! Math types for the meshstat analysis crates.
//!
//! Thin wrappers around nalgebra for mesh coordinates, the modulo-3
//! corner rotation shared by every per-triangle computation, and the
//! tolerance constants used to detect degenerate input.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// Corner that follows `i` in a triangle's rotation order.
///
/// Corners are numbered 0, 1, 2 in the order the kernel reports them.
/// The side opposite corner `i` joins `next(i)` and `prev(i)`.
#[inline]
pub const fn next(i: usize) -> usize {
    (i + 1) % 3
}

/// Corner that precedes `i` in a triangle's rotation order.
#[inline]
pub const fn prev(i: usize) -> usize {
    (i + 2) % 3
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Relative linear tolerance: a triangle whose smallest altitude is
    /// below this fraction of its longest side is degenerate.
    pub linear: f64,
    /// Angular tolerance in radians. Also bounds how far a computed
    /// cosine may stray outside `[-1, 1]` before it is rejected.
    pub angular: f64,
    /// Smallest magnitude a sum of Laplace weights may have.
    pub weight: f64,
}

impl Tolerance {
    /// Default tolerances (1e-6 linear, 1e-9 rad angular, 1e-12 weight).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
        weight: 1e-12,
    };

    /// Check if a summed Laplace weight is too small to divide by.
    pub fn is_zero_weight(&self, w: f64) -> bool {
        !w.is_finite() || w.abs() <= self.weight
    }

    /// Clamp a cosine into `[-1, 1]`, or `None` if it lies further
    /// outside than the angular tolerance allows.
    pub fn clamp_cosine(&self, cos: f64) -> Option<f64> {
        if !cos.is_finite() || cos.abs() > 1.0 + self.angular {
            None
        } else {
            Some(cos.clamp(-1.0, 1.0))
        }
    }

    /// All components are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        [self.linear, self.angular, self.weight]
            .iter()
            .all(|t| t.is_finite() && *t > 0.0)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_cycles() {
        for i in 0..3 {
            assert_eq!(prev(next(i)), i);
            assert_eq!(next(next(next(i))), i);
            assert_ne!(next(i), i);
            assert_ne!(prev(i), i);
            assert_ne!(next(i), prev(i));
        }
        assert_eq!(next(2), 0);
        assert_eq!(prev(0), 2);
    }

    #[test]
    fn test_clamp_cosine() {
        let tol = Tolerance::DEFAULT;
        assert_eq!(tol.clamp_cosine(0.5), Some(0.5));
        assert_eq!(tol.clamp_cosine(1.0 + 1e-12), Some(1.0));
        assert_eq!(tol.clamp_cosine(-1.0 - 1e-12), Some(-1.0));
        assert_eq!(tol.clamp_cosine(1.01), None);
        assert_eq!(tol.clamp_cosine(f64::NAN), None);
    }

    #[test]
    fn test_zero_weight() {
        let tol = Tolerance::DEFAULT;
        assert!(tol.is_zero_weight(0.0));
        assert!(tol.is_zero_weight(1e-15));
        assert!(tol.is_zero_weight(f64::INFINITY));
        assert!(!tol.is_zero_weight(0.5));
        assert!(!tol.is_zero_weight(-0.5));
    }

    #[test]
    fn test_validity() {
        assert!(Tolerance::DEFAULT.is_valid());
        let bad = Tolerance {
            linear: 0.0,
            ..Tolerance::DEFAULT
        };
        assert!(!bad.is_valid());
    }
}
