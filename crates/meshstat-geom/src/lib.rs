#![warn(missing_docs)]

//! Per-triangle geometry for meshstat.
//!
//! Everything here works from a triangle's three corner positions:
//! side lengths keyed by the opposite corner, area, interior angles, and
//! the aspect-ratio quality measure. Degenerate triangles (collinear or
//! coincident corners) are reported as [`GeomError`] instead of producing
//! NaN.
//!
//! # Example
//!
//! ```
//! use meshstat_geom::TriangleSides;
//! use meshstat_math::{Point3, Tolerance};
//!
//! let sides = TriangleSides::from_points(&[
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(3.0, 0.0, 0.0),
//!     Point3::new(0.0, 4.0, 0.0),
//! ]);
//! let area = sides.area(&Tolerance::DEFAULT).unwrap();
//! assert!((area - 6.0).abs() < 1e-12);
//! ```

use meshstat_math::{next, prev, Point3, Tolerance};
use thiserror::Error;

/// Errors from triangle measures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeomError {
    /// Corners are collinear or coincident: the smallest altitude is
    /// below `Tolerance::linear` times the longest side.
    #[error("degenerate triangle with sides {0:?}")]
    Degenerate([f64; 3]),

    /// Law of cosines produced a value outside the arccos domain.
    #[error("cosine {cosine} at corner {corner} is outside [-1, 1]")]
    CosineOutOfRange {
        /// Corner index (0 to 2).
        corner: usize,
        /// The offending cosine.
        cosine: f64,
    },
}

/// Result type for triangle measures.
pub type Result<T> = std::result::Result<T, GeomError>;

/// Side lengths of a triangle, indexed by the opposite corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleSides {
    lengths: [f64; 3],
}

impl TriangleSides {
    /// Measure a triangle. The side opposite corner `i` joins corners
    /// `next(i)` and `prev(i)`.
    pub fn from_points(points: &[Point3; 3]) -> Self {
        Self {
            lengths: std::array::from_fn(|i| (points[next(i)] - points[prev(i)]).norm()),
        }
    }

    /// Wrap lengths already keyed by opposite corner.
    pub fn from_lengths(lengths: [f64; 3]) -> Self {
        Self { lengths }
    }

    /// Length of the side opposite corner `i`.
    pub fn opposite(&self, i: usize) -> f64 {
        self.lengths[i]
    }

    /// All three lengths, indexed by opposite corner.
    pub fn lengths(&self) -> [f64; 3] {
        self.lengths
    }

    /// Half the perimeter.
    pub fn semi_perimeter(&self) -> f64 {
        0.5 * self.lengths.iter().sum::<f64>()
    }

    /// Area by Heron's formula.
    ///
    /// Evaluated in Kahan's arrangement (sides sorted `a ≥ b ≥ c`) to stay
    /// accurate for needle-shaped triangles; mathematically equal to
    /// `√(s(s−a)(s−b)(s−c))`.
    pub fn area(&self, tol: &Tolerance) -> Result<f64> {
        let [a, b, c] = self.sorted_desc();
        let q = (a + (b + c)) * (c - (a - b)) * (c + (a - b)) * (a + (b - c));
        if !(q > 0.0) || !q.is_finite() {
            return Err(GeomError::Degenerate(self.lengths));
        }
        let area = 0.25 * q.sqrt();
        // Smallest altitude (dropped onto the longest side) relative to
        // that side, so the guard does not depend on model units.
        if 2.0 * area / (a * a) < tol.linear {
            return Err(GeomError::Degenerate(self.lengths));
        }
        Ok(area)
    }

    /// Aspect ratio `abc / (8(s−a)(s−b)(s−c))`; 1 for an equilateral
    /// triangle and unbounded for slivers.
    pub fn aspect_ratio(&self, tol: &Tolerance) -> Result<f64> {
        self.area(tol)?;
        let s = self.semi_perimeter();
        let [a, b, c] = self.lengths;
        let denom = 8.0 * (s - a) * (s - b) * (s - c);
        if !(denom > 0.0) {
            return Err(GeomError::Degenerate(self.lengths));
        }
        Ok(a * b * c / denom)
    }

    /// Interior angle at corner `i` from the law of cosines,
    /// `acos((b² + c² − a²) / 2bc)` with `a` opposite `i`.
    pub fn angle(&self, i: usize, tol: &Tolerance) -> Result<f64> {
        let a = self.lengths[i];
        let b = self.lengths[next(i)];
        let c = self.lengths[prev(i)];
        let cosine = (b * b + c * c - a * a) / (2.0 * b * c);
        tol.clamp_cosine(cosine)
            .map(f64::acos)
            .ok_or(GeomError::CosineOutOfRange { corner: i, cosine })
    }

    /// All three interior angles, after checking the triangle is not
    /// degenerate.
    pub fn angles(&self, tol: &Tolerance) -> Result<[f64; 3]> {
        self.area(tol)?;
        Ok([self.angle(0, tol)?, self.angle(1, tol)?, self.angle(2, tol)?])
    }

    fn sorted_desc(&self) -> [f64; 3] {
        let mut s = self.lengths;
        s.sort_by(|x, y| y.total_cmp(x));
        s
    }
}

/// Area as half the norm of the cross product of two edge vectors.
pub fn cross_area(points: &[Point3; 3]) -> f64 {
    let e1 = points[1] - points[0];
    let e2 = points[2] - points[0];
    0.5 * e1.cross(&e2).norm()
}

/// Every measure of one non-degenerate triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleShape {
    /// Side lengths keyed by opposite corner.
    pub sides: TriangleSides,
    /// Interior angle at each corner (radians).
    pub angles: [f64; 3],
    /// Area.
    pub area: f64,
    /// Aspect ratio.
    pub aspect_ratio: f64,
}

impl TriangleShape {
    /// Measure a triangle, failing on degenerate input.
    pub fn measure(points: &[Point3; 3], tol: &Tolerance) -> Result<Self> {
        let sides = TriangleSides::from_points(points);
        Ok(Self {
            sides,
            angles: sides.angles(tol)?,
            area: sides.area(tol)?,
            aspect_ratio: sides.aspect_ratio(tol)?,
        })
    }
}
