#![warn(missing_docs)]

//! Discrete curvature and surface roughness for meshstat.
//!
//! The pipeline runs over a list of in-scope triangles:
//!
//! 1. [`AngleTable`] measures every triangle once and indexes the
//!    corners by triangle and by vertex.
//! 2. [`CurvatureMap`] takes the angle deficit `|2π − Σθ|` at each vertex.
//! 3. [`RoughnessMap`] compares each vertex's curvature with the
//!    cotangent-weighted mean of its one-ring neighbors, then averages
//!    per triangle and per scope.
//!
//! Only triangles in the list count toward valence, neighbors and edge
//! sharing. Edges with a single triangle follow a [`BoundaryPolicy`].
//!
//! # Example
//!
//! ```
//! use meshstat_curvature::{BoundaryPolicy, RoughnessAnalysis};
//! use meshstat_math::Tolerance;
//! use meshstat_topo::{primitives, MeshKernel, Scope};
//!
//! let cube = primitives::unit_cube(10.0);
//! let tris = cube.model.triangles_in(&Scope::Set(cube.volume)).unwrap();
//! let run = RoughnessAnalysis::run(
//!     &cube.model,
//!     &tris,
//!     BoundaryPolicy::default(),
//!     &Tolerance::DEFAULT,
//! )
//! .unwrap();
//! assert!(run.weighted_average().unwrap() < 1e-9);
//! ```

mod angle_table;
mod curvature;
mod error;
mod field;
mod roughness;

pub use angle_table::{AngleEntry, AngleTable};
pub use curvature::{gaussian_curvature, CurvatureMap};
pub use error::{CurvatureError, Result};
pub use field::VertexField;
pub use roughness::{
    laplace_weight, local_roughness, neighbors, BoundaryPolicy, RoughnessAnalysis, RoughnessMap,
};
