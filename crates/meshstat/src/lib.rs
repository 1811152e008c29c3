#![warn(missing_docs)]

//! Mesh quality and roughness statistics for entity-set models.
//!
//! `meshstat` reads a mesh through the [`MeshKernel`] trait (volumes own
//! surfaces, surfaces own triangles) and reports:
//!
//! - triangle area and aspect ratio,
//! - surface and volume coarseness (triangles per unit area),
//! - adjacency counts such as triangles per vertex,
//! - discrete Gaussian curvature and cotangent-weighted local roughness,
//!   with area-weighted averages per surface, volume or model.
//!
//! Every call takes an immutable [`Query`] (scope plus
//! [`AnalysisSettings`]); an [`Analyzer`] memoizes the expensive parts
//! per scope.
//!
//! # Example
//!
//! ```
//! use meshstat::{Analyzer, Query};
//! use meshstat::topo::primitives;
//!
//! let pyramid = primitives::square_pyramid(10.0);
//! let mut analyzer = Analyzer::new(&pyramid.model);
//! let roughness = analyzer.roughness(&Query::set(pyramid.volume)).unwrap();
//! assert!(roughness > 0.0);
//! ```

pub use meshstat_curvature as curvature;
pub use meshstat_geom as geom;
pub use meshstat_math as math;
pub use meshstat_stats as stats;
pub use meshstat_topo as topo;

mod analyzer;
pub mod counts;
mod error;
mod records;
mod report;
mod settings;

pub use analyzer::{Analyzer, MetricKind};
pub use counts::{EntityListing, EntityRanges, NativeRanges};
pub use error::{MetricsError, Result};
pub use records::{SurfaceMetrics, TriangleMetrics, VertexMetrics, VolumeMetrics};
pub use report::{collect_report, ModelReport, ReportOptions, RoughnessReport};
pub use settings::{AnalysisSettings, Query};

pub use meshstat_curvature::BoundaryPolicy;
pub use meshstat_topo::{GeomDim, MeshKernel, MeshModel, Scope, ScopePolicy};
