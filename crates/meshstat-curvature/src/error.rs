//! Error types for curvature and roughness.

use meshstat_geom::GeomError;
use meshstat_topo::{TopoError, TriangleId, VertexId};
use thiserror::Error;

/// Errors that can occur while building the angle table or evaluating
/// curvature and roughness.
#[derive(Error, Debug)]
pub enum CurvatureError {
    /// A triangle in scope is degenerate.
    #[error("triangle {triangle:?}: {source}")]
    Geometry {
        /// The offending triangle.
        triangle: TriangleId,
        /// What was wrong with it.
        #[source]
        source: GeomError,
    },

    /// Kernel lookup failed.
    #[error(transparent)]
    Topo(#[from] TopoError),

    /// Vertex has no triangle in scope.
    #[error("vertex {0:?} has no incident triangle in scope")]
    IsolatedVertex(VertexId),

    /// Laplace weights around a vertex sum to zero.
    #[error("roughness undefined at vertex {vertex:?}: Laplace weights sum to {weight_sum}")]
    UndefinedRoughness {
        /// The vertex.
        vertex: VertexId,
        /// The weight sum that could not be divided by.
        weight_sum: f64,
    },

    /// Edge has a single triangle in scope and the boundary policy rejects it.
    #[error("edge {a:?}-{b:?} lies on a boundary")]
    BoundaryEdge {
        /// First endpoint.
        a: VertexId,
        /// Second endpoint.
        b: VertexId,
    },

    /// Edge is shared by more than two triangles in scope.
    #[error("edge {a:?}-{b:?} is shared by {triangles} triangles")]
    NonManifoldEdge {
        /// First endpoint.
        a: VertexId,
        /// Second endpoint.
        b: VertexId,
        /// Number of triangles on the edge.
        triangles: usize,
    },

    /// The kernel reports a triangle on an edge, but the angle table has
    /// no corner of that triangle opposite the edge.
    #[error("triangle {triangle:?} has no corner opposite edge {a:?}-{b:?}")]
    MissingCorner {
        /// The triangle the kernel reported.
        triangle: TriangleId,
        /// First endpoint.
        a: VertexId,
        /// Second endpoint.
        b: VertexId,
    },

    /// Scope holds no triangles.
    #[error("scope contains no triangles")]
    EmptyScope,
}

/// Result type for curvature operations.
pub type Result<T> = std::result::Result<T, CurvatureError>;
