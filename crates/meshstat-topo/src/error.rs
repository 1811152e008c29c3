//! Error types for entity lookup and scope resolution.

use thiserror::Error;

use crate::{EntitySetId, GeomDim, TriangleId, VertexId};

/// Errors raised by a [`MeshKernel`](crate::MeshKernel) or the in-memory model.
#[derive(Error, Debug)]
pub enum TopoError {
    /// The requested entity set cannot be analysed as a scope.
    #[error("entity set {set:?} has dimension {dim} and is neither a surface nor a volume")]
    InvalidScope {
        /// The offending set.
        set: EntitySetId,
        /// Its geometric dimension.
        dim: GeomDim,
    },

    /// Vertex handle not present in the model.
    #[error("unknown vertex {0:?}")]
    UnknownVertex(VertexId),

    /// Triangle handle not present in the model.
    #[error("unknown triangle {0:?}")]
    UnknownTriangle(TriangleId),

    /// Entity set handle not present in the model.
    #[error("unknown entity set {0:?}")]
    UnknownEntitySet(EntitySetId),

    /// Text does not name a geometric dimension.
    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    /// A triangle was given the same vertex more than once.
    #[error("triangle repeats vertex {0:?}")]
    RepeatedVertex(VertexId),

    /// Entity set membership does not match its dimension.
    #[error("invalid membership: {0}")]
    InvalidMembership(String),

    /// Snapshot document references missing entities.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Snapshot document is not valid JSON for the schema.
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for topology operations.
pub type Result<T> = std::result::Result<T, TopoError>;
