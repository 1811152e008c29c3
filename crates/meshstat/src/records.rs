//! Typed per-entity metric rows.

use meshstat_topo::{EntitySetId, TriangleId, VertexId};

/// Shape and roughness of one triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleMetrics {
    /// The triangle.
    pub triangle: TriangleId,
    /// Area.
    pub area: f64,
    /// Aspect ratio, 1 for equilateral.
    pub aspect_ratio: f64,
    /// Mean local roughness of its corners.
    pub roughness: f64,
}

/// Curvature and roughness at one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexMetrics {
    /// The vertex.
    pub vertex: VertexId,
    /// Incident triangles in scope.
    pub triangles: usize,
    /// Angle-deficit curvature.
    pub curvature: f64,
    /// Local roughness.
    pub roughness: f64,
}

/// Size and resolution of one surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMetrics {
    /// The surface set.
    pub surface: EntitySetId,
    /// Its global id.
    pub global_id: i32,
    /// Triangle count.
    pub triangles: usize,
    /// Total area.
    pub area: f64,
    /// Triangles per unit area.
    pub coarseness: f64,
}

/// Size and resolution of one volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeMetrics {
    /// The volume set.
    pub volume: EntitySetId,
    /// Its global id.
    pub global_id: i32,
    /// Child surface count.
    pub surfaces: usize,
    /// Triangle count over all child surfaces.
    pub triangles: usize,
    /// Total area over all child surfaces.
    pub area: f64,
    /// Triangles per unit area.
    pub coarseness: f64,
}
