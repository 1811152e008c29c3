//! Per-triangle, per-corner angle table.

use std::collections::HashMap;

use meshstat_geom::TriangleShape;
use meshstat_math::{Point3, Tolerance};
use meshstat_topo::{MeshKernel, TriangleId, VertexId};
use tracing::debug;

use crate::{CurvatureError, Result};

/// One (triangle, corner) row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleEntry {
    /// Owning triangle.
    pub triangle: TriangleId,
    /// Corner vertex.
    pub vertex: VertexId,
    /// Interior angle at the corner (radians).
    pub angle: f64,
    /// Length of the side opposite the corner.
    pub opposite_side: f64,
}

/// Angles and side lengths of every triangle in a scope.
///
/// Rows are stored flat, three per triangle in kernel corner order, and
/// indexed both by triangle and by vertex so curvature and roughness
/// never scan the whole table.
#[derive(Debug, Clone, Default)]
pub struct AngleTable {
    rows: Vec<AngleEntry>,
    shapes: Vec<TriangleShape>,
    triangles: Vec<TriangleId>,
    by_triangle: HashMap<TriangleId, usize>,
    vertices: Vec<VertexId>,
    by_vertex: HashMap<VertexId, Vec<usize>>,
}

impl AngleTable {
    /// Measure every triangle in `triangles`. Repeated ids are measured
    /// once; a degenerate triangle fails the whole build.
    pub fn build<K: MeshKernel + ?Sized>(
        kernel: &K,
        triangles: &[TriangleId],
        tol: &Tolerance,
    ) -> Result<Self> {
        let mut table = Self {
            rows: Vec::with_capacity(triangles.len() * 3),
            shapes: Vec::with_capacity(triangles.len()),
            triangles: Vec::with_capacity(triangles.len()),
            ..Self::default()
        };

        for &tri in triangles {
            if table.by_triangle.contains_key(&tri) {
                continue;
            }
            let corners = kernel.vertices_of(tri)?;
            let mut points = [Point3::origin(); 3];
            for (p, &v) in points.iter_mut().zip(&corners) {
                *p = kernel.coordinates(v)?;
            }
            let shape = TriangleShape::measure(&points, tol).map_err(|source| {
                CurvatureError::Geometry {
                    triangle: tri,
                    source,
                }
            })?;

            table.by_triangle.insert(tri, table.triangles.len());
            table.triangles.push(tri);
            table.shapes.push(shape);
            for (i, &vertex) in corners.iter().enumerate() {
                let row = table.rows.len();
                table.rows.push(AngleEntry {
                    triangle: tri,
                    vertex,
                    angle: shape.angles[i],
                    opposite_side: shape.sides.opposite(i),
                });
                table
                    .by_vertex
                    .entry(vertex)
                    .or_insert_with(|| {
                        table.vertices.push(vertex);
                        Vec::new()
                    })
                    .push(row);
            }
        }

        debug!(
            triangles = table.triangles.len(),
            vertices = table.vertices.len(),
            "built angle table"
        );
        Ok(table)
    }

    /// All rows, three per triangle.
    pub fn rows(&self) -> &[AngleEntry] {
        &self.rows
    }

    /// Triangles in build order.
    pub fn triangles(&self) -> &[TriangleId] {
        &self.triangles
    }

    /// Vertices in order of first appearance.
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// True when the table holds no triangle.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// True when `tri` is in the table.
    pub fn contains(&self, tri: TriangleId) -> bool {
        self.by_triangle.contains_key(&tri)
    }

    /// The three rows of a triangle, in kernel corner order.
    pub fn corners(&self, tri: TriangleId) -> Option<&[AngleEntry]> {
        let idx = *self.by_triangle.get(&tri)?;
        Some(&self.rows[3 * idx..3 * idx + 3])
    }

    /// Full measurements of a triangle.
    pub fn shape(&self, tri: TriangleId) -> Option<&TriangleShape> {
        self.by_triangle.get(&tri).map(|&idx| &self.shapes[idx])
    }

    /// Angle of `tri` at `vertex`.
    pub fn angle_at(&self, tri: TriangleId, vertex: VertexId) -> Option<f64> {
        self.corners(tri)?
            .iter()
            .find(|e| e.vertex == vertex)
            .map(|e| e.angle)
    }

    /// The row of `tri` whose vertex is neither `a` nor `b`, provided
    /// both `a` and `b` are corners of `tri`.
    pub fn third_corner(&self, tri: TriangleId, a: VertexId, b: VertexId) -> Option<&AngleEntry> {
        let corners = self.corners(tri)?;
        let has = |v: VertexId| corners.iter().any(|e| e.vertex == v);
        if a == b || !has(a) || !has(b) {
            return None;
        }
        corners.iter().find(|e| e.vertex != a && e.vertex != b)
    }

    /// Rows whose corner is `vertex`.
    pub fn rows_at(&self, vertex: VertexId) -> impl Iterator<Item = &AngleEntry> + '_ {
        self.by_vertex
            .get(&vertex)
            .into_iter()
            .flatten()
            .map(move |&row| &self.rows[row])
    }

    /// Number of triangles in the table that touch `vertex`.
    pub fn valence(&self, vertex: VertexId) -> usize {
        self.by_vertex.get(&vertex).map_or(0, Vec::len)
    }

    /// Total area of the table's triangles that touch `vertex`.
    pub fn incident_area(&self, vertex: VertexId) -> f64 {
        self.rows_at(vertex)
            .filter_map(|e| self.shape(e.triangle))
            .map(|s| s.area)
            .sum()
    }

    /// Total area of every triangle in the table.
    pub fn total_area(&self) -> f64 {
        self.shapes.iter().map(|s| s.area).sum()
    }
}
