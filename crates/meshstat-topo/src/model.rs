//! In-memory entity store.

use meshstat_math::Point3;
use slotmap::{SecondaryMap, SlotMap};
use tracing::warn;

use crate::{EntitySetId, GeomDim, MeshKernel, Result, TopoError, TriangleId, VertexId};

/// A tagged grouping of mesh entities.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySet {
    /// Geometric dimension tag.
    pub dim: GeomDim,
    /// User-facing id, unique per dimension by convention only.
    pub global_id: i32,
    /// Triangles owned directly (surfaces only).
    pub triangles: Vec<TriangleId>,
    /// Child sets (volumes only).
    pub children: Vec<EntitySetId>,
}

/// Mesh database held entirely in memory.
///
/// Entities are never removed, so slot order equals insertion order and
/// every listing is stable.
#[derive(Debug, Clone, Default)]
pub struct MeshModel {
    vertices: SlotMap<VertexId, Point3>,
    triangles: SlotMap<TriangleId, [VertexId; 3]>,
    sets: SlotMap<EntitySetId, EntitySet>,
    incidence: SecondaryMap<VertexId, Vec<TriangleId>>,
}

impl MeshModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex at `point`.
    pub fn add_vertex(&mut self, point: Point3) -> VertexId {
        let id = self.vertices.insert(point);
        self.incidence.insert(id, Vec::new());
        id
    }

    /// Add a triangle over three distinct existing vertices.
    pub fn add_triangle(&mut self, corners: [VertexId; 3]) -> Result<TriangleId> {
        for (i, &v) in corners.iter().enumerate() {
            if !self.vertices.contains_key(v) {
                return Err(TopoError::UnknownVertex(v));
            }
            if corners[..i].contains(&v) {
                return Err(TopoError::RepeatedVertex(v));
            }
        }
        Ok(self.link_triangle(corners))
    }

    fn link_triangle(&mut self, corners: [VertexId; 3]) -> TriangleId {
        let id = self.triangles.insert(corners);
        for v in corners {
            if let Some(list) = self.incidence.get_mut(v) {
                list.push(id);
            }
        }
        id
    }

    /// Add a surface owning fresh triangles over known-distinct corners,
    /// optionally as a child of `volume`. Used by the fixture builders.
    pub(crate) fn insert_surface(
        &mut self,
        global_id: i32,
        tris: &[[VertexId; 3]],
        volume: Option<EntitySetId>,
    ) -> EntitySetId {
        let triangles = tris.iter().map(|&c| self.link_triangle(c)).collect();
        let surf = self.sets.insert(EntitySet {
            dim: GeomDim::Surface,
            global_id,
            triangles,
            children: Vec::new(),
        });
        if let Some(parent) = volume.and_then(|v| self.sets.get_mut(v)) {
            parent.children.push(surf);
        }
        surf
    }

    /// Add an empty entity set.
    pub fn add_set(&mut self, dim: GeomDim, global_id: i32) -> EntitySetId {
        self.sets.insert(EntitySet {
            dim,
            global_id,
            triangles: Vec::new(),
            children: Vec::new(),
        })
    }

    /// Put a triangle in a surface set.
    pub fn add_to_set(&mut self, set: EntitySetId, tri: TriangleId) -> Result<()> {
        if !self.triangles.contains_key(tri) {
            return Err(TopoError::UnknownTriangle(tri));
        }
        let entry = self
            .sets
            .get_mut(set)
            .ok_or(TopoError::UnknownEntitySet(set))?;
        if entry.dim != GeomDim::Surface {
            return Err(TopoError::InvalidMembership(format!(
                "only surfaces own triangles, {set:?} is {}",
                entry.dim
            )));
        }
        if !entry.triangles.contains(&tri) {
            entry.triangles.push(tri);
        }
        Ok(())
    }

    /// Make `child` (a surface) a child of `parent` (a volume).
    pub fn add_child(&mut self, parent: EntitySetId, child: EntitySetId) -> Result<()> {
        let child_dim = self
            .sets
            .get(child)
            .ok_or(TopoError::UnknownEntitySet(child))?
            .dim;
        let entry = self
            .sets
            .get_mut(parent)
            .ok_or(TopoError::UnknownEntitySet(parent))?;
        if entry.dim != GeomDim::Volume || child_dim != GeomDim::Surface {
            return Err(TopoError::InvalidMembership(format!(
                "volume/surface expected, got {} owning {}",
                entry.dim, child_dim
            )));
        }
        if !entry.children.contains(&child) {
            entry.children.push(child);
        }
        Ok(())
    }

    /// Look up a set.
    pub fn set(&self, set: EntitySetId) -> Result<&EntitySet> {
        self.sets.get(set).ok_or(TopoError::UnknownEntitySet(set))
    }

    /// Sets of dimension `dim` whose global id is in `ids`.
    ///
    /// An empty `ids` returns every set of that dimension. Ids that match
    /// nothing are logged and skipped.
    pub fn sets_by_id(&self, dim: GeomDim, ids: &[i32]) -> Vec<EntitySetId> {
        let of_dim = self.sets.iter().filter(|(_, s)| s.dim == dim);
        if ids.is_empty() {
            return of_dim.map(|(id, _)| id).collect();
        }
        let found: Vec<EntitySetId> = of_dim
            .filter(|(_, s)| ids.contains(&s.global_id))
            .map(|(id, _)| id)
            .collect();
        if found.is_empty() {
            warn!(%dim, ?ids, "no entity set matches the requested global ids");
        }
        found
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Number of entity sets of every dimension.
    pub fn num_sets(&self) -> usize {
        self.sets.len()
    }

    pub(crate) fn vertex_entries(&self) -> impl Iterator<Item = (VertexId, &Point3)> {
        self.vertices.iter()
    }

    pub(crate) fn triangle_entries(&self) -> impl Iterator<Item = (TriangleId, &[VertexId; 3])> {
        self.triangles.iter()
    }

    pub(crate) fn set_entries(&self) -> impl Iterator<Item = (EntitySetId, &EntitySet)> {
        self.sets.iter()
    }
}

impl MeshKernel for MeshModel {
    fn vertices(&self) -> Vec<VertexId> {
        self.vertices.keys().collect()
    }

    fn triangles(&self) -> Vec<TriangleId> {
        self.triangles.keys().collect()
    }

    fn vertices_of(&self, tri: TriangleId) -> Result<[VertexId; 3]> {
        self.triangles
            .get(tri)
            .copied()
            .ok_or(TopoError::UnknownTriangle(tri))
    }

    fn coordinates(&self, vertex: VertexId) -> Result<Point3> {
        self.vertices
            .get(vertex)
            .copied()
            .ok_or(TopoError::UnknownVertex(vertex))
    }

    fn incident_triangles(&self, vertex: VertexId) -> Result<Vec<TriangleId>> {
        self.incidence
            .get(vertex)
            .cloned()
            .ok_or(TopoError::UnknownVertex(vertex))
    }

    fn entity_sets(&self, dim: GeomDim) -> Vec<EntitySetId> {
        self.sets_by_id(dim, &[])
    }

    fn geom_dim(&self, set: EntitySetId) -> Result<GeomDim> {
        Ok(self.set(set)?.dim)
    }

    fn global_id(&self, set: EntitySetId) -> Result<i32> {
        Ok(self.set(set)?.global_id)
    }

    fn children(&self, set: EntitySetId) -> Result<Vec<EntitySetId>> {
        Ok(self.set(set)?.children.clone())
    }

    fn set_triangles(&self, set: EntitySetId) -> Result<Vec<TriangleId>> {
        Ok(self.set(set)?.triangles.clone())
    }
}
