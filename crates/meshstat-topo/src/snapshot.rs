//! Serializable dump of a [`MeshModel`].
//!
//! Entities are referenced by their index in the document instead of by
//! handle, so a snapshot can be written by any tool.

use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;

use meshstat_math::Point3;

use crate::{GeomDim, MeshModel, Result, TopoError, VertexId};

/// Plain-index form of a mesh model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelSnapshot {
    /// Vertex coordinates.
    pub vertices: Vec<[f64; 3]>,
    /// Triangles as indices into `vertices`.
    pub triangles: Vec<[usize; 3]>,
    /// Entity sets.
    #[serde(default)]
    pub sets: Vec<SetSnapshot>,
}

/// Plain-index form of an entity set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetSnapshot {
    /// Geometric dimension.
    pub dim: GeomDim,
    /// User-facing id.
    pub global_id: i32,
    /// Indices into the snapshot's `triangles`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triangles: Vec<usize>,
    /// Indices into the snapshot's `sets`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<usize>,
}

impl MeshModel {
    /// Build a model from a snapshot, validating every index.
    pub fn from_snapshot(snapshot: &ModelSnapshot) -> Result<Self> {
        let mut model = MeshModel::new();
        let verts: Vec<_> = snapshot
            .vertices
            .iter()
            .map(|&[x, y, z]| model.add_vertex(Point3::new(x, y, z)))
            .collect();

        let mut tris = Vec::with_capacity(snapshot.triangles.len());
        for (i, corners) in snapshot.triangles.iter().enumerate() {
            let mut ids = [VertexId::default(); 3];
            for (slot, &idx) in ids.iter_mut().zip(corners) {
                *slot = *verts.get(idx).ok_or_else(|| {
                    TopoError::InvalidSnapshot(format!("triangle {i} references vertex {idx}"))
                })?;
            }
            tris.push(model.add_triangle(ids)?);
        }

        let sets: Vec<_> = snapshot
            .sets
            .iter()
            .map(|s| model.add_set(s.dim, s.global_id))
            .collect();

        for (i, spec) in snapshot.sets.iter().enumerate() {
            for &t in &spec.triangles {
                let tri = *tris.get(t).ok_or_else(|| {
                    TopoError::InvalidSnapshot(format!("set {i} references triangle {t}"))
                })?;
                model.add_to_set(sets[i], tri)?;
            }
            for &c in &spec.children {
                let child = *sets.get(c).ok_or_else(|| {
                    TopoError::InvalidSnapshot(format!("set {i} references set {c}"))
                })?;
                model.add_child(sets[i], child)?;
            }
        }

        Ok(model)
    }

    /// Dump the model to plain-index form.
    pub fn to_snapshot(&self) -> ModelSnapshot {
        let mut vert_index = SecondaryMap::new();
        let vertices = self
            .vertex_entries()
            .enumerate()
            .map(|(i, (id, p))| {
                vert_index.insert(id, i);
                [p.x, p.y, p.z]
            })
            .collect();

        let mut tri_index = SecondaryMap::new();
        let triangles = self
            .triangle_entries()
            .enumerate()
            .map(|(i, (id, corners))| {
                tri_index.insert(id, i);
                corners.map(|v| vert_index[v])
            })
            .collect();

        let mut set_index = SecondaryMap::new();
        for (i, (id, _)) in self.set_entries().enumerate() {
            set_index.insert(id, i);
        }
        let sets = self
            .set_entries()
            .map(|(_, s)| SetSnapshot {
                dim: s.dim,
                global_id: s.global_id,
                triangles: s.triangles.iter().map(|&t| tri_index[t]).collect(),
                children: s.children.iter().map(|&c| set_index[c]).collect(),
            })
            .collect();

        ModelSnapshot {
            vertices,
            triangles,
            sets,
        }
    }

    /// Parse a JSON snapshot document.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: ModelSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(&snapshot)
    }

    /// Serialize to a pretty-printed JSON snapshot document.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_snapshot())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{primitives, MeshKernel, Scope};

    #[test]
    fn test_snapshot_roundtrip_preserves_structure() {
        let cube = primitives::unit_cube(10.0);
        let json = cube.model.to_json().expect("serialize");
        let restored = MeshModel::from_json(&json).expect("deserialize");

        assert_eq!(restored.num_vertices(), 8);
        assert_eq!(restored.num_triangles(), 12);
        assert_eq!(restored.entity_sets(GeomDim::Surface).len(), 6);
        let vol = restored.entity_sets(GeomDim::Volume)[0];
        assert_eq!(restored.triangles_in(&Scope::Set(vol)).unwrap().len(), 12);
        assert_eq!(restored.to_snapshot(), cube.model.to_snapshot());
    }

    #[test]
    fn test_snapshot_bad_index() {
        let json = r#"{ "vertices": [[0,0,0],[1,0,0],[0,1,0]], "triangles": [[0,1,5]] }"#;
        let err = MeshModel::from_json(json).unwrap_err();
        assert!(matches!(err, TopoError::InvalidSnapshot(_)));
    }

    #[test]
    fn test_snapshot_sets_parse() {
        let json = r#"{
            "vertices": [[0,0,0],[1,0,0],[0,1,0]],
            "triangles": [[0,1,2]],
            "sets": [
                { "dim": "surface", "global_id": 4, "triangles": [0] },
                { "dim": "volume", "global_id": 1, "children": [0] },
                { "dim": "curve", "global_id": 2 }
            ]
        }"#;
        let model = MeshModel::from_json(json).unwrap();
        let vol = model.sets_by_id(GeomDim::Volume, &[1])[0];
        assert_eq!(model.triangles_in(&Scope::Set(vol)).unwrap().len(), 1);
        assert_eq!(model.entity_sets(GeomDim::Curve).len(), 1);
    }

    #[test]
    fn test_snapshot_malformed_json() {
        let err = MeshModel::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TopoError::Json(_)));
    }
}
