//! Entity counts and adjacency tallies.
//!
//! These need connectivity only, never coordinates, so they work on
//! models whose geometry would fail the angle table.

use std::collections::HashMap;

use meshstat_stats::FrequencyTable;
use meshstat_topo::{EntitySetId, GeomDim, MeshKernel, Scope, TopoError, VertexId};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Number of entity sets of each dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityRanges {
    /// Dimension 0 sets.
    pub nodes: usize,
    /// Dimension 1 sets.
    pub curves: usize,
    /// Dimension 2 sets.
    pub surfaces: usize,
    /// Dimension 3 sets.
    pub volumes: usize,
}

impl EntityRanges {
    /// Count for one dimension.
    pub fn get(&self, dim: GeomDim) -> usize {
        match dim {
            GeomDim::Node => self.nodes,
            GeomDim::Curve => self.curves,
            GeomDim::Surface => self.surfaces,
            GeomDim::Volume => self.volumes,
        }
    }
}

/// Number of raw mesh entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NativeRanges {
    /// Vertices.
    pub vertices: usize,
    /// Triangles.
    pub triangles: usize,
    /// Entity sets of any dimension.
    pub entity_sets: usize,
}

/// One row of a per-entity listing: a set's global id and how many
/// children (surfaces or triangles) it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityListing {
    /// Global id of the set.
    pub global_id: i32,
    /// Child count.
    pub count: usize,
}

/// Count entity sets by dimension.
pub fn entity_ranges<K: MeshKernel + ?Sized>(kernel: &K) -> EntityRanges {
    let n = |dim| kernel.entity_sets(dim).len();
    EntityRanges {
        nodes: n(GeomDim::Node),
        curves: n(GeomDim::Curve),
        surfaces: n(GeomDim::Surface),
        volumes: n(GeomDim::Volume),
    }
}

/// Count vertices, triangles and entity sets.
pub fn native_ranges<K: MeshKernel + ?Sized>(kernel: &K) -> NativeRanges {
    NativeRanges {
        vertices: kernel.vertices().len(),
        triangles: kernel.triangles().len(),
        entity_sets: GeomDim::ALL
            .iter()
            .map(|&dim| kernel.entity_sets(dim).len())
            .sum(),
    }
}

/// Surfaces that make up a scope: every surface of the model, the
/// surface itself, or a volume's children.
pub fn surfaces_in<K: MeshKernel + ?Sized>(kernel: &K, scope: Scope) -> Result<Vec<EntitySetId>> {
    let set = match scope {
        Scope::Model => return Ok(kernel.entity_sets(GeomDim::Surface)),
        Scope::Set(set) => set,
    };
    match kernel.geom_dim(set)? {
        GeomDim::Surface => Ok(vec![set]),
        GeomDim::Volume => Ok(kernel.children(set)?),
        dim => Err(TopoError::InvalidScope { set, dim }.into()),
    }
}

/// Volumes that touch a scope: every volume of the model, the volume
/// itself, or the volumes a surface bounds.
pub fn volumes_in<K: MeshKernel + ?Sized>(kernel: &K, scope: Scope) -> Result<Vec<EntitySetId>> {
    let set = match scope {
        Scope::Model => return Ok(kernel.entity_sets(GeomDim::Volume)),
        Scope::Set(set) => set,
    };
    match kernel.geom_dim(set)? {
        GeomDim::Volume => Ok(vec![set]),
        GeomDim::Surface => {
            let mut parents = Vec::new();
            for vol in kernel.entity_sets(GeomDim::Volume) {
                if kernel.children(vol)?.contains(&set) {
                    parents.push(vol);
                }
            }
            Ok(parents)
        }
        dim => Err(TopoError::InvalidScope { set, dim }.into()),
    }
}

/// Child surface count of every volume in scope.
pub fn surfaces_per_volume<K: MeshKernel + ?Sized>(
    kernel: &K,
    scope: Scope,
) -> Result<Vec<EntityListing>> {
    volumes_in(kernel, scope)?
        .into_iter()
        .map(|vol| -> Result<EntityListing> {
            Ok(EntityListing {
                global_id: kernel.global_id(vol)?,
                count: kernel.children(vol)?.len(),
            })
        })
        .collect()
}

/// Triangle count of every surface in scope.
pub fn triangles_per_surface<K: MeshKernel + ?Sized>(
    kernel: &K,
    scope: Scope,
) -> Result<Vec<EntityListing>> {
    surfaces_in(kernel, scope)?
        .into_iter()
        .map(|surf| -> Result<EntityListing> {
            Ok(EntityListing {
                global_id: kernel.global_id(surf)?,
                count: kernel.set_triangles(surf)?.len(),
            })
        })
        .collect()
}

/// Frequency of in-scope incident triangle counts over the vertices in
/// scope.
pub fn triangles_per_vertex<K: MeshKernel + ?Sized>(
    kernel: &K,
    scope: Scope,
) -> Result<FrequencyTable> {
    let mut valence: HashMap<VertexId, u64> = HashMap::new();
    for tri in kernel.triangles_in(&scope)? {
        for v in kernel.vertices_of(tri)? {
            *valence.entry(v).or_insert(0) += 1;
        }
    }
    let mut table = FrequencyTable::new();
    table.extend(valence.into_values());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MetricsError;
    use meshstat_topo::{primitives, MeshModel};

    #[test]
    fn test_cube_ranges() {
        let cube = primitives::unit_cube(10.0);
        let er = entity_ranges(&cube.model);
        assert_eq!(er, EntityRanges { nodes: 0, curves: 0, surfaces: 6, volumes: 1 });
        assert_eq!(er.get(GeomDim::Surface), 6);
        let nr = native_ranges(&cube.model);
        assert_eq!(nr, NativeRanges { vertices: 8, triangles: 12, entity_sets: 7 });
    }

    #[test]
    fn test_cube_listings() {
        let cube = primitives::unit_cube(10.0);
        let spv = surfaces_per_volume(&cube.model, Scope::Model).unwrap();
        assert_eq!(spv, vec![EntityListing { global_id: 1, count: 6 }]);
        let tps = triangles_per_surface(&cube.model, Scope::Model).unwrap();
        assert_eq!(tps.len(), 6);
        assert!(tps.iter().all(|row| row.count == 2));
        let ids: Vec<_> = tps.iter().map(|row| row.global_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_cube_triangles_per_vertex() {
        let cube = primitives::unit_cube(10.0);
        let tpv = triangles_per_vertex(&cube.model, Scope::Model).unwrap();
        assert_eq!(tpv.iter().collect::<Vec<_>>(), vec![(4, 4), (5, 4)]);
        assert_eq!(tpv.len(), 8);
        let s = tpv.summary().unwrap();
        assert_eq!((s.minimum, s.maximum, s.mean), (4.0, 5.0, 4.5));
    }

    #[test]
    fn test_scope_selection() {
        let pyr = primitives::square_pyramid(10.0);
        let base = pyr.surfaces[0];
        assert_eq!(surfaces_in(&pyr.model, Scope::Set(base)).unwrap(), vec![base]);
        assert_eq!(surfaces_in(&pyr.model, Scope::Set(pyr.volume)).unwrap().len(), 5);
        assert_eq!(volumes_in(&pyr.model, Scope::Set(base)).unwrap(), vec![pyr.volume]);
        // two base triangles: the diagonal's ends see both
        let tpv = triangles_per_vertex(&pyr.model, Scope::Set(base)).unwrap();
        assert_eq!(tpv.len(), 4);
        assert_eq!(tpv.iter().collect::<Vec<_>>(), vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn test_curve_scope_rejected() {
        let mut model = MeshModel::new();
        let curve = model.add_set(GeomDim::Curve, 3);
        let err = surfaces_in(&model, Scope::Set(curve)).unwrap_err();
        assert!(matches!(
            err,
            MetricsError::Topo(TopoError::InvalidScope { dim: GeomDim::Curve, .. })
        ));
        assert!(volumes_in(&model, Scope::Set(curve)).is_err());
    }
}
