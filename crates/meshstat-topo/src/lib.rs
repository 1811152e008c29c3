#![warn(missing_docs)]

//! Mesh entity store and kernel adapter for meshstat.
//!
//! Analysis never talks to a mesh database directly. It goes through the
//! [`MeshKernel`] trait, which exposes exactly the primitives the metrics
//! need: triangle connectivity, coordinates, vertex incidence, and the
//! entity-set hierarchy (volumes own surfaces, surfaces own triangles).
//!
//! [`MeshModel`] is the in-memory implementation. It can be built
//! programmatically, from the fixtures in [`primitives`], or from a JSON
//! [`ModelSnapshot`].
//!
//! # Example
//!
//! ```
//! use meshstat_topo::{primitives, MeshKernel, Scope};
//!
//! let cube = primitives::unit_cube(10.0);
//! let tris = cube.model.triangles_in(&Scope::Model).unwrap();
//! assert_eq!(tris.len(), 12);
//! ```

mod error;
mod model;
pub mod primitives;
mod snapshot;

pub use error::{Result, TopoError};
pub use model::{EntitySet, MeshModel};
pub use snapshot::{ModelSnapshot, SetSnapshot};

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use meshstat_math::Point3;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use tracing::warn;

new_key_type! {
    /// Handle to a mesh vertex.
    pub struct VertexId;
    /// Handle to a mesh triangle.
    pub struct TriangleId;
    /// Handle to an entity set (node, curve, surface, or volume).
    pub struct EntitySetId;
}

/// Geometric dimension carried by an entity set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeomDim {
    /// Dimension 0.
    Node,
    /// Dimension 1.
    Curve,
    /// Dimension 2, owns triangles.
    Surface,
    /// Dimension 3, owns child surfaces.
    Volume,
}

impl GeomDim {
    /// All dimensions in ascending order.
    pub const ALL: [GeomDim; 4] = [
        GeomDim::Node,
        GeomDim::Curve,
        GeomDim::Surface,
        GeomDim::Volume,
    ];

    /// Numeric dimension (0 to 3).
    pub fn index(self) -> u8 {
        match self {
            GeomDim::Node => 0,
            GeomDim::Curve => 1,
            GeomDim::Surface => 2,
            GeomDim::Volume => 3,
        }
    }

    /// Dimension from its numeric value.
    pub fn from_index(dim: u8) -> Option<Self> {
        Self::ALL.get(dim as usize).copied()
    }

    /// Plural name used in reports.
    pub fn plural(self) -> &'static str {
        match self {
            GeomDim::Node => "nodes",
            GeomDim::Curve => "curves",
            GeomDim::Surface => "surfaces",
            GeomDim::Volume => "volumes",
        }
    }
}

impl fmt::Display for GeomDim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.index(), self.plural())
    }
}

impl FromStr for GeomDim {
    type Err = TopoError;

    /// Accepts `0`..`3` or a singular/plural name in any case.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        if let Ok(n) = lower.parse::<u8>() {
            return Self::from_index(n).ok_or_else(|| TopoError::UnknownDimension(s.into()));
        }
        let singular = lower.strip_suffix('s').unwrap_or(&lower);
        match singular {
            "node" => Ok(GeomDim::Node),
            "curve" => Ok(GeomDim::Curve),
            "surface" => Ok(GeomDim::Surface),
            "volume" => Ok(GeomDim::Volume),
            _ => Err(TopoError::UnknownDimension(s.into())),
        }
    }
}

/// Region of the model a computation runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// Every triangle in the model.
    #[default]
    Model,
    /// A surface or volume entity set.
    Set(EntitySetId),
}

/// What to do when a scope names a set that is neither a surface nor a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopePolicy {
    /// Fail with [`TopoError::InvalidScope`].
    #[default]
    Strict,
    /// Log a warning and analyse the whole model instead.
    FallbackToModel,
}

/// Read access to an externally owned mesh database.
///
/// Entity order returned by the listing methods must be stable across
/// calls; metric results are only bit-reproducible if it is.
pub trait MeshKernel {
    /// All vertices in the model.
    fn vertices(&self) -> Vec<VertexId>;

    /// All triangles in the model.
    fn triangles(&self) -> Vec<TriangleId>;

    /// The three corners of a triangle, in kernel rotation order.
    fn vertices_of(&self, tri: TriangleId) -> Result<[VertexId; 3]>;

    /// Position of a vertex.
    fn coordinates(&self, vertex: VertexId) -> Result<Point3>;

    /// Triangles that use `vertex` as a corner.
    fn incident_triangles(&self, vertex: VertexId) -> Result<Vec<TriangleId>>;

    /// Entity sets of the given dimension.
    fn entity_sets(&self, dim: GeomDim) -> Vec<EntitySetId>;

    /// Dimension of an entity set.
    fn geom_dim(&self, set: EntitySetId) -> Result<GeomDim>;

    /// User-facing global id of an entity set.
    fn global_id(&self, set: EntitySetId) -> Result<i32>;

    /// Child sets (the surfaces of a volume).
    fn children(&self, set: EntitySetId) -> Result<Vec<EntitySetId>>;

    /// Triangles owned directly by a set.
    fn set_triangles(&self, set: EntitySetId) -> Result<Vec<TriangleId>>;

    /// Triangles that contain both `a` and `b`.
    fn shared_triangles(&self, a: VertexId, b: VertexId) -> Result<Vec<TriangleId>> {
        let with_b: HashSet<TriangleId> = self.incident_triangles(b)?.into_iter().collect();
        Ok(self
            .incident_triangles(a)?
            .into_iter()
            .filter(|t| with_b.contains(t))
            .collect())
    }

    /// Triangles in a scope. A volume expands to the union of its
    /// surfaces' triangles, first occurrence kept.
    fn triangles_in(&self, scope: &Scope) -> Result<Vec<TriangleId>> {
        let set = match *scope {
            Scope::Model => return Ok(self.triangles()),
            Scope::Set(set) => set,
        };
        match self.geom_dim(set)? {
            GeomDim::Surface => self.set_triangles(set),
            GeomDim::Volume => {
                let mut seen = HashSet::new();
                let mut tris = Vec::new();
                for child in self.children(set)? {
                    if self.geom_dim(child)? != GeomDim::Surface {
                        return Err(TopoError::InvalidMembership(format!(
                            "volume {set:?} has non-surface child {child:?}"
                        )));
                    }
                    for tri in self.set_triangles(child)? {
                        if seen.insert(tri) {
                            tris.push(tri);
                        }
                    }
                }
                Ok(tris)
            }
            dim => Err(TopoError::InvalidScope { set, dim }),
        }
    }
}

/// Check a scope against the kernel, applying `policy` to sets that are
/// neither surfaces nor volumes.
pub fn resolve_scope<K: MeshKernel + ?Sized>(
    kernel: &K,
    scope: Scope,
    policy: ScopePolicy,
) -> Result<Scope> {
    let Scope::Set(set) = scope else {
        return Ok(scope);
    };
    match kernel.geom_dim(set)? {
        GeomDim::Surface | GeomDim::Volume => Ok(scope),
        dim => match policy {
            ScopePolicy::Strict => Err(TopoError::InvalidScope { set, dim }),
            ScopePolicy::FallbackToModel => {
                warn!(?set, %dim, "set is neither a surface nor a volume, using whole model");
                Ok(Scope::Model)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geom_dim_parse() {
        assert_eq!("2".parse::<GeomDim>().unwrap(), GeomDim::Surface);
        assert_eq!("Volumes".parse::<GeomDim>().unwrap(), GeomDim::Volume);
        assert_eq!("curve".parse::<GeomDim>().unwrap(), GeomDim::Curve);
        assert_eq!("NODE".parse::<GeomDim>().unwrap(), GeomDim::Node);
        assert!("4".parse::<GeomDim>().is_err());
        assert!("edge".parse::<GeomDim>().is_err());
    }

    #[test]
    fn test_geom_dim_index_roundtrip() {
        for dim in GeomDim::ALL {
            assert_eq!(GeomDim::from_index(dim.index()), Some(dim));
        }
        assert_eq!(GeomDim::from_index(7), None);
    }

    #[test]
    fn test_volume_scope_unions_surfaces() {
        let cube = primitives::unit_cube(10.0);
        let vol = cube.volume;
        let tris = cube.model.triangles_in(&Scope::Set(vol)).unwrap();
        assert_eq!(tris.len(), 12);

        let surf = cube.surfaces[0];
        let tris = cube.model.triangles_in(&Scope::Set(surf)).unwrap();
        assert_eq!(tris.len(), 2);
    }

    #[test]
    fn test_invalid_scope_strict() {
        let mut cube = primitives::unit_cube(10.0);
        let curve = cube.model.add_set(GeomDim::Curve, 1);
        let err = resolve_scope(&cube.model, Scope::Set(curve), ScopePolicy::Strict).unwrap_err();
        assert!(matches!(err, TopoError::InvalidScope { dim: GeomDim::Curve, .. }));
        assert!(cube.model.triangles_in(&Scope::Set(curve)).is_err());
    }

    #[test]
    fn test_invalid_scope_fallback() {
        let mut cube = primitives::unit_cube(10.0);
        let node = cube.model.add_set(GeomDim::Node, 1);
        let scope = resolve_scope(&cube.model, Scope::Set(node), ScopePolicy::FallbackToModel)
            .unwrap();
        assert_eq!(scope, Scope::Model);

        let surf = Scope::Set(cube.surfaces[2]);
        let scope = resolve_scope(&cube.model, surf, ScopePolicy::FallbackToModel).unwrap();
        assert_eq!(scope, surf);
    }

    #[test]
    fn test_shared_triangles_default() {
        let cube = primitives::unit_cube(10.0);
        let tris = cube.model.triangles();
        let [a, b, _] = cube.model.vertices_of(tris[0]).unwrap();
        let shared = cube.model.shared_triangles(a, b).unwrap();
        assert_eq!(shared.len(), 2);
        assert!(shared.contains(&tris[0]));
    }
}
