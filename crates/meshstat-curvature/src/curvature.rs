//! Discrete Gaussian curvature by angle deficit.

use std::f64::consts::TAU;

use meshstat_topo::VertexId;
use tracing::debug;

use crate::{AngleTable, CurvatureError, Result, VertexField};

/// Angle deficit `|2π − Σθ|` at `vertex`, summed over its rows in `table`.
///
/// Flat interior vertices give 0. A vertex with no row in the table is
/// not part of the scope and yields [`CurvatureError::IsolatedVertex`].
pub fn gaussian_curvature(table: &AngleTable, vertex: VertexId) -> Result<f64> {
    if table.valence(vertex) == 0 {
        return Err(CurvatureError::IsolatedVertex(vertex));
    }
    let sum: f64 = table.rows_at(vertex).map(|e| e.angle).sum();
    Ok((TAU - sum).abs())
}

/// Curvature of every vertex in an angle table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurvatureMap {
    field: VertexField,
}

impl CurvatureMap {
    /// Evaluate [`gaussian_curvature`] at every vertex of `table`, in the
    /// table's vertex order.
    pub fn build(table: &AngleTable) -> Result<Self> {
        let mut field = VertexField::with_capacity(table.vertices().len());
        for &v in table.vertices() {
            field.insert(v, gaussian_curvature(table, v)?);
        }
        debug!(vertices = field.len(), "built curvature map");
        Ok(Self { field })
    }

    /// Curvature at `vertex`.
    pub fn get(&self, vertex: VertexId) -> Result<f64> {
        self.field
            .get(vertex)
            .ok_or(CurvatureError::IsolatedVertex(vertex))
    }

    /// Underlying per-vertex values.
    pub fn field(&self) -> &VertexField {
        &self.field
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.field.len()
    }

    /// True when the map is empty.
    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use meshstat_math::Tolerance;
    use meshstat_topo::{primitives, MeshKernel, Scope};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn table_for<K: MeshKernel>(kernel: &K, scope: Scope) -> AngleTable {
        let tris = kernel.triangles_in(&scope).unwrap();
        AngleTable::build(kernel, &tris, &Tolerance::DEFAULT).unwrap()
    }

    #[test]
    fn test_cube_corners() {
        let cube = primitives::unit_cube(10.0);
        let table = table_for(&cube.model, Scope::Model);
        let map = CurvatureMap::build(&table).unwrap();
        assert_eq!(map.len(), 8);
        for (_, k) in map.field().iter() {
            assert_relative_eq!(k, FRAC_PI_2, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_pyramid_apex_and_base() {
        let pyr = primitives::square_pyramid(10.0);
        let table = table_for(&pyr.model, Scope::Set(pyr.volume));
        let map = CurvatureMap::build(&table).unwrap();
        assert_relative_eq!(map.get(pyr.apex).unwrap(), 2.0 * PI / 3.0, epsilon = 1e-9);
        for v in pyr.base {
            assert_relative_eq!(map.get(v).unwrap(), 5.0 * PI / 6.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_flat_interior_is_zero() {
        let grid = primitives::flat_grid(3, 1.0);
        let table = table_for(&grid.model, Scope::Set(grid.surface));
        for (i, j) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
            let k = gaussian_curvature(&table, grid.at(i, j)).unwrap();
            assert!(k.abs() < 1e-9, "interior curvature {k}");
        }
        // a boundary corner keeps a large deficit
        let corner = gaussian_curvature(&table, grid.at(0, 0)).unwrap();
        assert_relative_eq!(corner, 1.5 * PI, epsilon = 1e-9);
    }

    #[test]
    fn test_vertex_outside_scope() {
        let cube = primitives::unit_cube(10.0);
        let table = table_for(&cube.model, Scope::Set(cube.surfaces[0]));
        // corner 1 (x=1, y=0, z=0) is not on the x=0 face
        let outside = cube.vertices[1];
        assert!(matches!(
            gaussian_curvature(&table, outside),
            Err(CurvatureError::IsolatedVertex(v)) if v == outside
        ));
        let map = CurvatureMap::build(&table).unwrap();
        assert_eq!(map.len(), 4);
        assert!(map.get(outside).is_err());
    }

    #[test]
    fn test_curvature_non_negative() {
        let pyr = primitives::square_pyramid(3.0);
        let table = table_for(&pyr.model, Scope::Set(pyr.surfaces[1]));
        let map = CurvatureMap::build(&table).unwrap();
        assert!(map.field().values().all(|k| k >= 0.0));
    }
}
