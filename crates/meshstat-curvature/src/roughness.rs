//! Local roughness from cotangent-weighted curvature differences.

use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use meshstat_math::Tolerance;
use meshstat_topo::{MeshKernel, TriangleId, VertexId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{AngleTable, CurvatureError, CurvatureMap, Result, VertexField};

/// How an edge with a single in-scope triangle is weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Use half the cotangent of the one opposite angle.
    #[default]
    HalfWeight,
    /// Leave the neighbor out of the weighted average.
    Skip,
    /// Fail with [`CurvatureError::BoundaryEdge`].
    Reject,
}

/// One-ring neighbors of `vertex` through the triangles of `table`, in
/// sorted order.
pub fn neighbors(table: &AngleTable, vertex: VertexId) -> BTreeSet<VertexId> {
    table
        .rows_at(vertex)
        .filter_map(|e| table.corners(e.triangle))
        .flatten()
        .map(|e| e.vertex)
        .filter(|&v| v != vertex)
        .collect()
}

/// Discrete Laplace weight `D(a, b) = ½ Σ cot β` of edge `a`–`b`, β the
/// angle opposite the edge in each in-scope triangle sharing it.
///
/// Returns `None` when the edge is on the boundary and `policy` is
/// [`BoundaryPolicy::Skip`].
pub fn laplace_weight<K: MeshKernel + ?Sized>(
    kernel: &K,
    table: &AngleTable,
    a: VertexId,
    b: VertexId,
    policy: BoundaryPolicy,
) -> Result<Option<f64>> {
    let shared: Vec<TriangleId> = kernel
        .shared_triangles(a, b)?
        .into_iter()
        .filter(|&t| table.contains(t))
        .collect();

    match shared.len() {
        1 => match policy {
            BoundaryPolicy::HalfWeight => {}
            BoundaryPolicy::Skip => {
                warn!(?a, ?b, "boundary edge left out of roughness average");
                return Ok(None);
            }
            BoundaryPolicy::Reject => return Err(CurvatureError::BoundaryEdge { a, b }),
        },
        2 => {}
        n => return Err(CurvatureError::NonManifoldEdge { a, b, triangles: n }),
    }

    let mut cot_sum = 0.0;
    for &triangle in &shared {
        let opposite = table
            .third_corner(triangle, a, b)
            .ok_or(CurvatureError::MissingCorner { triangle, a, b })?;
        cot_sum += opposite.angle.tan().recip();
    }
    Ok(Some(0.5 * cot_sum))
}

/// Roughness at one vertex: `|K(v) − Σ D(v,j) K(j) / Σ D(v,j)|` over the
/// one-ring neighbors `j`.
pub fn local_roughness<K: MeshKernel + ?Sized>(
    kernel: &K,
    table: &AngleTable,
    curvature: &CurvatureMap,
    vertex: VertexId,
    policy: BoundaryPolicy,
    tol: &Tolerance,
) -> Result<f64> {
    let k_v = curvature.get(vertex)?;
    let mut weight_sum = 0.0;
    let mut weighted = 0.0;
    for j in neighbors(table, vertex) {
        if let Some(w) = laplace_weight(kernel, table, vertex, j, policy)? {
            weight_sum += w;
            weighted += w * curvature.get(j)?;
        }
    }
    if tol.is_zero_weight(weight_sum) {
        return Err(CurvatureError::UndefinedRoughness { vertex, weight_sum });
    }
    Ok((k_v - weighted / weight_sum).abs())
}

/// Local roughness of every vertex in a table, with per-triangle means.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoughnessMap {
    local: VertexField,
    triangles: Vec<(TriangleId, f64)>,
    by_triangle: HashMap<TriangleId, usize>,
}

impl RoughnessMap {
    /// Evaluate [`local_roughness`] at every vertex of `table`, then
    /// average each triangle's three corners.
    pub fn build<K: MeshKernel + ?Sized>(
        kernel: &K,
        table: &AngleTable,
        curvature: &CurvatureMap,
        policy: BoundaryPolicy,
        tol: &Tolerance,
    ) -> Result<Self> {
        let mut local = VertexField::with_capacity(table.vertices().len());
        for &v in table.vertices() {
            local.insert(v, local_roughness(kernel, table, curvature, v, policy, tol)?);
        }

        let mut triangles = Vec::with_capacity(table.triangle_count());
        let mut by_triangle = HashMap::with_capacity(table.triangle_count());
        for &tri in table.triangles() {
            let Some(corners) = table.corners(tri) else {
                continue;
            };
            let mut sum = 0.0;
            for e in corners {
                sum += local
                    .get(e.vertex)
                    .ok_or(CurvatureError::IsolatedVertex(e.vertex))?;
            }
            by_triangle.insert(tri, triangles.len());
            triangles.push((tri, sum / 3.0));
        }

        debug!(
            vertices = local.len(),
            triangles = triangles.len(),
            ?policy,
            "built roughness map"
        );
        Ok(Self {
            local,
            triangles,
            by_triangle,
        })
    }

    /// Local roughness at `vertex`.
    pub fn local(&self, vertex: VertexId) -> Result<f64> {
        self.local
            .get(vertex)
            .ok_or(CurvatureError::IsolatedVertex(vertex))
    }

    /// Per-vertex values.
    pub fn field(&self) -> &VertexField {
        &self.local
    }

    /// Mean roughness of a triangle's corners.
    pub fn triangle_average(&self, tri: TriangleId) -> Option<f64> {
        self.by_triangle.get(&tri).map(|&i| self.triangles[i].1)
    }

    /// `(triangle, mean roughness)` pairs in table order.
    pub fn triangle_averages(&self) -> &[(TriangleId, f64)] {
        &self.triangles
    }

    /// Area-weighted mean `Σ R(v)·A(v)/3 / Σ A(v)/3`, where `A(v)` is the
    /// area of the in-scope triangles around `v`.
    pub fn area_weighted_average(&self, table: &AngleTable) -> Result<f64> {
        if table.is_empty() {
            return Err(CurvatureError::EmptyScope);
        }
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for &v in table.vertices() {
            let weight = table.incident_area(v) / 3.0;
            numerator += self.local(v)? * weight;
            denominator += weight;
        }
        Ok(numerator / denominator)
    }
}

/// Angle table, curvature and roughness for one list of triangles.
#[derive(Debug, Clone)]
pub struct RoughnessAnalysis {
    /// Angle table of the triangles, shared with whoever built it.
    pub table: Rc<AngleTable>,
    /// Curvature at each vertex.
    pub curvature: CurvatureMap,
    /// Roughness at each vertex and triangle.
    pub roughness: RoughnessMap,
}

impl RoughnessAnalysis {
    /// Run the whole pipeline over `triangles`.
    pub fn run<K: MeshKernel + ?Sized>(
        kernel: &K,
        triangles: &[TriangleId],
        policy: BoundaryPolicy,
        tol: &Tolerance,
    ) -> Result<Self> {
        if triangles.is_empty() {
            return Err(CurvatureError::EmptyScope);
        }
        let table = AngleTable::build(kernel, triangles, tol)?;
        Self::from_table(kernel, Rc::new(table), policy, tol)
    }

    /// Run curvature and roughness over an already built table.
    pub fn from_table<K: MeshKernel + ?Sized>(
        kernel: &K,
        table: Rc<AngleTable>,
        policy: BoundaryPolicy,
        tol: &Tolerance,
    ) -> Result<Self> {
        if table.is_empty() {
            return Err(CurvatureError::EmptyScope);
        }
        let curvature = CurvatureMap::build(&table)?;
        let roughness = RoughnessMap::build(kernel, &table, &curvature, policy, tol)?;
        Ok(Self {
            table,
            curvature,
            roughness,
        })
    }

    /// Area-weighted roughness of the whole triangle list.
    pub fn weighted_average(&self) -> Result<f64> {
        self.roughness.area_weighted_average(&self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use meshstat_math::Point3;
    use meshstat_topo::{primitives, MeshModel, Scope};
    use std::f64::consts::PI;

    const TOL: Tolerance = Tolerance::DEFAULT;

    fn analyse<K: MeshKernel>(
        kernel: &K,
        scope: Scope,
        policy: BoundaryPolicy,
    ) -> Result<RoughnessAnalysis> {
        let tris = kernel.triangles_in(&scope)?;
        RoughnessAnalysis::run(kernel, &tris, policy, &TOL)
    }

    fn pyramid_average() -> f64 {
        let s3 = 3.0f64.sqrt();
        let base = PI / (6.0 * (2.0 + s3));
        (PI / 6.0 * 100.0 * s3 + base * (300.0 + 200.0 * s3)) / (300.0 + 300.0 * s3)
    }

    #[test]
    fn test_cube_is_smooth() {
        let cube = primitives::unit_cube(10.0);
        let run = analyse(&cube.model, Scope::Set(cube.volume), BoundaryPolicy::Reject).unwrap();
        for (_, r) in run.roughness.field().iter() {
            assert!(r.abs() < 1e-9, "cube roughness {r}");
        }
        assert!(run.weighted_average().unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_pyramid_weights() {
        let pyr = primitives::square_pyramid(10.0);
        let tris = pyr.model.triangles_in(&Scope::Set(pyr.volume)).unwrap();
        let table = AngleTable::build(&pyr.model, &tris, &TOL).unwrap();
        let [a, b, c, _] = pyr.base;
        let policy = BoundaryPolicy::Reject;
        let s3 = 3.0f64.sqrt();

        let apex_edge = laplace_weight(&pyr.model, &table, pyr.apex, a, policy).unwrap();
        assert_relative_eq!(apex_edge.unwrap(), 1.0 / s3, epsilon = 1e-12);
        let base_edge = laplace_weight(&pyr.model, &table, a, b, policy).unwrap();
        assert_relative_eq!(base_edge.unwrap(), 0.5 * (1.0 + 1.0 / s3), epsilon = 1e-12);
        let diagonal = laplace_weight(&pyr.model, &table, a, c, policy).unwrap();
        assert!(diagonal.unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_pyramid_roughness() {
        let pyr = primitives::square_pyramid(10.0);
        let run = analyse(&pyr.model, Scope::Set(pyr.volume), BoundaryPolicy::Reject).unwrap();
        assert_relative_eq!(run.roughness.local(pyr.apex).unwrap(), PI / 6.0, epsilon = 1e-9);
        let base = PI / (6.0 * (2.0 + 3.0f64.sqrt()));
        for v in pyr.base {
            assert_relative_eq!(run.roughness.local(v).unwrap(), base, epsilon = 1e-9);
        }
        assert_relative_eq!(run.weighted_average().unwrap(), pyramid_average(), epsilon = 1e-9);
    }

    #[test]
    fn test_triangle_average_is_corner_mean() {
        let pyr = primitives::square_pyramid(10.0);
        let run = analyse(&pyr.model, Scope::Set(pyr.volume), BoundaryPolicy::default()).unwrap();
        assert_eq!(run.roughness.triangle_averages().len(), 6);
        for &(tri, avg) in run.roughness.triangle_averages() {
            let corners = pyr.model.vertices_of(tri).unwrap();
            let mean = corners
                .iter()
                .map(|&v| run.roughness.local(v).unwrap())
                .sum::<f64>()
                / 3.0;
            assert_relative_eq!(avg, mean, epsilon = 1e-15);
            assert_eq!(run.roughness.triangle_average(tri), Some(avg));
        }
    }

    #[test]
    fn test_neighbors_sorted_and_scoped() {
        let pyr = primitives::square_pyramid(10.0);
        let [a, b, c, d] = pyr.base;
        let lateral = pyr.model.triangles_in(&Scope::Set(pyr.surfaces[1])).unwrap();
        let table = AngleTable::build(&pyr.model, &lateral, &TOL).unwrap();
        let ring: Vec<_> = neighbors(&table, a).into_iter().collect();
        let mut expected = vec![b, pyr.apex];
        expected.sort();
        assert_eq!(ring, expected);
        assert!(!ring.contains(&c) && !ring.contains(&d));
    }

    #[test]
    fn test_flat_interior_is_smooth() {
        let grid = primitives::flat_grid(4, 0.5);
        let run = analyse(&grid.model, Scope::Model, BoundaryPolicy::HalfWeight).unwrap();
        for (i, j) in [(1, 1), (2, 2), (2, 1)] {
            let v = grid.at(i, j);
            assert!(run.curvature.get(v).unwrap() < 1e-9);
        }
        // (2, 2) has only interior neighbors
        assert!(run.roughness.local(grid.at(2, 2)).unwrap() < 1e-9);
    }

    #[test]
    fn test_boundary_half_weight() {
        let grid = primitives::flat_grid(2, 1.0);
        let run = analyse(&grid.model, Scope::Model, BoundaryPolicy::HalfWeight).unwrap();
        let edge_mid = run.roughness.local(grid.at(1, 0)).unwrap();
        assert_relative_eq!(edge_mid, PI / 4.0, epsilon = 1e-9);
        // flat center, but every weighted neighbor sits on the rim with K = π
        assert_relative_eq!(run.roughness.local(grid.at(1, 1)).unwrap(), PI, epsilon = 1e-9);
    }

    #[test]
    fn test_boundary_skip() {
        let grid = primitives::flat_grid(2, 1.0);
        let tris = grid.model.triangles();
        let table = AngleTable::build(&grid.model, &tris, &TOL).unwrap();
        let curvature = CurvatureMap::build(&table).unwrap();
        let policy = BoundaryPolicy::Skip;

        let at = |v| local_roughness(&grid.model, &table, &curvature, v, policy, &TOL);
        assert_relative_eq!(at(grid.at(1, 0)).unwrap(), PI, epsilon = 1e-9);

        // the corner's only interior edge is the cell diagonal, whose
        // opposite angles are both right angles
        let corner = at(grid.at(0, 0));
        assert!(matches!(corner, Err(CurvatureError::UndefinedRoughness { .. })));
    }

    #[test]
    fn test_boundary_reject() {
        let grid = primitives::flat_grid(2, 1.0);
        let err = analyse(&grid.model, Scope::Model, BoundaryPolicy::Reject).unwrap_err();
        assert!(matches!(err, CurvatureError::BoundaryEdge { .. }));

        let tris = grid.model.triangles();
        let table = AngleTable::build(&grid.model, &tris, &TOL).unwrap();
        let curvature = CurvatureMap::build(&table).unwrap();
        let center = local_roughness(
            &grid.model,
            &table,
            &curvature,
            grid.at(1, 1),
            BoundaryPolicy::Reject,
            &TOL,
        );
        assert_relative_eq!(center.unwrap(), PI, epsilon = 1e-9);
    }

    #[test]
    fn test_non_manifold_edge() {
        let mut model = MeshModel::new();
        let a = model.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = model.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let fins = [
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
            Point3::new(0.5, 0.0, 1.0),
        ];
        for p in fins {
            let c = model.add_vertex(p);
            model.add_triangle([a, b, c]).unwrap();
        }
        let err = analyse(&model, Scope::Model, BoundaryPolicy::HalfWeight).unwrap_err();
        assert!(matches!(err, CurvatureError::NonManifoldEdge { triangles: 3, .. }));
    }

    #[test]
    fn test_edge_missing_from_table_triangle() {
        // Two models with the same insertion order share keys, so the
        // second model's triangle ids point at the first model's rows.
        let build = |second: [usize; 3]| {
            let mut model = MeshModel::new();
            let v: Vec<_> = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
                .into_iter()
                .map(|(x, y)| model.add_vertex(Point3::new(x, y, 0.0)))
                .collect();
            model.add_triangle([v[0], v[1], v[2]]).unwrap();
            model.add_triangle(second.map(|i| v[i])).unwrap();
            (model, v)
        };
        let (tabled, v) = build([0, 2, 3]);
        let (other, _) = build([1, 3, 2]);
        let table = AngleTable::build(&tabled, &tabled.triangles(), &TOL).unwrap();

        // `other` puts edge v1-v3 on a triangle the table knows as v0-v2-v3
        let err = laplace_weight(&other, &table, v[1], v[3], BoundaryPolicy::HalfWeight);
        assert!(matches!(
            err,
            Err(CurvatureError::MissingCorner { a, b, .. }) if a == v[1] && b == v[3]
        ));

        // an edge both models agree on still weighs normally
        let ok = laplace_weight(&other, &table, v[0], v[1], BoundaryPolicy::HalfWeight);
        assert!(ok.unwrap().is_some());
    }

    #[test]
    fn test_analysis_keeps_given_table() {
        let cube = primitives::unit_cube(10.0);
        let tris = cube.model.triangles();
        let table = Rc::new(AngleTable::build(&cube.model, &tris, &TOL).unwrap());
        let run = RoughnessAnalysis::from_table(
            &cube.model,
            Rc::clone(&table),
            BoundaryPolicy::Reject,
            &TOL,
        )
        .unwrap();
        assert!(Rc::ptr_eq(&run.table, &table));
        assert_eq!(Rc::strong_count(&table), 2);
    }

    #[test]
    fn test_empty_scope() {
        let model = MeshModel::new();
        let err =
            RoughnessAnalysis::run(&model, &[], BoundaryPolicy::default(), &TOL).unwrap_err();
        assert!(matches!(err, CurvatureError::EmptyScope));
        let empty = RoughnessMap::default();
        assert!(matches!(
            empty.area_weighted_average(&AngleTable::default()),
            Err(CurvatureError::EmptyScope)
        ));
    }

    #[test]
    fn test_recompute_is_bit_identical() {
        let pyr = primitives::square_pyramid(7.5);
        let first = analyse(&pyr.model, Scope::Model, BoundaryPolicy::default()).unwrap();
        let second = analyse(&pyr.model, Scope::Model, BoundaryPolicy::default()).unwrap();
        assert_eq!(first.roughness, second.roughness);
        assert_eq!(
            first.weighted_average().unwrap().to_bits(),
            second.weighted_average().unwrap().to_bits()
        );
    }
}
