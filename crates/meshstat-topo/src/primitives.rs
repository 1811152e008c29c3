//! Small reference models with known metric values.
//!
//! Each builder returns the model together with the handles a caller
//! needs to address its parts.

use meshstat_math::Point3;

use crate::{EntitySetId, GeomDim, MeshModel, VertexId};

/// Axis-aligned cube split into 12 right triangles.
#[derive(Debug, Clone)]
pub struct CubeFixture {
    /// The model.
    pub model: MeshModel,
    /// Corners indexed by `x | y << 1 | z << 2`.
    pub vertices: [VertexId; 8],
    /// One surface per face: x=0, z=0, x=1, y=0, y=1, z=1.
    pub surfaces: [EntitySetId; 6],
    /// The enclosing volume.
    pub volume: EntitySetId,
}

/// Square pyramid whose four lateral faces are equilateral.
#[derive(Debug, Clone)]
pub struct PyramidFixture {
    /// The model.
    pub model: MeshModel,
    /// Base corners in counter-clockwise order, starting at the origin.
    pub base: [VertexId; 4],
    /// Apex.
    pub apex: VertexId,
    /// Base surface first, then one surface per lateral face.
    pub surfaces: [EntitySetId; 5],
    /// The enclosing volume.
    pub volume: EntitySetId,
}

/// Flat open patch of `n × n` square cells, two triangles per cell.
#[derive(Debug, Clone)]
pub struct GridFixture {
    /// The model.
    pub model: MeshModel,
    /// Vertices in row-major order, `(n + 1)²` of them.
    pub vertices: Vec<VertexId>,
    /// Points per row.
    pub stride: usize,
    /// The single surface holding every triangle.
    pub surface: EntitySetId,
}

impl GridFixture {
    /// Vertex at column `i`, row `j`.
    pub fn at(&self, i: usize, j: usize) -> VertexId {
        self.vertices[j * self.stride + i]
    }
}

/// Build a cube of edge length `side` with its corner at the origin.
///
/// Face diagonals are chosen so that four corners touch five triangles
/// and the other four touch four.
pub fn unit_cube(side: f64) -> CubeFixture {
    let mut model = MeshModel::new();
    let vertices: [VertexId; 8] = std::array::from_fn(|b| {
        let bit = |k: usize| ((b >> k) & 1) as f64 * side;
        model.add_vertex(Point3::new(bit(0), bit(1), bit(2)))
    });

    // (global id, triangles as corner bit-indices)
    let faces: [(i32, [[usize; 3]; 2]); 6] = [
        (1, [[0, 2, 6], [0, 6, 4]]),
        (2, [[0, 1, 3], [0, 3, 2]]),
        (3, [[1, 5, 3], [3, 5, 7]]),
        (4, [[1, 4, 0], [1, 5, 4]]),
        (5, [[2, 3, 7], [2, 7, 6]]),
        (6, [[4, 5, 7], [4, 7, 6]]),
    ];

    let volume = model.add_set(GeomDim::Volume, 1);
    let surfaces = faces.map(|(gid, tris)| {
        let corners = tris.map(|t| t.map(|c| vertices[c]));
        model.insert_surface(gid, &corners, Some(volume))
    });

    CubeFixture {
        model,
        vertices,
        surfaces,
        volume,
    }
}

/// Build a square pyramid with base edge `side` on the z=0 plane.
///
/// The apex height is `side / √2`, which makes every lateral edge equal
/// to `side`. The base is split along the diagonal from corner 0 to 2.
pub fn square_pyramid(side: f64) -> PyramidFixture {
    let mut model = MeshModel::new();
    let base = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(side, 0.0, 0.0),
        Point3::new(side, side, 0.0),
        Point3::new(0.0, side, 0.0),
    ]
    .map(|p| model.add_vertex(p));
    let apex = model.add_vertex(Point3::new(
        side / 2.0,
        side / 2.0,
        side / std::f64::consts::SQRT_2,
    ));

    let [a, b, c, d] = base;
    let faces: [(i32, Vec<[VertexId; 3]>); 5] = [
        (1, vec![[a, b, c], [a, c, d]]),
        (2, vec![[a, b, apex]]),
        (3, vec![[b, c, apex]]),
        (4, vec![[c, d, apex]]),
        (5, vec![[d, a, apex]]),
    ];

    let volume = model.add_set(GeomDim::Volume, 1);
    let surfaces = faces.map(|(gid, tris)| model.insert_surface(gid, &tris, Some(volume)));

    PyramidFixture {
        model,
        base,
        apex,
        surfaces,
        volume,
    }
}

/// Build a flat `n × n` grid of square cells of edge `spacing` at z=0.
///
/// Every cell is split along the same diagonal, so interior vertices
/// touch six triangles.
pub fn flat_grid(n: usize, spacing: f64) -> GridFixture {
    let mut model = MeshModel::new();
    let stride = n + 1;
    let mut vertices = Vec::with_capacity(stride * stride);
    for j in 0..stride {
        for i in 0..stride {
            vertices.push(model.add_vertex(Point3::new(
                i as f64 * spacing,
                j as f64 * spacing,
                0.0,
            )));
        }
    }

    let mut tris = Vec::with_capacity(2 * n * n);
    for j in 0..n {
        for i in 0..n {
            let v00 = vertices[j * stride + i];
            let v10 = vertices[j * stride + i + 1];
            let v01 = vertices[(j + 1) * stride + i];
            let v11 = vertices[(j + 1) * stride + i + 1];
            tris.push([v00, v10, v11]);
            tris.push([v00, v11, v01]);
        }
    }
    let surface = model.insert_surface(1, &tris, None);

    GridFixture {
        model,
        vertices,
        stride,
        surface,
    }
}
