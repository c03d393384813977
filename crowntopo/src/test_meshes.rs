//! Small meshes shared between module tests

use crate::Mesh;
use nalgebra::Point3;

/// Regular octahedron with unit vertices and outward-wound faces
///
/// Its vertex normals coincide with the vertex positions, which makes
/// several analytic results exact: every face has `g = [[2, 1], [1, 2]]`,
/// `h = g`, energy 2, and area `√3 / 2`.
pub fn octahedron() -> Mesh {
    Mesh::new(
        vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, -1.0),
        ],
        vec![
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ],
    )
    .unwrap()
}

/// Two-face planar quad tilted so its normals have an XY projection
///
/// Both faces share edge (1, 2) and the normal `(-1, 0, 1) / √2`, so they
/// fall into a single orientation sector.
pub fn tilted_quad() -> Mesh {
    Mesh::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
        ],
        vec![[0, 1, 2], [1, 3, 2]],
    )
    .unwrap()
}

/// Two vertex-disjoint copies of [`tilted_quad`], the second offset in X
pub fn disjoint_quads() -> Mesh {
    let quad = tilted_quad();
    let mut vertices = quad.vertices().to_vec();
    vertices.extend(
        quad.vertices()
            .iter()
            .map(|v| Point3::new(v.x + 10.0, v.y, v.z)),
    );
    let mut faces = quad.faces().to_vec();
    faces.extend(quad.faces().iter().map(|&[a, b, c]| [a + 4, b + 4, c + 4]));
    Mesh::new(vertices, faces).unwrap()
}
