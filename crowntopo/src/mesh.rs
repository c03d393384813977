//! Triangulated-mesh value type shared by every analysis engine
//!
//! The mesh is a plain value: vertex positions plus vertex-index triples.
//! Per-face vertex positions are derived on demand rather than stored, so
//! they can never fall out of sync with the vertex array.  Analysis engines
//! borrow the mesh immutably and copy it when they need to move vertices
//! (smoothing, rotation), so a caller's mesh is never mutated behind its
//! back.

use crate::Error;
use nalgebra::{Matrix3, Point3, Vector3};

/// An indexed triangle mesh
///
/// All faces are triangles by construction; non-triangular input is a
/// loader concern and cannot be represented here.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[usize; 3]>,
}

impl Mesh {
    /// Builds a new mesh, checking that every face index is in range
    pub fn new(
        vertices: Vec<Point3<f64>>,
        faces: Vec<[usize; 3]>,
    ) -> Result<Self, Error> {
        for (f, face) in faces.iter().enumerate() {
            for &v in face {
                if v >= vertices.len() {
                    return Err(Error::InvalidFaceIndex {
                        face: f,
                        vertex: v,
                        vertex_count: vertices.len(),
                    });
                }
            }
        }
        Ok(Self { vertices, faces })
    }

    /// Vertex positions, index-addressable
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Faces as vertex-index triples
    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// The three vertex positions named by face `f`
    pub fn face_vertices(&self, f: usize) -> [Point3<f64>; 3] {
        let [a, b, c] = self.faces[f];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Mean of all vertex positions
    ///
    /// Returns the origin for a mesh with no vertices.
    pub fn centroid(&self) -> Point3<f64> {
        if self.vertices.is_empty() {
            return Point3::origin();
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.coords);
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Translates every vertex by the given offset
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Rotates every vertex about the Z axis through the origin
    pub fn rotate_z(&mut self, theta: f64) {
        let (s, c) = theta.sin_cos();
        let rot = Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0);
        for v in &mut self.vertices {
            *v = Point3::from(rot * v.coords);
        }
    }

    /// Builds a mesh with the same faces but replaced vertex positions
    ///
    /// Used after smoothing, which produces a new vertex array of the same
    /// length.
    pub(crate) fn with_vertices(&self, vertices: Vec<Point3<f64>>) -> Self {
        debug_assert_eq!(vertices.len(), self.vertices.len());
        Self {
            vertices,
            faces: self.faces.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn face_index_validation() {
        let verts = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        assert!(Mesh::new(verts.clone(), vec![[0, 1, 2]]).is_ok());
        assert_eq!(
            Mesh::new(verts, vec![[0, 1, 3]]),
            Err(Error::InvalidFaceIndex {
                face: 0,
                vertex: 3,
                vertex_count: 3
            })
        );
    }

    #[test]
    fn centroid_and_translate() {
        let mut mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 2.0, 2.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let c = mesh.centroid();
        assert_relative_eq!(c.x, 2.0 / 3.0);
        assert_relative_eq!(c.y, 2.0 / 3.0);
        assert_relative_eq!(c.z, 2.0 / 3.0);

        mesh.translate(-c.coords);
        let c = mesh.centroid();
        assert_relative_eq!(c.coords.norm(), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn rotation_preserves_z_and_norm() {
        let mut mesh = Mesh::new(
            vec![Point3::new(1.0, 0.0, 3.0)],
            vec![],
        )
        .unwrap();
        mesh.rotate_z(std::f64::consts::FRAC_PI_2);
        let v = mesh.vertices()[0];
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-15);
        assert_relative_eq!(v.y, 1.0, epsilon = 1e-15);
        assert_relative_eq!(v.z, 3.0);
    }
}
