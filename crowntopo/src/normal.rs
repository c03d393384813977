//! Face and vertex unit-normal estimation with outward-orientation voting

use crate::{adjacency::AdjacencyIndex, Error, Mesh};
use log::{debug, warn};
use nalgebra::Vector3;
use serde::Serialize;

/// Unit normals of a mesh, with degeneracy diagnostics
#[derive(Clone, Debug, Serialize)]
pub struct Normals {
    /// Per-face unit normals; zero vectors for degenerate faces
    pub face: Vec<Vector3<f64>>,
    /// Per-vertex unit normals, approximated from incident faces; zero
    /// vectors for vertices with no valid incident normal
    pub vertex: Vec<Vector3<f64>>,
    /// True if the outward-orientation vote flipped every normal
    pub flipped: bool,
    /// Faces whose cross product had (near-)zero length
    pub zero_faces: Vec<usize>,
    /// Vertices whose incident-normal sum had (near-)zero length
    pub zero_vertices: Vec<usize>,
}

/// Divides by the vector's magnitude unless it is below machine epsilon, in
/// which case the vector is left as-is (and is reported via the bool)
fn normalize(v: &mut Vector3<f64>) -> bool {
    let d = v.norm();
    if d < f64::EPSILON {
        false
    } else {
        *v /= d;
        true
    }
}

/// Computes per-face and per-vertex unit normals
///
/// Face normals are normalized cross products of two edge vectors; vertex
/// normals are normalized sums of incident face normals.  Degenerate
/// entries stay zero-length and are recorded rather than raised.
///
/// Outward orientation is enforced by a majority vote: for every vertex the
/// sign of `dot(v - centroid, n)` is counted, and if negative signs
/// strictly outnumber positive ones all normals are flipped.  This is a
/// heuristic consensus, not a topological guarantee; meshes with large
/// concave regions can outvote their convex side.
///
/// Fails with [`Error::DegenerateGeometry`] only if *every* face normal is
/// zero.
pub fn compute_normals(
    mesh: &Mesh,
    adjacency: &AdjacencyIndex,
) -> Result<Normals, Error> {
    let mut face = Vec::with_capacity(mesh.face_count());
    let mut zero_faces = Vec::new();
    for f in 0..mesh.face_count() {
        let [a, b, c] = mesh.face_vertices(f);
        let mut n = (b - a).cross(&(c - a));
        if !normalize(&mut n) {
            debug!("zero-length normal at face {f}");
            zero_faces.push(f);
        }
        face.push(n);
    }
    if !face.is_empty() && zero_faces.len() == face.len() {
        return Err(Error::DegenerateGeometry);
    }

    let mut vertex = Vec::with_capacity(mesh.vertex_count());
    let mut zero_vertices = Vec::new();
    for v in 0..mesh.vertex_count() {
        let mut n: Vector3<f64> =
            adjacency.faces_of(v).iter().map(|&f| face[f]).sum();
        if !normalize(&mut n) {
            debug!("zero-length vertex normal at vertex {v}");
            zero_vertices.push(v);
        }
        vertex.push(n);
    }

    // Outward-orientation vote over all vertices.  Ties (including the
    // all-zero case) break toward "no flip".
    let centroid = mesh.centroid();
    let mut positive = 0usize;
    let mut negative = 0usize;
    for (v, n) in mesh.vertices().iter().zip(&vertex) {
        let s = (v - centroid).dot(n);
        if s > 0.0 {
            positive += 1;
        } else if s < 0.0 {
            negative += 1;
        }
    }
    let flipped = negative > positive;
    if flipped {
        warn!("outward normal flipping has occurred");
        for n in &mut face {
            *n = -*n;
        }
        for n in &mut vertex {
            *n = -*n;
        }
    }

    Ok(Normals {
        face,
        vertex,
        flipped,
        zero_faces,
        zero_vertices,
    })
}
