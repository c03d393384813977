//! Vertex-to-face adjacency and edge bookkeeping
//!
//! [`AdjacencyIndex`] is the vertex→incident-face lookup every other engine
//! is built on; [`EdgeSet`] derives the undirected edge list and from it the
//! boundary faces (faces owning an edge with a single incident face).  Both
//! are built once per mesh and immutable afterwards.

use std::collections::HashMap;

/// Per-vertex list of incident face indices
///
/// Face indices appear in face iteration order.  A vertex repeated within a
/// single face (an upstream data error) shows up as a duplicate entry; no
/// attempt is made to repair it here.
#[derive(Clone, Debug)]
pub struct AdjacencyIndex {
    faces_of: Vec<Vec<usize>>,
}

impl AdjacencyIndex {
    /// Builds the index in a single O(faces) pass
    pub fn new(faces: &[[usize; 3]], vertex_count: usize) -> Self {
        let mut faces_of = vec![Vec::new(); vertex_count];
        for (f, face) in faces.iter().enumerate() {
            for &v in face {
                faces_of[v].push(f);
            }
        }
        Self { faces_of }
    }

    /// Faces incident to vertex `v`
    pub fn faces_of(&self, v: usize) -> &[usize] {
        &self.faces_of[v]
    }

    /// Number of vertices indexed
    pub fn vertex_count(&self) -> usize {
        self.faces_of.len()
    }
}

/// Undirected mesh edges with their incident faces
///
/// A consistent triangulated surface has one or two faces per edge; more
/// than two indicates duplicate geometry upstream.
#[derive(Clone, Debug)]
pub struct EdgeSet {
    edges: HashMap<(usize, usize), Vec<usize>>,
}

impl EdgeSet {
    /// Collects the undirected edges of the given face list
    pub fn new(faces: &[[usize; 3]]) -> Self {
        let mut edges: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for (f, &[a, b, c]) in faces.iter().enumerate() {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                let key = (u.min(v), u.max(v));
                edges.entry(key).or_default().push(f);
            }
        }
        Self { edges }
    }

    /// Number of distinct edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// True if the mesh has no edges
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Faces containing at least one edge with a single incident face
    ///
    /// Returned sorted and deduplicated.
    pub fn boundary_faces(&self) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .edges
            .values()
            .filter(|faces| faces.len() == 1)
            .map(|faces| faces[0])
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}
