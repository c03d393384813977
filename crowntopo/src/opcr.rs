//! Orientation patch count rotated: a surface-complexity metric
//!
//! Faces are binned by the XY aspect of their normals into 8 sectors of
//! 45°, edge-adjacent faces of the same sector are merged into patches,
//! and patches below a minimum size are culled; the patch count is the OPC
//! for one rotation.  The whole procedure runs at 8 cumulative 5.625°
//! rotations about the Z axis, and OPCR is the mean of the 8 counts, which
//! washes out the arbitrariness of the sector boundaries.

use crate::{
    adjacency::AdjacencyIndex,
    normal::{self, Normals},
    Error, Mesh,
};
use log::warn;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Number of Z rotations OPC is evaluated at
pub const ROTATION_COUNT: usize = 8;

/// Rotation step in degrees (45° / 8)
pub const ROTATION_STEP_DEGREES: f64 = 5.625;

/// Orientation bin of a face, from the XY aspect of its normal
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// One of 8 45°-wide sectors, counted counterclockwise from +X with
    /// boundaries offset by 22.5°
    Sector(u8),
    /// The normal has no XY projection (purely vertical face); excluded
    /// from patch counting
    Flat,
}

/// A contiguous same-orientation patch of faces
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// Orientation sector all member faces share
    pub sector: u8,
    /// Member face indices, sorted
    pub faces: Vec<usize>,
}

/// Result of an OPCR analysis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchResult {
    /// Mean of the per-rotation OPC values
    pub opcr: f64,
    /// Patch count at each rotation, after small-patch culling
    pub opc: [usize; ROTATION_COUNT],
    /// Surviving patches at each rotation
    pub patches: [Vec<Patch>; ROTATION_COUNT],
    /// Per-face orientation bins at each rotation
    pub color_maps: [Vec<Orientation>; ROTATION_COUNT],
}

/// Disjoint-set over face indices, with path compression and union by rank
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Bins a unit normal by the angle of its XY projection
fn orientation(n: &Vector3<f64>) -> Orientation {
    if n.x == 0.0 && n.y == 0.0 {
        return Orientation::Flat;
    }
    let mut angle = n.y.atan2(n.x).to_degrees();
    if angle < 0.0 {
        angle += 360.0;
    }
    Orientation::Sector((((angle + 22.5) % 360.0) / 45.0).floor() as u8)
}

/// Face pairs sharing an edge, derived from vertex-sharing pairs
///
/// A pair of faces sharing a whole edge is generated by both of the edge's
/// vertices; the first sighting registers the pair, the second emits it.
/// A third sighting means duplicate geometry and is logged, not fatal.
fn edge_adjacent_pairs(adjacency: &AdjacencyIndex) -> Vec<(usize, usize)> {
    let mut seen = HashSet::new();
    let mut seen_twice = HashSet::new();
    let mut adjacent = Vec::new();
    for v in 0..adjacency.vertex_count() {
        let mut faces = adjacency.faces_of(v).to_vec();
        faces.sort_unstable();
        faces.dedup();
        for (i, &a) in faces.iter().enumerate() {
            for &b in &faces[i + 1..] {
                let pair = (a, b);
                if seen.contains(&pair) {
                    adjacent.push(pair);
                    if !seen_twice.insert(pair) {
                        warn!(
                            "possible identical triangles at faces \
                             {a} and {b}"
                        );
                    }
                } else {
                    seen.insert(pair);
                }
            }
        }
    }
    adjacent
}

/// Merges same-sector adjacent pairs into patches and culls small ones
fn merge_patches(
    pairs: &[(usize, usize)],
    sector: u8,
    min_patch_size: usize,
) -> Vec<Patch> {
    let mut index: HashMap<usize, usize> = HashMap::new();
    let mut faces: Vec<usize> = Vec::new();
    for &(a, b) in pairs {
        for f in [a, b] {
            index.entry(f).or_insert_with(|| {
                faces.push(f);
                faces.len() - 1
            });
        }
    }

    let mut uf = UnionFind::new(faces.len());
    for &(a, b) in pairs {
        uf.union(index[&a], index[&b]);
    }

    let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, &f) in faces.iter().enumerate() {
        groups.entry(uf.find(i)).or_default().push(f);
    }

    let mut out: Vec<Patch> = groups
        .into_values()
        .filter(|g| g.len() >= min_patch_size)
        .map(|mut faces| {
            faces.sort_unstable();
            Patch { sector, faces }
        })
        .collect();
    out.sort_by_key(|p| p.faces[0]);
    out
}

/// Computes the orientation patch count rotated of a mesh
///
/// The mesh is copied and centered on its vertex centroid first, so the
/// cumulative rotations stay about the origin; the caller's mesh is never
/// touched.  Patches smaller than `min_patch_size` faces are culled.
pub fn compute_opcr(
    mesh: &Mesh,
    min_patch_size: usize,
) -> Result<PatchResult, Error> {
    let mut mesh = mesh.clone();
    let centroid = mesh.centroid();
    mesh.translate(-centroid.coords);

    let adjacency = AdjacencyIndex::new(mesh.faces(), mesh.vertex_count());
    let theta = ROTATION_STEP_DEGREES.to_radians();

    let mut opc = [0usize; ROTATION_COUNT];
    let mut patches: [Vec<Patch>; ROTATION_COUNT] = Default::default();
    let mut color_maps: [Vec<Orientation>; ROTATION_COUNT] =
        Default::default();

    for r in 0..ROTATION_COUNT {
        if r > 0 {
            mesh.rotate_z(theta);
        }
        let Normals { face, .. } =
            normal::compute_normals(&mesh, &adjacency)?;
        let colors: Vec<Orientation> = face.iter().map(orientation).collect();

        let mut sector_pairs: [Vec<(usize, usize)>; 8] = Default::default();
        for (a, b) in edge_adjacent_pairs(&adjacency) {
            if let Orientation::Sector(s) = colors[a] {
                if colors[a] == colors[b] {
                    sector_pairs[s as usize].push((a, b));
                }
            }
        }

        let mut rotation_patches = Vec::new();
        for (s, pairs) in sector_pairs.iter().enumerate() {
            rotation_patches.extend(merge_patches(
                pairs,
                s as u8,
                min_patch_size,
            ));
        }

        opc[r] = rotation_patches.len();
        patches[r] = rotation_patches;
        color_maps[r] = colors;
    }

    let opcr = opc.iter().sum::<usize>() as f64 / ROTATION_COUNT as f64;
    Ok(PatchResult {
        opcr,
        opc,
        patches,
        color_maps,
    })
}
