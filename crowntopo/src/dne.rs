//! Dirichlet normal energy: a scalar summary of surface bending
//!
//! For every face the local 2×2 first fundamental form `g` is built from
//! the triangle's edge vectors and its counterpart `h` from the vertex
//! normals' edge vectors; the face energy is `tr(g⁻¹ h)` and its density
//! is energy times face area.  Boundary faces are excluded (their
//! one-sided adjacency biases the local form), ill-conditioned metrics are
//! excluded when condition checking is on, and statistical outliers can be
//! rejected by percentile.  The DNE total is the sum of the surviving
//! densities.

use crate::{
    adjacency::{AdjacencyIndex, EdgeSet},
    fair,
    normal::{self, Normals},
    round3, Error, Mesh,
};
use log::warn;
use nalgebra::{Matrix2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Largest acceptable condition number for the first fundamental form
const CONDITION_LIMIT: f64 = 1e5;

/// Which per-face quantity the outlier percentile is taken over
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum OutlierBasis {
    /// Face energy `e`
    Energy,
    /// Energy density `e * area`
    EnergyArea,
}

/// Configuration for a DNE analysis run
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DneOptions {
    /// Implicitly fair the mesh before analysis
    pub smooth: bool,
    /// Number of smoothing iterations
    pub smooth_iterations: usize,
    /// Smoothing step size
    pub smooth_step: f64,
    /// Exclude faces whose metric tensor condition number exceeds `1e5`
    pub check_condition: bool,
    /// Reject statistical outlier faces
    pub remove_outliers: bool,
    /// Percentile cutoff for outlier rejection, in `(0, 100]`
    pub outlier_percentile: f64,
    /// Quantity the percentile cutoff is computed over
    pub outlier_basis: OutlierBasis,
}

impl Default for DneOptions {
    fn default() -> Self {
        Self {
            smooth: false,
            smooth_iterations: 3,
            smooth_step: 0.1,
            check_condition: true,
            remove_outliers: false,
            outlier_percentile: 99.9,
            outlier_basis: OutlierBasis::EnergyArea,
        }
    }
}

/// A face rejected as a statistical outlier
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutlierFace {
    /// Face index
    pub face: usize,
    /// The basis value that exceeded the cutoff (or was NaN)
    pub value: f64,
    /// Face area
    pub area: f64,
}

/// Result of a DNE analysis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnergyResult {
    /// Total Dirichlet normal energy, rounded to 3 decimals
    pub dne: f64,
    /// Per-face energy `e` (boundary faces zeroed)
    pub energy: Vec<f64>,
    /// Per-face area (sentinel 1 for excluded faces)
    pub area: Vec<f64>,
    /// Per-face energy density `e * area` (zeroed for rejected faces)
    pub density: Vec<f64>,
    /// Faces on the mesh boundary
    pub boundary_faces: Vec<usize>,
    /// Faces with two numerically identical vertices
    pub degenerate_faces: Vec<usize>,
    /// Faces excluded by the condition-number guard
    pub condition_faces: Vec<usize>,
    /// Faces whose energy evaluated to NaN
    pub nan_faces: Vec<usize>,
    /// Faces rejected as statistical outliers
    pub outlier_faces: Vec<OutlierFace>,
}

/// Per-face energy and area, plus which diagnostic list (if any) the face
/// landed in
fn face_energy(
    f: usize,
    positions: [Point3<f64>; 3],
    normals: [Vector3<f64>; 3],
    check_condition: bool,
    result: &mut EnergyResult,
) -> Result<(f64, f64), Error> {
    // Duplicate-vertex sentinel: zero energy, unit area, no further math
    if positions[0] == positions[1]
        || positions[0] == positions[2]
        || positions[1] == positions[2]
    {
        result.degenerate_faces.push(f);
        return Ok((0.0, 1.0));
    }

    let b1 = positions[1] - positions[0];
    let b2 = positions[2] - positions[0];
    let g = Matrix2::new(b1.dot(&b1), b1.dot(&b2), b2.dot(&b1), b2.dot(&b2));

    if check_condition {
        let cond = condition_number(&g);
        if !cond.is_finite() || cond > CONDITION_LIMIT {
            warn!("high condition number {cond:.3e} at face {f}");
            result.condition_faces.push(f);
            return Ok((0.0, 1.0));
        }
    }

    let det = g[(0, 0)] * g[(1, 1)] - g[(0, 1)] * g[(1, 0)];
    if det == 0.0 {
        // Only reachable with condition checking disabled; the guard
        // already excludes singular metrics
        return Err(Error::SingularMetric(f));
    }

    let c1 = normals[1] - normals[0];
    let c2 = normals[2] - normals[0];
    let h = Matrix2::new(c1.dot(&c1), c1.dot(&c2), c2.dot(&c1), c2.dot(&c2));

    let g_inv =
        Matrix2::new(g[(1, 1)], -g[(0, 1)], -g[(1, 0)], g[(0, 0)]) / det;
    let e = (g_inv * h).trace();
    let area = 0.5 * det.sqrt();

    if e.is_nan() {
        warn!("NaN energy at face {f}");
        result.nan_faces.push(f);
    }
    Ok((e, area))
}

/// 2-norm condition number of a symmetric 2×2 matrix
///
/// For a symmetric matrix the singular values are the eigenvalue
/// magnitudes, which have a closed form.
fn condition_number(g: &Matrix2<f64>) -> f64 {
    let half_trace = (g[(0, 0)] + g[(1, 1)]) / 2.0;
    let d = ((g[(0, 0)] - g[(1, 1)]) / 2.0).hypot(g[(0, 1)]);
    let s1 = (half_trace + d).abs();
    let s2 = (half_trace - d).abs();
    s1.max(s2) / s1.min(s2)
}

/// Percentile score over a slice, with linear interpolation between ranks
///
/// NaN values sort last, so any NaN pushes the cutoff toward the top of
/// the range rather than poisoning it.
fn percentile(values: &[f64], p: f64) -> f64 {
    debug_assert!(!values.is_empty());
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let frac = rank - lo as f64;
    if frac == 0.0 {
        sorted[lo]
    } else {
        sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])
    }
}

/// Computes the Dirichlet normal energy of a mesh
///
/// The pipeline is strictly ordered: adjacency, optional implicit fairing
/// (whose failure aborts the analysis), boundary detection, normal
/// estimation, per-face energy, aggregation.  Tolerated anomalies are
/// accumulated into the result's diagnostic lists; input and numerical
/// degeneracy errors abort with a typed [`Error`].
pub fn compute_dne(
    mesh: &Mesh,
    options: &DneOptions,
) -> Result<EnergyResult, Error> {
    if options.outlier_percentile <= 0.0 || options.outlier_percentile > 100.0
    {
        return Err(Error::InvalidPercentile(options.outlier_percentile));
    }

    let adjacency = AdjacencyIndex::new(mesh.faces(), mesh.vertex_count());

    let smoothed;
    let mesh = if options.smooth {
        smoothed = mesh.with_vertices(fair::smooth(
            mesh,
            &adjacency,
            options.smooth_iterations,
            options.smooth_step,
        )?);
        &smoothed
    } else {
        mesh
    };

    let boundary_faces = EdgeSet::new(mesh.faces()).boundary_faces();
    let normals = normal::compute_normals(mesh, &adjacency)?;

    let mut result = EnergyResult {
        dne: 0.0,
        energy: Vec::with_capacity(mesh.face_count()),
        area: Vec::with_capacity(mesh.face_count()),
        density: Vec::new(),
        boundary_faces,
        degenerate_faces: Vec::new(),
        condition_faces: Vec::new(),
        nan_faces: Vec::new(),
        outlier_faces: Vec::new(),
    };

    let Normals { vertex, .. } = &normals;
    for (f, face) in mesh.faces().iter().enumerate() {
        let positions = mesh.face_vertices(f);
        let ns = [vertex[face[0]], vertex[face[1]], vertex[face[2]]];
        let (e, area) = face_energy(
            f,
            positions,
            ns,
            options.check_condition,
            &mut result,
        )?;
        result.energy.push(e);
        result.area.push(area);
    }

    // Boundary faces never contribute
    for &f in &result.boundary_faces {
        result.energy[f] = 0.0;
    }
    result.density = result
        .energy
        .iter()
        .zip(&result.area)
        .map(|(e, a)| e * a)
        .collect();

    if options.remove_outliers && !result.density.is_empty() {
        let basis: &[f64] = match options.outlier_basis {
            OutlierBasis::Energy => &result.energy,
            OutlierBasis::EnergyArea => &result.density,
        };
        let cutoff = percentile(basis, options.outlier_percentile);
        let removed: Vec<OutlierFace> = basis
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > cutoff || v.is_nan())
            .map(|(f, &value)| OutlierFace {
                face: f,
                value,
                area: result.area[f],
            })
            .collect();
        for outlier in removed {
            warn!(
                "outlier removed at face {}: value {} area {}",
                outlier.face, outlier.value, outlier.area
            );
            result.density[outlier.face] = 0.0;
            result.outlier_faces.push(outlier);
        }
    }

    result.dne = round3(result.density.iter().sum());
    Ok(result)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_meshes::{octahedron, tilted_quad};
    use approx::assert_relative_eq;

    #[test]
    fn octahedron_dne_is_exact() {
        // Vertex normals equal vertex positions, so h = g, every face has
        // energy 2 and area √3 / 2; 8 faces total 8√3
        let result =
            compute_dne(&octahedron(), &DneOptions::default()).unwrap();
        assert_relative_eq!(result.dne, 13.856, epsilon = 1e-9);
        for e in &result.energy {
            assert_relative_eq!(*e, 2.0, epsilon = 1e-12);
        }
        assert!(result.boundary_faces.is_empty());
        assert!(result.condition_faces.is_empty());
        assert!(result.nan_faces.is_empty());
    }

    #[test]
    fn open_mesh_is_all_boundary() {
        // Both quad faces own a one-face edge, so every energy is zeroed
        let result =
            compute_dne(&tilted_quad(), &DneOptions::default()).unwrap();
        assert_eq!(result.boundary_faces, vec![0, 1]);
        assert_relative_eq!(result.dne, 0.0);
    }

    #[test]
    fn full_percentile_removes_nothing() {
        let mesh = octahedron();
        let kept = compute_dne(&mesh, &DneOptions::default()).unwrap();
        let removed = compute_dne(
            &mesh,
            &DneOptions {
                remove_outliers: true,
                outlier_percentile: 100.0,
                ..DneOptions::default()
            },
        )
        .unwrap();
        assert_eq!(kept.dne, removed.dne);
        assert!(removed.outlier_faces.is_empty());
    }

    #[test]
    fn percentile_bounds_are_validated() {
        for p in [0.0, -1.0, 101.0] {
            let err = compute_dne(
                &octahedron(),
                &DneOptions {
                    outlier_percentile: p,
                    ..DneOptions::default()
                },
            )
            .unwrap_err();
            assert_eq!(err, Error::InvalidPercentile(p));
        }
    }

    #[test]
    fn duplicate_vertices_yield_sentinel() {
        // Face 1 repeats a vertex position; energy 0 and area 1 no matter
        // the condition-checking setting
        let mesh = Mesh::new(
            vec![
                nalgebra::Point3::new(0.0, 0.0, 0.0),
                nalgebra::Point3::new(1.0, 0.0, 0.0),
                nalgebra::Point3::new(0.0, 1.0, 0.0),
                nalgebra::Point3::new(1.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2], [1, 3, 2]],
        )
        .unwrap();
        for check_condition in [false, true] {
            let result = compute_dne(
                &mesh,
                &DneOptions {
                    check_condition,
                    ..DneOptions::default()
                },
            )
            .unwrap();
            assert_eq!(result.energy[1], 0.0);
            assert_eq!(result.area[1], 1.0);
            assert_eq!(result.degenerate_faces, vec![1]);
        }
    }

    #[test]
    fn singular_metric_behavior_depends_on_checking() {
        // Collinear (but distinct) vertices make g exactly singular
        let mesh = Mesh::new(
            vec![
                nalgebra::Point3::new(0.0, 0.0, 0.0),
                nalgebra::Point3::new(1.0, 0.0, 0.0),
                nalgebra::Point3::new(2.0, 0.0, 0.0),
                nalgebra::Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 3], [0, 1, 2]],
        )
        .unwrap();

        let err = compute_dne(
            &mesh,
            &DneOptions {
                check_condition: false,
                ..DneOptions::default()
            },
        )
        .unwrap_err();
        assert_eq!(err, Error::SingularMetric(1));

        let result =
            compute_dne(&mesh, &DneOptions::default()).unwrap();
        assert_eq!(result.condition_faces, vec![1]);
        assert_eq!(result.energy[1], 0.0);
        assert_eq!(result.area[1], 1.0);
    }

    #[test]
    fn boundary_detection_is_implementation_invariant() {
        // An alternative boundary detector built on per-edge incident-face
        // intersection must flag the same faces, and therefore produce the
        // same DNE
        let mesh = tilted_quad();
        let adjacency =
            AdjacencyIndex::new(mesh.faces(), mesh.vertex_count());
        let edges = EdgeSet::new(mesh.faces());

        let mut alternative = Vec::new();
        for (f, &[a, b, c]) in mesh.faces().iter().enumerate() {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                let shared = adjacency
                    .faces_of(u)
                    .iter()
                    .filter(|x| adjacency.faces_of(v).contains(x))
                    .count();
                if shared == 1 {
                    alternative.push(f);
                }
            }
        }
        alternative.sort_unstable();
        alternative.dedup();

        assert_eq!(alternative, edges.boundary_faces());
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        assert_relative_eq!(percentile(&values, 50.0), 4.0);
        assert_relative_eq!(percentile(&values, 100.0), 7.0);
        assert_relative_eq!(percentile(&values, 25.0), 2.5);
    }

    #[test]
    fn smoothing_failure_propagates() {
        let err = compute_dne(
            &octahedron(),
            &DneOptions {
                smooth: true,
                smooth_step: -10.0,
                ..DneOptions::default()
            },
        )
        .unwrap_err();
        assert_eq!(err, Error::NotPositiveDefinite);
    }

    #[test]
    fn smoothing_the_octahedron_preserves_dne() {
        // By symmetry the implicit fair only rescales the octahedron, and
        // DNE is invariant under uniform scaling (energy goes as 1/s²,
        // area as s²), so the total is unchanged
        let result = compute_dne(
            &octahedron(),
            &DneOptions {
                smooth: true,
                smooth_iterations: 2,
                smooth_step: 0.1,
                ..DneOptions::default()
            },
        )
        .unwrap();
        assert_relative_eq!(result.dne, 13.856, epsilon = 1e-9);
        // Vertices shrank, so per-face energy rose above the unsmoothed 2
        assert!(result.energy.iter().all(|&e| e > 2.0));
    }
}
