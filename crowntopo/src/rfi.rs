//! Relief index: 3D surface area over projected 2D area
//!
//! Surface area comes straight from triangle geometry; the projected area
//! comes from an external measurement service (historically a raster
//! pixel-count with a calibration mark), represented here by the
//! [`ProjectedArea`] trait.

use crate::{round3, Error, Mesh};
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// External measurement of a mesh's area projected onto the XY plane
///
/// Implementations may use any equivalent method (exact polygon
/// projection, raster pixel counting with a reference length); the core
/// consumes only the resulting area value.
pub trait ProjectedArea {
    /// Measured area of the mesh projected onto the XY plane
    fn projected_area(&self, mesh: &Mesh) -> Result<f64, Error>;
}

/// Result of a relief-index analysis
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReliefResult {
    /// Relief index: surface area / projected area, rounded to 3 decimals
    pub rfi: f64,
    /// 3D surface area, rounded to 3 decimals
    pub surface_area: f64,
    /// Projected 2D area, rounded to 3 decimals
    pub projected_area: f64,
}

/// Area of one triangle from three coordinate-pair determinants
///
/// Combining the XY, YZ, and ZX projections as
/// `0.5 * sqrt(detXY² + detYZ² + detZX²)` avoids the fragility of a plain
/// cross-product magnitude for near-degenerate triangles.
fn triangle_area(mesh: &Mesh, f: usize) -> f64 {
    let [a, b, c] = mesh.face_vertices(f);
    let det = |i: usize, j: usize| {
        Matrix3::new(
            a[i], b[i], c[i], //
            a[j], b[j], c[j], //
            1.0, 1.0, 1.0,
        )
        .determinant()
    };
    let xy = det(0, 1);
    let yz = det(1, 2);
    let zx = det(2, 0);
    0.5 * (xy * xy + yz * yz + zx * zx).sqrt()
}

/// Total 3D surface area of the mesh, rounded to 3 decimals
pub fn surface_area(mesh: &Mesh) -> f64 {
    round3((0..mesh.face_count()).map(|f| triangle_area(mesh, f)).sum())
}

/// Computes the relief index of a mesh
///
/// Fails with [`Error::DegenerateProjection`] if the measured projected
/// area is zero, negative, or not finite.
pub fn compute_rfi(
    mesh: &Mesh,
    projection: &impl ProjectedArea,
) -> Result<ReliefResult, Error> {
    let surface_area = surface_area(mesh);
    let raw = projection.projected_area(mesh)?;
    let projected_area = round3(raw);
    if !projected_area.is_finite() || projected_area <= 0.0 {
        return Err(Error::DegenerateProjection(raw));
    }
    Ok(ReliefResult {
        rfi: round3(surface_area / projected_area),
        surface_area,
        projected_area,
    })
}
