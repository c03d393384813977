//! Crowntopo computes quantitative topography descriptors of triangulated
//! 3D surface meshes, of the kind used to characterize tooth-crown shape:
//!
//! - **DNE** (Dirichlet normal energy): how much the surface bends, from a
//!   per-face differential-geometry energy ([`dne`])
//! - **OPCR** (orientation patch count rotated): how complex the surface
//!   is, from counting contiguous same-orientation regions at 8 rotations
//!   ([`opcr`])
//! - **RFI** (relief index): how much relief the surface has, as the ratio
//!   of 3D surface area to projected 2D area ([`rfi`])
//!
//! The crate is the analysis core only.  Mesh file I/O, the raster
//! projected-area measurement, visualization, and batch orchestration are
//! external collaborators: a caller loads a consistent triangulated
//! [`Mesh`] and hands it to each engine independently.
//!
//! ```
//! use crowntopo::{dne::DneOptions, Mesh};
//! use nalgebra::Point3;
//!
//! // A regular octahedron, wound outward
//! let mesh = Mesh::new(
//!     vec![
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(-1.0, 0.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!         Point3::new(0.0, -1.0, 0.0),
//!         Point3::new(0.0, 0.0, 1.0),
//!         Point3::new(0.0, 0.0, -1.0),
//!     ],
//!     vec![
//!         [0, 2, 4], [2, 1, 4], [1, 3, 4], [3, 0, 4],
//!         [2, 0, 5], [1, 2, 5], [3, 1, 5], [0, 3, 5],
//!     ],
//! )?;
//!
//! let energy = crowntopo::compute_dne(&mesh, &DneOptions::default())?;
//! assert_eq!(energy.dne, 13.856); // 8√3, rounded
//!
//! // Each mirrored top/bottom face pair forms one orientation patch
//! let patches = crowntopo::compute_opcr(&mesh, 2)?;
//! assert_eq!(patches.opcr, 4.0);
//! # Ok::<(), crowntopo::Error>(())
//! ```
//!
//! Every engine is a pure function over `&Mesh`; analyses of different
//! meshes share no state and may run on as many threads as the caller
//! likes.  Errors that abort an analysis are typed ([`Error`]); tolerated
//! per-face anomalies are recorded in the result structs and logged via
//! the [`log`] facade.
#![warn(missing_docs)]

pub mod adjacency;
pub mod dne;
pub mod fair;
mod mesh;
pub mod normal;
pub mod opcr;
pub mod rfi;

mod error;
pub use error::Error;
pub use mesh::Mesh;

pub use dne::compute_dne;
pub use fair::smooth;
pub use normal::compute_normals;
pub use opcr::compute_opcr;
pub use rfi::compute_rfi;

#[cfg(test)]
pub(crate) mod test_meshes;

/// Rounds to 3 decimal places, the precision reported for every total
pub(crate) fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
