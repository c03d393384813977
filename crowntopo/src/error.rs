//! Module containing the crowntopo universal error type
use thiserror::Error;

/// Universal error type for crowntopo
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Face refers to a vertex index outside the vertex array
    #[error("face {face} refers to vertex {vertex}, but the mesh has {vertex_count} vertices")]
    InvalidFaceIndex {
        /// Index of the offending face
        face: usize,
        /// Out-of-range vertex index named by the face
        vertex: usize,
        /// Number of vertices in the mesh
        vertex_count: usize,
    },

    /// Outlier percentile is outside the valid `(0, 100]` range
    #[error("outlier percentile {0} is outside (0, 100]")]
    InvalidPercentile(f64),

    /// Every face normal of the mesh is zero-length
    #[error("mesh has no valid geometry: every face normal is zero")]
    DegenerateGeometry,

    /// The smoothing system `I - step * L` could not be factorized
    #[error("smoothing system is not positive definite")]
    NotPositiveDefinite,

    /// First fundamental form of the given face is exactly singular
    ///
    /// Raised only when condition checking is disabled; the caller should
    /// enable it or clean the mesh.
    #[error("singular metric tensor at face {0}")]
    SingularMetric(usize),

    /// Projected area is zero, negative, or not finite
    #[error("projected area {0} is degenerate")]
    DegenerateProjection(f64),
}
