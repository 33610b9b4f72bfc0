//! 3D Convex Hull over a half-edge mesh
//!
//! This library implements the incremental Quickhull algorithm for computing
//! convex hulls in 3D space. The hull is kept as a half-edge mesh during
//! construction and returned with full twin-edge adjacency, so neighbouring
//! faces can be walked without any extra lookup structure.
//!
//! # 3D Convex Hull Example
//! ```
//! use math_audio_quickhull::{ConvexHull3D, Point};
//!
//! let points = vec![
//!     Point::new(0.0, 0.0, 0.0),
//!     Point::new(1.0, 0.0, 0.0),
//!     Point::new(0.0, 1.0, 0.0),
//!     Point::new(0.0, 0.0, 1.0),
//!     Point::new(0.1, 0.1, 0.1),
//! ];
//!
//! let hull = ConvexHull3D::build(&points).unwrap();
//! assert_eq!(hull.num_faces(), 4);
//!
//! // every face knows its three neighbours
//! let mesh = hull.mesh();
//! for (id, _) in mesh.faces_enumerated() {
//!     assert_eq!(mesh.neighbors(id).len(), 3);
//! }
//! ```

mod config;
mod export;
mod geometry;
mod halfedge;
mod quickhull;
mod types;
mod vertex_list;

// Make testdata publicly available for tests and benches
pub mod testdata;

pub use config::HullConfig;
pub use export::{export_obj, write_obj};
pub use geometry::{Extremes, LineSegment, Plane};
pub use halfedge::{Face, FaceFlag, FaceId, HalfEdge, HalfEdgeId, HalfEdgeMesh};
pub use types::{ConvexHull3D, Point};
pub use vertex_list::VertexId;

/// Error types for convex hull operations
#[derive(Debug, thiserror::Error)]
pub enum ConvexHullError {
    #[error("Not enough points to form a hull: got {found}, minimum 4 required")]
    InsufficientVertices { found: usize },

    #[error("Invalid hull configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid half-edge mesh: {0}")]
    InvalidMesh(String),

    #[error("Invalid OBJ data: {0}")]
    InvalidObj(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConvexHullError>;

/// Minimum number of points a hull can be built from
pub const MIN_POINTS: usize = 4;
