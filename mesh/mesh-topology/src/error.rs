//! Error types for mesh construction and mutation.

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors raised by structural mutations of a [`PolyMesh`](crate::PolyMesh).
///
/// Every error is local to the single call that produced it: the mesh is left
/// exactly as it was before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MeshError {
    /// A face loop has fewer than three distinct vertices or revisits one.
    #[error("degenerate face: loop of {len} corners has only {distinct} distinct vertices")]
    DegenerateFace {
        /// Number of corners in the rejected loop.
        len: usize,
        /// Number of distinct vertices among those corners.
        distinct: usize,
    },

    /// An edge (or two consecutive face corners) would join a vertex to itself.
    #[error("edge would join vertex {vertex} to itself")]
    SelfLoop {
        /// The repeated vertex.
        vertex: u32,
    },

    /// A vertex identifier does not exist in the mesh.
    #[error("invalid vertex index {index} (mesh has {vertex_count} vertices)")]
    InvalidVertex {
        /// The invalid index.
        index: u32,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A face identifier does not refer to a live face.
    #[error("face {face} does not exist")]
    FaceNotFound {
        /// The missing face identifier.
        face: u32,
    },

    /// The edge, face and vertex tables disagree with each other.
    #[error("adjacency tables are inconsistent: {details}")]
    InconsistentAdjacency {
        /// Description of the first mismatch found.
        details: String,
    },
}
