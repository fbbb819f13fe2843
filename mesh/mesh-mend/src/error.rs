//! Error and issue types for topology repair.
//!
//! Repair never aborts on a defect it cannot fix. Such defects are recorded as
//! [`RepairIssue`]s and returned with the outcome; [`RepairError`] is reserved
//! for misuse of the API.

use mesh_topology::{EdgeKey, MeshError, VertexId};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result type for repair operations.
pub type RepairResult<T> = Result<T, RepairError>;

/// Errors that can occur when invoking a repair operation.
#[derive(Debug, Error)]
pub enum RepairError {
    /// Parameters are out of range.
    #[error("invalid repair parameters: {reason}")]
    InvalidParams {
        /// What is wrong with the parameters.
        reason: String,
    },

    /// The mesh rejected a structural mutation.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// The mesh refused the bridging edge between two components.
    #[error("bridge between {from} and {to} was rejected: {source}")]
    BridgeRejected {
        /// First endpoint.
        from: VertexId,
        /// Second endpoint.
        to: VertexId,
        /// Why the mesh refused the edge.
        source: MeshError,
    },
}

/// A defect found or left behind by a repair pass.
///
/// Issues are informational: each one concerns a single loop, chain or edge
/// and does not prevent the remaining work from being done.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RepairIssue {
    /// A closed boundary walk with fewer than three distinct vertices. Skipped.
    #[error("boundary loop {vertices:?} has fewer than 3 distinct vertices")]
    DegenerateLoop {
        /// Vertices of the walk.
        vertices: Vec<VertexId>,
    },

    /// A chain of boundary edges that does not close. Left open.
    #[error("boundary chain {vertices:?} does not close into a loop")]
    UnrepairableBoundaryFragment {
        /// Vertices of the chain, end to end.
        vertices: Vec<VertexId>,
    },

    /// An edge shared by more than two faces. Detected only.
    #[error("edge {edge} is shared by {face_count} faces")]
    NonManifoldEdge {
        /// The offending edge.
        edge: EdgeKey,
        /// Number of adjacent faces.
        face_count: usize,
    },

    /// An edge bounding no face. It cannot take part in a closed surface.
    #[error("edge {edge} bounds no face")]
    DanglingEdge {
        /// The offending edge.
        edge: EdgeKey,
    },

    /// A hole larger than the configured limit. Left open.
    #[error("hole with {edges} edges exceeds the limit of {limit}")]
    HoleTooLarge {
        /// Number of edges around the hole.
        edges: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// The mesh refused a cover face; the partial cover was rolled back.
    #[error("cover for hole {vertices:?} was rejected: {source}")]
    FillRejected {
        /// Vertices of the hole.
        vertices: Vec<VertexId>,
        /// Why the mesh refused the face.
        source: MeshError,
    },

    /// The mesh refused the bridging edge.
    #[error("bridge between {from} and {to} was rejected: {source}")]
    BridgeRejected {
        /// First endpoint.
        from: VertexId,
        /// Second endpoint.
        to: VertexId,
        /// Why the mesh refused the edge.
        source: MeshError,
    },
}
