//! Indexed polygon mesh with explicit topology for CortenForge.
//!
//! This crate provides the mesh representation used by the topology repair
//! tools:
//!
//! - [`PolyMesh`] - vertex, edge and face tables with adjacency lookups
//! - [`Vertex`] - a position in 3D space
//! - [`Face`] - an ordered loop of at least three vertices, none repeated
//! - [`Edge`] / [`EdgeKey`] - an unordered vertex pair and its adjacent faces
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It performs no file
//! I/O: hosts decode their formats into a [`PolyMesh`] and encode it back.
//!
//! # Identifiers
//!
//! Vertices and faces are addressed by `u32` identifiers that never change
//! once assigned. Edges are addressed by their [`EdgeKey`]. No record holds a
//! reference to another record, only identifiers.
//!
//! # Example
//!
//! ```
//! use mesh_topology::{unit_cube, EdgeKey};
//!
//! let mut cube = unit_cube();
//! assert!(cube.edges().all(|e| e.face_count() == 2));
//!
//! // Open the cube by removing its top pair of triangles
//! cube.remove_face(2).unwrap();
//! cube.remove_face(3).unwrap();
//! assert_eq!(cube.edge_face_count(4, 5), Some(1));
//! assert!(cube.edge_by_key(EdgeKey::new(4, 6)).is_none());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod element;
mod error;
mod mesh;
mod vertex;

pub use element::{Edge, EdgeKey, Face, FaceId, VertexId};
pub use error::{MeshError, MeshResult};
pub use mesh::{PolyMesh, unit_cube, unit_cube_quads};
pub use vertex::Vertex;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
