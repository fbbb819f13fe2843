//! Topology analysis and repair for polygon meshes.
//!
//! This crate checks a [`PolyMesh`](mesh_topology::PolyMesh) for the two
//! defects that stop downstream volume, boolean and export operations, and
//! repairs them in a single pass:
//!
//! - Open boundaries: edges bounding fewer or more than two faces
//!   ([`check_closedness`]). Closed boundary loops are covered with new faces
//!   ([`fill_holes`]).
//! - Disjoint pieces: more than one connected component
//!   ([`find_connected_components`]). The two closest components are joined by
//!   a single edge between their nearest vertices ([`bridge_components`]).
//!
//! [`repair_topology`] runs both in order and returns a [`RepairReport`].
//! Defects that cannot be repaired are reported as [`RepairIssue`]s rather
//! than errors.
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero Bevy dependencies. It logs through
//! `tracing` and installs no subscriber.
//!
//! # Example
//!
//! ```
//! use mesh_topology::{unit_cube, Vector3};
//! use mesh_mend::{analyze_topology, repair_topology};
//!
//! // An open cube next to a closed one
//! let mut mesh = unit_cube();
//! mesh.remove_face(0).unwrap();
//! let mut other = unit_cube();
//! other.translate(Vector3::new(2.0, 0.0, 0.0));
//! mesh.merge(&other);
//!
//! let before = analyze_topology(&mesh);
//! assert!(!before.is_closed);
//! assert_eq!(before.component_count, 2);
//!
//! let report = repair_topology(&mut mesh);
//! assert_eq!(report.holes_filled_count, 1);
//! assert_eq!(report.bridges_added, 1);
//! assert_eq!(report.component_count, 1);
//! println!("{report}");
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod bridge;
pub mod closedness;
pub mod components;
mod error;
pub mod holes;
mod params;
mod repair;
mod validate;

pub use error::{RepairError, RepairIssue, RepairResult};
pub use params::{BridgeParams, FillStrategy, HoleFillParams, PairSearch, TopologyRepairParams};
pub use repair::{RepairReport, RepairStage, repair_topology, repair_topology_with_params};
pub use validate::{TopologyReport, analyze_topology};

// Re-export commonly used items from submodules
pub use bridge::{Bridge, bridge_components, find_bridge_pair};
pub use closedness::{ClosednessReport, check_closedness, is_closed};
pub use components::{Component, ComponentAnalysis, find_connected_components, is_connected};
pub use holes::{BoundaryLoop, BoundaryScan, HoleFillOutcome, detect_boundary_loops, fill_holes};
