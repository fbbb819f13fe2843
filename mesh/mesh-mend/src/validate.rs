//! Topology health reporting.
//!
//! Collects the closedness, boundary and connectivity checks into a single
//! report without touching the mesh.

use mesh_topology::PolyMesh;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::closedness::check_closedness;
use crate::components::find_connected_components;
use crate::holes::detect_boundary_loops;

/// Summary of a mesh's topology.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TopologyReport {
    /// Total number of vertices.
    pub vertex_count: usize,
    /// Total number of live faces.
    pub face_count: usize,
    /// Total number of edges.
    pub edge_count: usize,

    /// Edges with exactly one adjacent face.
    pub boundary_edge_count: usize,
    /// Edges with no adjacent face.
    pub dangling_edge_count: usize,
    /// Edges with more than two adjacent faces.
    pub non_manifold_edge_count: usize,
    /// Closed boundary loops (holes).
    pub boundary_loop_count: usize,
    /// Boundary chains that do not close.
    pub boundary_fragment_count: usize,

    /// Connected components.
    pub component_count: usize,
    /// Vertices without any edge.
    pub isolated_vertex_count: usize,

    /// Every edge has exactly two faces.
    pub is_closed: bool,
    /// At most one connected component.
    pub is_connected: bool,
}

impl TopologyReport {
    /// Whether the mesh is closed and connected.
    #[must_use]
    pub fn is_sound(&self) -> bool {
        self.is_closed && self.is_connected
    }

    /// Check if the mesh has any issues.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        !self.is_sound()
    }

    /// Open edges plus the extra components beyond the first.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.boundary_edge_count
            + self.dangling_edge_count
            + self.non_manifold_edge_count
            + self.component_count.saturating_sub(1)
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

impl std::fmt::Display for TopologyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Topology Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Faces: {}", self.face_count)?;
        writeln!(f, "  Edges: {}", self.edge_count)?;
        writeln!(f)?;
        writeln!(f, "  Status:")?;
        writeln!(f, "    Closed: {}", yes_no(self.is_closed))?;
        writeln!(
            f,
            "    Connected: {} ({} components)",
            yes_no(self.is_connected),
            self.component_count
        )?;

        if self.has_issues() {
            writeln!(f)?;
            writeln!(f, "  Issues:")?;
            if self.boundary_edge_count > 0 {
                writeln!(
                    f,
                    "    Boundary edges: {} in {} loops",
                    self.boundary_edge_count, self.boundary_loop_count
                )?;
            }
            if self.boundary_fragment_count > 0 {
                writeln!(f, "    Open boundary chains: {}", self.boundary_fragment_count)?;
            }
            if self.dangling_edge_count > 0 {
                writeln!(f, "    Dangling edges: {}", self.dangling_edge_count)?;
            }
            if self.non_manifold_edge_count > 0 {
                writeln!(f, "    Non-manifold edges: {}", self.non_manifold_edge_count)?;
            }
            if self.isolated_vertex_count > 0 {
                writeln!(f, "    Isolated vertices: {}", self.isolated_vertex_count)?;
            }
        }

        Ok(())
    }
}

/// Analyze a mesh and return a topology report.
///
/// # Example
///
/// ```
/// use mesh_topology::unit_cube_quads;
/// use mesh_mend::analyze_topology;
///
/// let mut mesh = unit_cube_quads();
/// mesh.remove_face(1).unwrap();
///
/// let report = analyze_topology(&mesh);
/// assert!(!report.is_closed);
/// assert_eq!(report.boundary_edge_count, 4);
/// assert_eq!(report.boundary_loop_count, 1);
/// assert_eq!(report.component_count, 1);
/// ```
#[must_use]
pub fn analyze_topology(mesh: &PolyMesh) -> TopologyReport {
    let closedness = check_closedness(mesh);
    let scan = detect_boundary_loops(mesh);
    let components = find_connected_components(mesh);

    TopologyReport {
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        edge_count: mesh.edge_count(),
        boundary_edge_count: closedness.boundary_edges.len(),
        dangling_edge_count: closedness.dangling_edges.len(),
        non_manifold_edge_count: closedness.non_manifold_edges.len(),
        boundary_loop_count: scan.loops.len(),
        boundary_fragment_count: scan.fragments.len(),
        component_count: components.component_count(),
        isolated_vertex_count: components.isolated_vertex_count(),
        is_closed: closedness.is_closed(),
        is_connected: components.is_connected(),
    }
}
