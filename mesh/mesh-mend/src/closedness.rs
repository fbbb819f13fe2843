//! Closedness checking.
//!
//! A mesh is closed when every edge bounds exactly two faces.

use mesh_topology::{EdgeKey, PolyMesh};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::RepairIssue;

/// Edges whose face count is not two, grouped by kind and sorted by key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClosednessReport {
    /// Edges with exactly one adjacent face. These outline holes.
    pub boundary_edges: Vec<EdgeKey>,
    /// Edges with no adjacent face.
    pub dangling_edges: Vec<EdgeKey>,
    /// Edges with more than two adjacent faces, with their face count.
    pub non_manifold_edges: Vec<(EdgeKey, usize)>,
}

impl ClosednessReport {
    /// Whether every edge bounds exactly two faces.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.boundary_edges.is_empty()
            && self.dangling_edges.is_empty()
            && self.non_manifold_edges.is_empty()
    }

    /// Number of edges whose face count is not two.
    #[must_use]
    pub fn open_edge_count(&self) -> usize {
        self.boundary_edges.len() + self.dangling_edges.len() + self.non_manifold_edges.len()
    }

    /// All edges whose face count is not two, sorted by key.
    #[must_use]
    pub fn open_edges(&self) -> Vec<EdgeKey> {
        let mut edges: Vec<EdgeKey> = self
            .boundary_edges
            .iter()
            .chain(&self.dangling_edges)
            .copied()
            .chain(self.non_manifold_edges.iter().map(|&(edge, _)| edge))
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Warnings for the defects hole filling cannot address.
    #[must_use]
    pub fn issues(&self) -> Vec<RepairIssue> {
        self.dangling_edges
            .iter()
            .map(|&edge| RepairIssue::DanglingEdge { edge })
            .chain(
                self.non_manifold_edges
                    .iter()
                    .map(|&(edge, face_count)| RepairIssue::NonManifoldEdge { edge, face_count }),
            )
            .collect()
    }
}

/// Classify every edge of the mesh by its adjacent face count.
///
/// # Example
///
/// ```
/// use mesh_topology::unit_cube;
/// use mesh_mend::check_closedness;
///
/// let mut cube = unit_cube();
/// assert!(check_closedness(&cube).is_closed());
///
/// cube.remove_face(0).unwrap();
/// let report = check_closedness(&cube);
/// assert!(!report.is_closed());
/// assert_eq!(report.boundary_edges.len(), 3);
/// ```
#[must_use]
pub fn check_closedness(mesh: &PolyMesh) -> ClosednessReport {
    let mut report = ClosednessReport::default();

    for edge in mesh.sorted_edges() {
        match edge.face_count() {
            0 => report.dangling_edges.push(edge.key()),
            1 => report.boundary_edges.push(edge.key()),
            2 => {}
            n => report.non_manifold_edges.push((edge.key(), n)),
        }
    }

    debug!(
        "Closedness: {} boundary, {} dangling, {} non-manifold of {} edges",
        report.boundary_edges.len(),
        report.dangling_edges.len(),
        report.non_manifold_edges.len(),
        mesh.edge_count()
    );

    report
}

/// Whether every edge bounds exactly two faces.
#[must_use]
pub fn is_closed(mesh: &PolyMesh) -> bool {
    mesh.edges().all(|edge| edge.face_count() == 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_topology::{Vertex, unit_cube, unit_cube_quads};

    #[test]
    fn closed_cube() {
        let report = check_closedness(&unit_cube());
        assert!(report.is_closed());
        assert_eq!(report.open_edge_count(), 0);
        assert!(report.issues().is_empty());
        assert!(is_closed(&unit_cube()));
    }

    #[test]
    fn cube_missing_a_side() {
        let mut cube = unit_cube_quads();
        cube.remove_face(1).unwrap();

        let report = check_closedness(&cube);
        assert!(!report.is_closed());
        assert_eq!(
            report.boundary_edges,
            vec![
                EdgeKey::new(4, 5),
                EdgeKey::new(4, 7),
                EdgeKey::new(5, 6),
                EdgeKey::new(6, 7)
            ]
        );
        assert!(report.dangling_edges.is_empty());
    }

    #[test]
    fn dangling_edge_is_reported() {
        let mut cube = unit_cube();
        let lone = cube.add_vertex(Vertex::from_coords(3.0, 0.0, 0.0));
        cube.add_edge(1, lone).unwrap();

        let report = check_closedness(&cube);
        assert!(!report.is_closed());
        assert!(report.boundary_edges.is_empty());
        assert_eq!(report.dangling_edges, vec![EdgeKey::new(1, lone)]);
        assert_eq!(
            report.issues(),
            vec![RepairIssue::DanglingEdge {
                edge: EdgeKey::new(1, lone)
            }]
        );
    }

    #[test]
    fn non_manifold_edge_is_reported() {
        let mut cube = unit_cube();
        let fin = cube.add_vertex(Vertex::from_coords(0.5, -1.0, 0.0));
        cube.add_face(&[0, 1, fin]).unwrap();

        let report = check_closedness(&cube);
        assert_eq!(report.non_manifold_edges, vec![(EdgeKey::new(0, 1), 3)]);
        assert_eq!(report.boundary_edges.len(), 2);
        assert_eq!(report.open_edges().len(), 3);
        assert!(matches!(
            report.issues()[0],
            RepairIssue::NonManifoldEdge { face_count: 3, .. }
        ));
    }

    #[test]
    fn isolated_vertices_do_not_open_a_mesh() {
        let mut cube = unit_cube();
        cube.add_vertex(Vertex::from_coords(9.0, 9.0, 9.0));
        assert!(check_closedness(&cube).is_closed());
    }
}
