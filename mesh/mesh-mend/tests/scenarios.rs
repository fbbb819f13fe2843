//! End-to-end repair scenarios on small fixtures.

#![allow(clippy::unwrap_used)]

use mesh_mend::{
    HoleFillParams, RepairStage, TopologyRepairParams, check_closedness, detect_boundary_loops,
    fill_holes, find_connected_components, repair_topology, repair_topology_with_params,
};
use mesh_topology::{EdgeKey, PolyMesh, Vector3, Vertex, unit_cube, unit_cube_quads};

fn cube_at(offset: f64) -> PolyMesh {
    let mut cube = unit_cube();
    cube.translate(Vector3::new(offset, 0.0, 0.0));
    cube
}

// =============================================================================
// Closed cube
// =============================================================================

#[test]
fn closed_cube_is_closed_and_connected() {
    let mesh = unit_cube();

    let closedness = check_closedness(&mesh);
    assert!(closedness.is_closed());
    assert!(closedness.boundary_edges.is_empty());
    assert!(mesh.edges().all(|e| e.face_count() == 2));

    let components = find_connected_components(&mesh);
    assert_eq!(components.component_count(), 1);
    assert_eq!(components.components()[0].len(), 8);
}

// =============================================================================
// Cube with one side removed
// =============================================================================

#[test]
fn cube_missing_a_side_is_filled() {
    let mut mesh = unit_cube_quads();
    mesh.remove_face(1).unwrap();

    let closedness = check_closedness(&mesh);
    assert!(!closedness.is_closed());
    assert_eq!(closedness.boundary_edges.len(), 4);

    let scan = detect_boundary_loops(&mesh);
    assert_eq!(scan.loops.len(), 1);
    let hole = scan.loops[0].clone();
    assert_eq!(hole.edge_count(), 4);

    let outcome = fill_holes(&mut mesh, &HoleFillParams::default());
    assert_eq!(outcome.loops_filled, 1);
    assert!(check_closedness(&mesh).is_closed());

    for edge in hole.edges() {
        let (a, b) = edge.vertices();
        assert_eq!(mesh.edge_face_count(a, b), Some(2), "edge {edge}");
    }
    mesh.check_invariants().unwrap();
}

#[test]
fn triangulated_cube_missing_top_is_repaired() {
    let mut mesh = unit_cube();
    mesh.remove_face(2).unwrap();
    mesh.remove_face(3).unwrap();

    let report = repair_topology(&mut mesh);
    assert!(!report.initial_closed);
    assert!(report.closed);
    assert_eq!(report.holes_filled_count, 1);
    assert_eq!(report.component_count, 1);
    assert_eq!(report.bridges_added, 0);
    assert!(report.is_repaired());
}

// =============================================================================
// Two disjoint cubes
// =============================================================================

#[test]
fn disjoint_cubes_are_bridged_once() {
    let mut mesh = cube_at(0.0);
    mesh.merge(&cube_at(2.5));

    let components = find_connected_components(&mesh);
    assert_eq!(components.component_count(), 2);
    assert!(components.components().iter().all(|c| c.len() == 8));

    let edges_before = mesh.edge_count();
    let report = repair_topology(&mut mesh);

    assert_eq!(report.bridges_added, 1);
    assert_eq!(mesh.edge_count(), edges_before + 1);
    assert_eq!(report.component_count, 1);
    assert_eq!(report.bridge.map(|b| b.edge()), Some(EdgeKey::new(1, 8)));

    // A faceless bridge leaves the union open
    assert!(!report.closed);
    assert_eq!(mesh.edge_face_count(1, 8), Some(0));
    assert_eq!(report.stages, vec![
        RepairStage::Initial,
        RepairStage::CheckedClosed,
        RepairStage::CheckedConnectivity,
        RepairStage::Bridged,
        RepairStage::Final,
    ]);
}

#[test]
fn open_cube_next_to_closed_cube() {
    let mut mesh = cube_at(0.0);
    mesh.remove_face(0).unwrap();
    mesh.merge(&cube_at(3.0));

    let report = repair_topology(&mut mesh);
    assert_eq!(report.holes_filled_count, 1);
    assert_eq!(report.bridges_added, 1);
    assert_eq!(report.component_count, 1);
    assert!(report.visited(RepairStage::FilledHoles));
    assert!(report.visited(RepairStage::Bridged));
    mesh.check_invariants().unwrap();
}

// =============================================================================
// Isolated vertex
// =============================================================================

#[test]
fn isolated_vertex_is_its_own_component_and_gets_bridged() {
    let mut mesh = unit_cube();
    let lone = mesh.add_vertex(Vertex::from_coords(0.5, 0.5, 3.0));

    let components = find_connected_components(&mesh);
    assert_eq!(components.component_count(), 2);
    assert_eq!(components.components()[1].vertices(), &[lone]);

    let report = repair_topology(&mut mesh);
    assert_eq!(report.component_count, 1);
    assert_eq!(report.bridges_added, 1);
    let bridge = report.bridge.unwrap();
    assert_eq!(bridge.to, lone);
    assert_eq!(bridge.from, 4);
    assert!(mesh.contains_edge(4, lone));
}

#[test]
fn mesh_of_only_isolated_vertices() {
    let mut mesh = PolyMesh::new();
    mesh.add_vertex(Vertex::from_coords(0.0, 0.0, 0.0));
    mesh.add_vertex(Vertex::from_coords(1.0, 0.0, 0.0));

    let report = repair_topology(&mut mesh);
    assert_eq!(report.initial_component_count, 2);
    assert_eq!(report.component_count, 1);
    assert!(mesh.contains_edge(0, 1));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn disabled_stages_are_skipped() {
    let mut mesh = cube_at(0.0);
    mesh.remove_face(0).unwrap();
    mesh.merge(&cube_at(3.0));

    let params = TopologyRepairParams::default()
        .with_fill_holes(false)
        .with_bridge_components(false);
    let report = repair_topology_with_params(&mut mesh, &params).unwrap();

    assert!(!report.visited(RepairStage::FilledHoles));
    assert!(!report.visited(RepairStage::Bridged));
    assert!(!report.closed);
    assert_eq!(report.component_count, 2);
}
