//! Topology repair pass.
//!
//! Runs the checks and repairs in a fixed order, once each:
//!
//! ```text
//! Initial -> CheckedClosed -> (FilledHoles) -> CheckedConnectivity -> (Bridged) -> Final
//! ```
//!
//! Holes are filled only when the mesh is open; a bridge is inserted only when
//! there is more than one component. The pass never iterates to convergence,
//! so a mesh with three or more components, or with holes that could not be
//! covered, comes back with a report saying so.

use mesh_topology::PolyMesh;
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bridge::{Bridge, bridge_components};
use crate::closedness::check_closedness;
use crate::components::{ComponentAnalysis, find_connected_components};
use crate::error::{RepairError, RepairIssue, RepairResult};
use crate::holes::fill_holes;
use crate::params::TopologyRepairParams;

/// States of a repair pass, in the order they can be visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RepairStage {
    /// Nothing done yet.
    Initial,
    /// Closedness has been checked.
    CheckedClosed,
    /// Boundary loops have been covered.
    FilledHoles,
    /// Connected components have been computed.
    CheckedConnectivity,
    /// A bridging edge has been inserted.
    Bridged,
    /// Both checks have been re-run on the result.
    Final,
}

impl RepairStage {
    /// Human-readable name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::CheckedClosed => "checked-closed",
            Self::FilledHoles => "filled-holes",
            Self::CheckedConnectivity => "checked-connectivity",
            Self::Bridged => "bridged",
            Self::Final => "final",
        }
    }
}

/// Result of a topology repair pass.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RepairReport {
    /// Every edge has exactly two faces after the pass.
    pub closed: bool,
    /// Connected components after the pass.
    pub component_count: usize,
    /// Boundary loops that received a cover.
    pub holes_filled_count: usize,
    /// Bridging edges inserted (zero or one).
    pub bridges_added: usize,

    /// Closedness before any repair.
    pub initial_closed: bool,
    /// Connected components before bridging.
    pub initial_component_count: usize,
    /// Faces inserted by hole filling.
    pub faces_added: usize,
    /// The bridge inserted, if any.
    pub bridge: Option<Bridge>,
    /// States visited, in order.
    pub stages: Vec<RepairStage>,
    /// Defects found or left behind.
    pub issues: Vec<RepairIssue>,
}

impl RepairReport {
    /// Closed and made of a single component.
    #[must_use]
    pub fn is_repaired(&self) -> bool {
        self.closed && self.component_count == 1
    }

    /// Check if any repairs were performed.
    #[must_use]
    pub fn had_changes(&self) -> bool {
        self.holes_filled_count > 0 || self.bridges_added > 0
    }

    /// Whether the pass went through `stage`.
    #[must_use]
    pub fn visited(&self, stage: RepairStage) -> bool {
        self.stages.contains(&stage)
    }
}

impl std::fmt::Display for RepairReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Topology repair: {} (was {}), {} components (was {}), {} holes filled ({} faces), {} bridges, {} issues",
            if self.closed { "closed" } else { "open" },
            if self.initial_closed { "closed" } else { "open" },
            self.component_count,
            self.initial_component_count,
            self.holes_filled_count,
            self.faces_added,
            self.bridges_added,
            self.issues.len()
        )
    }
}

/// Repair a mesh with default parameters.
///
/// # Example
///
/// ```
/// use mesh_topology::unit_cube;
/// use mesh_mend::repair_topology;
///
/// let mut mesh = unit_cube();
/// mesh.remove_face(2).unwrap();
/// mesh.remove_face(3).unwrap();
///
/// let report = repair_topology(&mut mesh);
/// assert!(!report.initial_closed);
/// assert!(report.closed);
/// assert_eq!(report.holes_filled_count, 1);
/// assert!(report.is_repaired());
/// ```
#[must_use]
pub fn repair_topology(mesh: &mut PolyMesh) -> RepairReport {
    run(mesh, &TopologyRepairParams::default())
}

/// Repair a mesh with custom parameters.
///
/// # Errors
///
/// Returns [`RepairError::InvalidParams`](crate::RepairError::InvalidParams)
/// if `params` fail validation. The mesh is untouched in that case.
///
/// # Example
///
/// ```
/// use mesh_topology::{unit_cube, Vector3};
/// use mesh_mend::{repair_topology_with_params, TopologyRepairParams};
///
/// let mut mesh = unit_cube();
/// let mut other = unit_cube();
/// other.translate(Vector3::new(2.0, 0.0, 0.0));
/// mesh.merge(&other);
///
/// let report =
///     repair_topology_with_params(&mut mesh, &TopologyRepairParams::analysis_only()).unwrap();
/// assert_eq!(report.component_count, 2);
/// assert!(!report.had_changes());
/// ```
pub fn repair_topology_with_params(
    mesh: &mut PolyMesh,
    params: &TopologyRepairParams,
) -> RepairResult<RepairReport> {
    params.validate()?;
    Ok(run(mesh, params))
}

fn run(mesh: &mut PolyMesh, params: &TopologyRepairParams) -> RepairReport {
    let mut report = RepairReport::default();
    let mut analysis = ComponentAnalysis::default();
    let mut stage = RepairStage::Initial;
    report.stages.push(stage);

    loop {
        stage = match stage {
            RepairStage::Initial => {
                report.initial_closed = check_closedness(mesh).is_closed();
                RepairStage::CheckedClosed
            }
            RepairStage::CheckedClosed if !report.initial_closed && params.fill_holes => {
                let outcome = fill_holes(mesh, &params.hole_fill);
                report.holes_filled_count = outcome.loops_filled;
                report.faces_added = outcome.faces_added;
                report.issues.extend(outcome.issues);
                RepairStage::FilledHoles
            }
            RepairStage::CheckedClosed | RepairStage::FilledHoles => {
                analysis = find_connected_components(mesh);
                report.initial_component_count = analysis.component_count();
                RepairStage::CheckedConnectivity
            }
            RepairStage::CheckedConnectivity
                if !analysis.is_connected() && params.bridge_components =>
            {
                insert_bridge(mesh, &analysis, params, &mut report);
                RepairStage::Bridged
            }
            RepairStage::CheckedConnectivity | RepairStage::Bridged => {
                finish(mesh, &mut report);
                RepairStage::Final
            }
            RepairStage::Final => break,
        };
        debug!("Repair stage: {}", stage.as_str());
        report.stages.push(stage);
    }

    info!("{}", report);
    report
}

fn insert_bridge(
    mesh: &mut PolyMesh,
    analysis: &ComponentAnalysis,
    params: &TopologyRepairParams,
    report: &mut RepairReport,
) {
    match bridge_components(mesh, analysis, &params.bridge) {
        Ok(bridge) => {
            report.bridges_added = usize::from(bridge.is_some());
            report.bridge = bridge;
        }
        Err(RepairError::BridgeRejected { from, to, source }) => {
            report
                .issues
                .push(RepairIssue::BridgeRejected { from, to, source });
        }
        Err(err) => warn!("Bridge insertion failed: {}", err),
    }
}

/// Re-run both checks and record what is still wrong.
fn finish(mesh: &PolyMesh, report: &mut RepairReport) {
    let closedness = check_closedness(mesh);
    report.closed = closedness.is_closed();
    report.component_count = find_connected_components(mesh).component_count();

    // The fresh bridge is dangling by construction
    let bridge_edge = report.bridge.map(|b| b.edge());
    let is_bridge =
        |issue: &RepairIssue| matches!(issue, RepairIssue::DanglingEdge { edge } if Some(*edge) == bridge_edge);
    report.issues.extend(
        closedness
            .issues()
            .into_iter()
            .filter(|issue| !is_bridge(issue)),
    );
}
