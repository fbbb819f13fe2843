//! Connectivity repair by bridging the closest pair of components.
//!
//! One pass inserts one edge between the two closest vertices that lie in
//! different components. The edge bounds no face; it joins the two
//! components topologically but does not close the surface.

use std::cmp::Ordering;

use mesh_topology::{EdgeKey, PolyMesh, VertexId};
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::components::ComponentAnalysis;
use crate::error::{RepairError, RepairResult};
use crate::params::{BridgeParams, PairSearch};

/// A bridging edge between two components.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bridge {
    /// Smaller endpoint.
    pub from: VertexId,
    /// Larger endpoint.
    pub to: VertexId,
    /// Euclidean distance between the endpoints.
    pub distance: f64,
    /// Component indices of `from` and `to`.
    pub components: (usize, usize),
}

impl Bridge {
    /// Key of the bridging edge.
    #[must_use]
    pub const fn edge(&self) -> EdgeKey {
        EdgeKey::new(self.from, self.to)
    }
}

/// A cross-component pair under consideration, `a < b`.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    a: VertexId,
    b: VertexId,
    distance_squared: f64,
}

impl Candidate {
    fn new(v0: VertexId, v1: VertexId, distance_squared: f64) -> Self {
        let (a, b) = if v0 < v1 { (v0, v1) } else { (v1, v0) };
        Self {
            a,
            b,
            // NaN never wins
            distance_squared: if distance_squared.is_nan() {
                f64::INFINITY
            } else {
                distance_squared
            },
        }
    }

    fn id_sum(&self) -> u64 {
        u64::from(self.a) + u64::from(self.b)
    }

    /// Shorter first, then smaller id sum, then smaller first endpoint.
    fn order(&self, other: &Self) -> Ordering {
        self.distance_squared
            .total_cmp(&other.distance_squared)
            .then_with(|| self.id_sum().cmp(&other.id_sum()))
            .then_with(|| self.a.cmp(&other.a))
    }
}

/// Keep the better of `best` and `candidate`.
fn consider(best: &mut Option<Candidate>, candidate: Candidate) {
    let better = best
        .as_ref()
        .is_none_or(|current| candidate.order(current) == Ordering::Less);
    if better {
        *best = Some(candidate);
    }
}

/// Find the closest pair of vertices in different components.
///
/// Ties on distance go to the pair with the smallest identifier sum, then to
/// the pair with the smaller first endpoint, so both searches return the same
/// pair for the same mesh. Returns `None` when there are fewer than two
/// components.
///
/// # Example
///
/// ```
/// use mesh_topology::{unit_cube, Vector3};
/// use mesh_mend::{find_bridge_pair, find_connected_components, PairSearch};
///
/// let mut mesh = unit_cube();
/// let mut other = unit_cube();
/// other.translate(Vector3::new(3.0, 0.0, 0.0));
/// mesh.merge(&other);
///
/// let analysis = find_connected_components(&mesh);
/// let bridge = find_bridge_pair(&mesh, &analysis, PairSearch::BruteForce).unwrap();
///
/// // Vertex 1 at (1,0,0) faces vertex 8 at (3,0,0)
/// assert_eq!((bridge.from, bridge.to), (1, 8));
/// assert!((bridge.distance - 2.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn find_bridge_pair(
    mesh: &PolyMesh,
    analysis: &ComponentAnalysis,
    search: PairSearch,
) -> Option<Bridge> {
    if analysis.component_count() < 2 {
        return None;
    }

    let best = match search {
        PairSearch::BruteForce => brute_force_pair(mesh, analysis),
        PairSearch::SweepAndPrune => sweep_and_prune_pair(mesh, analysis),
    }?;

    Some(Bridge {
        from: best.a,
        to: best.b,
        distance: best.distance_squared.sqrt(),
        components: (
            analysis.component_of(best.a).unwrap_or_default(),
            analysis.component_of(best.b).unwrap_or_default(),
        ),
    })
}

/// Measure every pair. O(V²).
fn brute_force_pair(mesh: &PolyMesh, analysis: &ComponentAnalysis) -> Option<Candidate> {
    let vertices = mesh.vertices();
    let mut best = None;

    for (a, va) in mesh.vertex_ids().zip(vertices) {
        let Some(ca) = analysis.component_of(a) else {
            continue;
        };
        for (b, vb) in mesh.vertex_ids().zip(vertices).skip(a as usize + 1) {
            if analysis.component_of(b).is_some_and(|cb| cb != ca) {
                consider(&mut best, Candidate::new(a, b, va.distance_squared(vb)));
            }
        }
    }

    best
}

/// Sweep along X, stopping each inner scan once the X gap alone exceeds the
/// best distance found so far.
///
/// The cut-off is strict, so a pair at exactly the best distance is still
/// measured and the tie-break matches [`brute_force_pair`].
fn sweep_and_prune_pair(mesh: &PolyMesh, analysis: &ComponentAnalysis) -> Option<Candidate> {
    let vertices = mesh.vertices();
    let mut order: Vec<VertexId> = mesh
        .vertex_ids()
        .filter(|&v| analysis.component_of(v).is_some())
        .collect();
    order.sort_unstable_by(|&a, &b| {
        vertices[a as usize]
            .position
            .x
            .total_cmp(&vertices[b as usize].position.x)
            .then(a.cmp(&b))
    });

    let mut best: Option<Candidate> = None;
    let mut measured = 0_usize;

    for (i, &a) in order.iter().enumerate() {
        let va = &vertices[a as usize];
        let ca = analysis.component_of(a);

        for &b in &order[i + 1..] {
            let vb = &vertices[b as usize];
            let dx = vb.position.x - va.position.x;
            if best.is_some_and(|c| dx * dx > c.distance_squared) {
                break;
            }
            if analysis.component_of(b) != ca {
                measured += 1;
                consider(&mut best, Candidate::new(a, b, va.distance_squared(vb)));
            }
        }
    }

    debug!(
        "Sweep measured {} of {} candidate pairs",
        measured,
        order.len() * order.len().saturating_sub(1) / 2
    );

    best
}

/// Join the two closest components with a single edge.
///
/// Returns the bridge inserted, or `None` if the mesh already has at most one
/// component. `analysis` must describe `mesh` as it is now.
///
/// # Errors
///
/// Returns [`RepairError::BridgeRejected`] if the mesh refuses the edge,
/// which only happens when `analysis` is stale.
///
/// # Example
///
/// ```
/// use mesh_topology::{unit_cube, Vertex};
/// use mesh_mend::{bridge_components, find_connected_components, BridgeParams};
///
/// let mut mesh = unit_cube();
/// let lone = mesh.add_vertex(Vertex::from_coords(0.0, 0.0, -2.0));
///
/// let analysis = find_connected_components(&mesh);
/// let bridge = bridge_components(&mut mesh, &analysis, &BridgeParams::default())
///     .unwrap()
///     .unwrap();
///
/// assert_eq!((bridge.from, bridge.to), (0, lone));
/// assert_eq!(mesh.edge_face_count(0, lone), Some(0));
/// ```
pub fn bridge_components(
    mesh: &mut PolyMesh,
    analysis: &ComponentAnalysis,
    params: &BridgeParams,
) -> RepairResult<Option<Bridge>> {
    let Some(bridge) = find_bridge_pair(mesh, analysis, params.search) else {
        return Ok(None);
    };

    mesh.add_edge(bridge.from, bridge.to)
        .map_err(|source| RepairError::BridgeRejected {
            from: bridge.from,
            to: bridge.to,
            source,
        })?;

    info!(
        "Bridged components {} and {} with edge {} (distance {:.6})",
        bridge.components.0,
        bridge.components.1,
        bridge.edge(),
        bridge.distance
    );

    Ok(Some(bridge))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::find_connected_components;
    use mesh_topology::{Vector3, Vertex, unit_cube};

    fn two_cubes(gap: f64) -> PolyMesh {
        let mut mesh = unit_cube();
        let mut other = unit_cube();
        other.translate(Vector3::new(1.0 + gap, 0.0, 0.0));
        mesh.merge(&other);
        mesh
    }

    fn both(mesh: &PolyMesh) -> (Option<Bridge>, Option<Bridge>) {
        let analysis = find_connected_components(mesh);
        (
            find_bridge_pair(mesh, &analysis, PairSearch::BruteForce),
            find_bridge_pair(mesh, &analysis, PairSearch::SweepAndPrune),
        )
    }

    #[test]
    fn single_component_needs_no_bridge() {
        let mut mesh = unit_cube();
        let analysis = find_connected_components(&mesh);
        assert!(find_bridge_pair(&mesh, &analysis, PairSearch::BruteForce).is_none());
        let bridged = bridge_components(&mut mesh, &analysis, &BridgeParams::default()).unwrap();
        assert!(bridged.is_none());
        assert_eq!(mesh.edge_count(), 18);
    }

    #[test]
    fn ties_go_to_smallest_id_sum() {
        // Facing sides 1-2-6-5 and 8-11-15-12 are all at distance 1
        let (brute, sweep) = both(&two_cubes(1.0));
        let brute = brute.unwrap();
        assert_eq!((brute.from, brute.to), (1, 8));
        assert_eq!(brute.components, (0, 1));
        assert_eq!(sweep, Some(brute));
    }

    #[test]
    fn singleton_component_is_bridged() {
        let mut mesh = unit_cube();
        let lone = mesh.add_vertex(Vertex::from_coords(1.5, 1.5, 1.5));
        let analysis = find_connected_components(&mesh);

        let bridge = bridge_components(&mut mesh, &analysis, &BridgeParams::default())
            .unwrap()
            .unwrap();
        assert_eq!((bridge.from, bridge.to), (6, lone));
        assert!(mesh.edge(6, lone).is_some_and(|e| e.is_explicit()));
        assert_eq!(find_connected_components(&mesh).component_count(), 1);
    }

    #[test]
    fn one_bridge_merges_exactly_two_of_three() {
        let mut mesh = two_cubes(1.0);
        mesh.add_vertex(Vertex::from_coords(-10.0, 0.0, 0.0));
        let analysis = find_connected_components(&mesh);
        assert_eq!(analysis.component_count(), 3);

        bridge_components(&mut mesh, &analysis, &BridgeParams::default()).unwrap();
        assert_eq!(find_connected_components(&mesh).component_count(), 2);
    }

    #[test]
    fn searches_agree_on_shuffled_points() {
        // Points on an integer grid produce many equal distances
        let mut mesh = PolyMesh::new();
        let coords = [
            (3, 1, 0),
            (0, 0, 0),
            (2, 2, 0),
            (1, 0, 0),
            (3, 3, 1),
            (0, 2, 0),
            (1, 3, 1),
            (2, 0, 1),
        ];
        for (x, y, z) in coords {
            mesh.add_vertex(Vertex::from_coords(f64::from(x), f64::from(y), f64::from(z)));
        }
        mesh.add_face(&[0, 2, 4]).unwrap();
        mesh.add_face(&[1, 3, 5]).unwrap();
        mesh.add_edge(6, 7).unwrap();

        let (brute, sweep) = both(&mesh);
        assert!(brute.is_some());
        assert_eq!(brute, sweep);
    }

    #[test]
    fn nan_positions_never_win() {
        let mut mesh = unit_cube();
        mesh.add_vertex(Vertex::from_coords(f64::NAN, 0.0, 0.0));
        let far = mesh.add_vertex(Vertex::from_coords(5.0, 0.0, 0.0));

        let (brute, sweep) = both(&mesh);
        let brute = brute.unwrap();
        assert!(brute.to == far || brute.from == far);
        assert!(brute.distance.is_finite());
        assert_eq!(sweep.map(|b| b.edge()), Some(brute.edge()));
    }

    #[test]
    fn candidate_order() {
        let near = Candidate::new(4, 2, 1.0);
        let far = Candidate::new(0, 1, 2.0);
        assert_eq!(near.order(&far), Ordering::Less);

        let low_sum = Candidate::new(0, 5, 1.0);
        let high_sum = Candidate::new(2, 4, 1.0);
        assert_eq!(low_sum.order(&high_sum), Ordering::Less);

        let low_first = Candidate::new(1, 4, 1.0);
        let high_first = Candidate::new(2, 3, 1.0);
        assert_eq!(low_first.order(&high_first), Ordering::Less);
        assert_eq!(Candidate::new(9, 3, f64::NAN).distance_squared, f64::INFINITY);
    }
}
