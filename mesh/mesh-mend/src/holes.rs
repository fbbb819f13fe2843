//! Hole detection and filling.
//!
//! A hole is a closed loop of boundary edges (edges with exactly one adjacent
//! face). Edges with no face or more than two faces are not part of any loop;
//! the closedness check reports them separately.
//!
//! # Example
//!
//! ```
//! use mesh_topology::unit_cube;
//! use mesh_mend::{detect_boundary_loops, fill_holes, HoleFillParams};
//!
//! // Drop the two top triangles, leaving a square hole
//! let mut mesh = unit_cube();
//! mesh.remove_face(2).unwrap();
//! mesh.remove_face(3).unwrap();
//!
//! let scan = detect_boundary_loops(&mesh);
//! assert_eq!(scan.loops.len(), 1);
//! assert_eq!(scan.loops[0].edge_count(), 4);
//!
//! let outcome = fill_holes(&mut mesh, &HoleFillParams::default());
//! assert_eq!(outcome.loops_filled, 1);
//! assert_eq!(outcome.faces_added, 2);
//! ```

use hashbrown::{HashMap, HashSet};
use mesh_topology::{EdgeKey, FaceId, PolyMesh, VertexId};
use nalgebra::{Point3, Vector3};
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::RepairIssue;
use crate::params::{FillStrategy, HoleFillParams};

/// A boundary loop representing a hole in the mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundaryLoop {
    /// Ordered vertex identifiers; the loop closes from the last back to the first.
    pub vertices: Vec<VertexId>,
}

impl BoundaryLoop {
    /// Number of edges (and vertices) in the loop.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the loop has at least three distinct vertices.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let distinct: HashSet<VertexId> = self.vertices.iter().copied().collect();
        distinct.len() >= 3
    }

    /// Edges of the loop, first vertex to second and so on, closing at the end.
    pub fn edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| EdgeKey::new(self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// Result of tracing the boundary edges of a mesh.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundaryScan {
    /// Simple closed loops, in the order their first edge appears by key.
    pub loops: Vec<BoundaryLoop>,
    /// Boundary chains that do not close, end to end.
    pub fragments: Vec<Vec<VertexId>>,
}

impl BoundaryScan {
    /// No boundary edge at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty() && self.fragments.is_empty()
    }
}

/// What a hole filling pass did.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HoleFillOutcome {
    /// Closed loops found.
    pub loops_detected: usize,
    /// Loops that received a cover.
    pub loops_filled: usize,
    /// Faces inserted across all covers.
    pub faces_added: usize,
    /// Loops and chains left open, with the reason.
    pub issues: Vec<RepairIssue>,
}

/// Trace every boundary edge into simple loops and open fragments.
///
/// The walk is deterministic: it starts from the unused boundary edge with the
/// smallest key and, at each vertex, closes the loop if it can and otherwise
/// continues to the smallest unused neighbour. A walk that passes through the
/// same vertex twice is split there, so every reported loop is simple.
///
/// # Example
///
/// ```
/// use mesh_topology::{PolyMesh, Vertex};
/// use mesh_mend::detect_boundary_loops;
///
/// let mut mesh = PolyMesh::new();
/// for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
///     mesh.add_vertex(Vertex::from(p));
/// }
/// mesh.add_face(&[0, 1, 2]).unwrap();
///
/// // A lone triangle is bounded by a single 3-edge loop
/// let scan = detect_boundary_loops(&mesh);
/// assert_eq!(scan.loops.len(), 1);
/// assert_eq!(scan.loops[0].vertices, vec![0, 1, 2]);
/// ```
#[must_use]
pub fn detect_boundary_loops(mesh: &PolyMesh) -> BoundaryScan {
    let boundary: Vec<EdgeKey> = mesh
        .sorted_edges()
        .into_iter()
        .filter(|edge| edge.is_boundary())
        .map(|edge| edge.key())
        .collect();

    if boundary.is_empty() {
        return BoundaryScan::default();
    }

    debug!("Found {} boundary edges", boundary.len());

    let mut neighbors: HashMap<VertexId, Vec<VertexId>> = HashMap::new();
    for key in &boundary {
        let (a, b) = key.vertices();
        neighbors.entry(a).or_default().push(b);
        neighbors.entry(b).or_default().push(a);
    }
    for list in neighbors.values_mut() {
        list.sort_unstable();
    }

    let mut used: HashSet<EdgeKey> = HashSet::with_capacity(boundary.len());
    let mut scan = BoundaryScan::default();

    for &first in &boundary {
        if used.contains(&first) {
            continue;
        }
        used.insert(first);

        let (start, second) = first.vertices();
        let mut walk = vec![start, second];
        let mut closed = false;

        while let Some(&current) = walk.last() {
            if current == start {
                closed = true;
                break;
            }
            let Some(next) = next_boundary_vertex(&neighbors, &used, current, Some(start)) else {
                break;
            };
            used.insert(EdgeKey::new(current, next));
            walk.push(next);
        }

        if !closed {
            // Dead end; pick up whatever chain continues past the start
            let mut back = Vec::new();
            let mut current = start;
            while let Some(prev) = next_boundary_vertex(&neighbors, &used, current, None) {
                used.insert(EdgeKey::new(current, prev));
                back.push(prev);
                current = prev;
            }
            back.reverse();
            back.extend(walk);
            walk = back;
        }

        let (loops, remainder) = split_walk(&walk);
        scan.loops
            .extend(loops.into_iter().map(|vertices| BoundaryLoop { vertices }));
        if remainder.len() > 1 {
            warn!(
                "Boundary chain {:?} does not close, leaving it open",
                remainder
            );
            scan.fragments.push(remainder);
        }
    }

    info!(
        "Detected {} holes (boundary loops), sizes: {:?}, {} open fragments",
        scan.loops.len(),
        scan.loops.iter().map(BoundaryLoop::edge_count).collect::<Vec<_>>(),
        scan.fragments.len()
    );

    scan
}

/// Pick the next vertex of a boundary walk from `current`.
///
/// Closing back to `close_to` wins; otherwise the smallest neighbour across an
/// unused edge.
fn next_boundary_vertex(
    neighbors: &HashMap<VertexId, Vec<VertexId>>,
    used: &HashSet<EdgeKey>,
    current: VertexId,
    close_to: Option<VertexId>,
) -> Option<VertexId> {
    let candidates = neighbors.get(&current).map_or(&[][..], Vec::as_slice);
    let free = |n: &&VertexId| !used.contains(&EdgeKey::new(current, **n));

    close_to
        .filter(|target| candidates.iter().filter(free).any(|n| n == target))
        .or_else(|| candidates.iter().find(free).copied())
}

/// Split a walk at repeated vertices.
///
/// Returns the simple cycles found, each starting at its repeated vertex, and
/// the part of the walk not consumed by any cycle. A closed walk (first vertex
/// equal to the last) leaves a single-vertex remainder.
fn split_walk(walk: &[VertexId]) -> (Vec<Vec<VertexId>>, Vec<VertexId>) {
    let mut stack: Vec<VertexId> = Vec::with_capacity(walk.len());
    let mut position: HashMap<VertexId, usize> = HashMap::new();
    let mut cycles = Vec::new();

    for &v in walk {
        if let Some(&at) = position.get(&v) {
            let cycle: Vec<VertexId> = stack[at..].to_vec();
            for popped in &stack[at + 1..] {
                position.remove(popped);
            }
            stack.truncate(at + 1);
            cycles.push(cycle);
        } else {
            position.insert(v, stack.len());
            stack.push(v);
        }
    }

    (cycles, stack)
}

/// Fill every boundary loop of the mesh.
///
/// Each loop is oriented against the face next to its first edge, so the
/// cover continues the neighbouring winding. Loops that cannot be filled are
/// reported in [`HoleFillOutcome::issues`] and the rest proceed. Running this
/// on a closed mesh fills nothing and leaves the mesh untouched.
///
/// # Example
///
/// ```
/// use mesh_topology::unit_cube_quads;
/// use mesh_mend::{fill_holes, is_closed, FillStrategy, HoleFillParams};
///
/// let mut mesh = unit_cube_quads();
/// mesh.remove_face(1).unwrap();
///
/// let params = HoleFillParams::default().with_strategy(FillStrategy::Polygon);
/// let outcome = fill_holes(&mut mesh, &params);
/// assert_eq!(outcome.faces_added, 1);
/// assert!(is_closed(&mesh));
/// ```
pub fn fill_holes(mesh: &mut PolyMesh, params: &HoleFillParams) -> HoleFillOutcome {
    let scan = detect_boundary_loops(mesh);

    let mut outcome = HoleFillOutcome {
        loops_detected: scan.loops.len(),
        issues: scan
            .fragments
            .into_iter()
            .map(|vertices| RepairIssue::UnrepairableBoundaryFragment { vertices })
            .collect(),
        ..HoleFillOutcome::default()
    };

    for hole in &scan.loops {
        if let Some(limit) = params.max_hole_edges {
            if hole.edge_count() > limit {
                warn!(
                    "Skipping large hole with {} edges (max: {})",
                    hole.edge_count(),
                    limit
                );
                outcome.issues.push(RepairIssue::HoleTooLarge {
                    edges: hole.edge_count(),
                    limit,
                });
                continue;
            }
        }

        match cover_loop(mesh, hole, params.strategy) {
            Ok(faces) => {
                outcome.loops_filled += 1;
                outcome.faces_added += faces;
            }
            Err(issue) => {
                warn!("{}", issue);
                outcome.issues.push(issue);
            }
        }
    }

    if outcome.loops_filled > 0 {
        info!(
            "Filled {} holes with {} faces ({})",
            outcome.loops_filled,
            outcome.faces_added,
            params.strategy.as_str()
        );
    }

    outcome
}

/// Insert the cover for one loop and return the number of faces added.
///
/// On rejection every face already added for this loop is removed again.
fn cover_loop(
    mesh: &mut PolyMesh,
    hole: &BoundaryLoop,
    strategy: FillStrategy,
) -> Result<usize, RepairIssue> {
    if !hole.is_valid() {
        return Err(RepairIssue::DegenerateLoop {
            vertices: hole.vertices.clone(),
        });
    }

    let ordered = orient_loop(mesh, &hole.vertices);
    let polygons = match strategy {
        FillStrategy::Fan => fan_triangulate(&ordered),
        FillStrategy::EarClipping => ear_clip(mesh, &ordered),
        FillStrategy::Polygon => vec![ordered.clone()],
    };

    let mut added: Vec<FaceId> = Vec::with_capacity(polygons.len());
    for polygon in &polygons {
        match mesh.add_face(polygon) {
            Ok(id) => added.push(id),
            Err(source) => {
                for id in added.into_iter().rev() {
                    // Just inserted, so removal cannot fail
                    let _ = mesh.remove_face(id);
                }
                return Err(RepairIssue::FillRejected {
                    vertices: ordered,
                    source,
                });
            }
        }
    }

    debug!(
        "Filled hole with {} edges using {} faces",
        ordered.len(),
        added.len()
    );

    Ok(added.len())
}

/// Wind the loop opposite to the face bordering its first edge.
///
/// The first vertex stays first. Loops whose first edge has no single face
/// keep their order.
fn orient_loop(mesh: &PolyMesh, vertices: &[VertexId]) -> Vec<VertexId> {
    let (v0, v1) = (vertices[0], vertices[1 % vertices.len()]);
    let neighbour_runs_forward = mesh
        .edge(v0, v1)
        .and_then(|edge| edge.faces().first())
        .and_then(|&face| mesh.face(face))
        .is_some_and(|face| face.has_directed_edge(v0, v1));

    let mut ordered = vertices.to_vec();
    if neighbour_runs_forward {
        ordered[1..].reverse();
    }
    ordered
}

/// Triangle fan from the first vertex. Convexity is not checked.
fn fan_triangulate(vertices: &[VertexId]) -> Vec<Vec<VertexId>> {
    let apex = vertices[0];
    vertices[1..]
        .windows(2)
        .map(|pair| vec![apex, pair[0], pair[1]])
        .collect()
}

/// Ear clipping in the plane of the loop, falling back to a fan over
/// whatever remains once no ear can be found.
///
/// Triangles keep the winding of `vertices`.
#[allow(clippy::cast_precision_loss)]
fn ear_clip(mesh: &PolyMesh, vertices: &[VertexId]) -> Vec<Vec<VertexId>> {
    let n = vertices.len();
    let Some(positions) = vertices
        .iter()
        .map(|&v| mesh.position(v))
        .collect::<Option<Vec<Point3<f64>>>>()
    else {
        return fan_triangulate(vertices);
    };

    let centroid = Point3::from(
        positions
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords)
            / n as f64,
    );
    let hole_normal = compute_hole_normal(&positions, &centroid);

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n.saturating_sub(2));

    while remaining.len() > 3 {
        let m = remaining.len();
        let ear = (0..m).find(|&i| {
            let prev = remaining[(i + m - 1) % m];
            let next = remaining[(i + 1) % m];
            is_ear(&positions, &remaining, prev, remaining[i], next, &hole_normal)
        });

        let Some(i) = ear else {
            warn!(
                "Ear clipping stuck with {} vertices remaining, using fan triangulation",
                m
            );
            break;
        };

        let prev = remaining[(i + m - 1) % m];
        let next = remaining[(i + 1) % m];
        triangles.push(vec![vertices[prev], vertices[remaining[i]], vertices[next]]);
        remaining.remove(i);
    }

    let rest: Vec<VertexId> = remaining.iter().map(|&i| vertices[i]).collect();
    triangles.extend(fan_triangulate(&rest));
    triangles
}

/// Average normal of a loop, from the cross products of consecutive
/// centroid-relative corners.
fn compute_hole_normal(positions: &[Point3<f64>], centroid: &Point3<f64>) -> Vector3<f64> {
    let n = positions.len();
    let normal: Vector3<f64> = (0..n)
        .map(|i| (positions[i] - centroid).cross(&(positions[(i + 1) % n] - centroid)))
        .sum();

    let len = normal.norm();
    if len > f64::EPSILON {
        normal / len
    } else {
        Vector3::z()
    }
}

/// Whether corner `curr` of the remaining polygon can be clipped.
fn is_ear(
    positions: &[Point3<f64>],
    remaining: &[usize],
    prev: usize,
    curr: usize,
    next: usize,
    hole_normal: &Vector3<f64>,
) -> bool {
    let (a, b, c) = (positions[prev], positions[curr], positions[next]);

    let tri_normal = (b - a).cross(&(c - a));
    if tri_normal.norm() <= f64::EPSILON || tri_normal.dot(hole_normal) < 0.0 {
        return false;
    }

    !remaining
        .iter()
        .filter(|&&idx| idx != prev && idx != curr && idx != next)
        .any(|&idx| point_in_triangle_projected(&positions[idx], &a, &b, &c, hole_normal))
}

/// Point-in-triangle test after dropping the axis most aligned with `normal`.
fn point_in_triangle_projected(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    normal: &Vector3<f64>,
) -> bool {
    let abs = normal.abs();
    let project = |q: &Point3<f64>| -> (f64, f64) {
        if abs.z >= abs.x && abs.z >= abs.y {
            (q.x, q.y)
        } else if abs.y >= abs.x {
            (q.x, q.z)
        } else {
            (q.y, q.z)
        }
    };

    let (p, a, b, c) = (project(p), project(a), project(b), project(c));
    let side = |p1: (f64, f64), p2: (f64, f64), p3: (f64, f64)| {
        (p1.0 - p3.0) * (p2.1 - p3.1) - (p2.0 - p3.0) * (p1.1 - p3.1)
    };

    let d1 = side(p, a, b);
    let d2 = side(p, b, c);
    let d3 = side(p, c, a);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}
