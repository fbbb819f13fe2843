//! Connected component analysis.
//!
//! Partitions the vertex set into maximal subsets reachable from each other
//! through edges. Faces play no part: a bridging edge without faces connects
//! just as well as a face edge, and a vertex with no edge forms its own
//! component.

use std::collections::VecDeque;

use mesh_topology::{PolyMesh, VertexId};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A maximal set of mutually reachable vertices, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Component {
    vertices: Vec<VertexId>,
}

impl Component {
    /// Member vertices, ascending.
    #[must_use]
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Number of member vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Components always have at least one member.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Smallest member, which is also the vertex the traversal started from.
    #[must_use]
    pub fn seed(&self) -> Option<VertexId> {
        self.vertices.first().copied()
    }

    /// Whether `v` belongs to this component.
    #[must_use]
    pub fn contains(&self, v: VertexId) -> bool {
        self.vertices.binary_search(&v).is_ok()
    }
}

/// Result of connected component analysis.
///
/// Components are ordered by their smallest vertex, so the result is the same
/// for identical input regardless of hash iteration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentAnalysis {
    components: Vec<Component>,
    labels: Vec<usize>,
}

impl ComponentAnalysis {
    /// Number of components. Zero for an empty mesh.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// All components, ordered by smallest vertex.
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Component at `index`.
    #[must_use]
    pub fn component(&self, index: usize) -> Option<&Component> {
        self.components.get(index)
    }

    /// Index of the component containing `v`.
    #[must_use]
    pub fn component_of(&self, v: VertexId) -> Option<usize> {
        self.labels.get(v as usize).copied()
    }

    /// At most one component.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.components.len() <= 1
    }

    /// Size of the largest component, zero for an empty mesh.
    #[must_use]
    pub fn largest_component_size(&self) -> usize {
        self.components.iter().map(Component::len).max().unwrap_or(0)
    }

    /// Number of single-vertex components, i.e. vertices without any edge.
    #[must_use]
    pub fn isolated_vertex_count(&self) -> usize {
        self.components.iter().filter(|c| c.len() == 1).count()
    }

    /// Number of vertices covered by the analysis.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.labels.len()
    }
}

/// Find the connected components of a mesh.
///
/// Breadth-first traversal seeded from unvisited vertices in ascending order;
/// each vertex is enqueued at most once. Runs in O(V + E).
///
/// # Example
///
/// ```
/// use mesh_topology::{unit_cube, Vector3, Vertex};
/// use mesh_mend::find_connected_components;
///
/// let mut mesh = unit_cube();
/// let mut other = unit_cube();
/// other.translate(Vector3::new(5.0, 0.0, 0.0));
/// mesh.merge(&other);
/// mesh.add_vertex(Vertex::from_coords(0.0, 0.0, 9.0));
///
/// let analysis = find_connected_components(&mesh);
/// assert_eq!(analysis.component_count(), 3);
/// assert_eq!(analysis.components()[1].seed(), Some(8));
/// assert_eq!(analysis.isolated_vertex_count(), 1);
/// ```
#[must_use]
pub fn find_connected_components(mesh: &PolyMesh) -> ComponentAnalysis {
    const UNVISITED: usize = usize::MAX;

    let mut labels = vec![UNVISITED; mesh.vertex_count()];
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for seed in mesh.vertex_ids() {
        if labels[seed as usize] != UNVISITED {
            continue;
        }

        let label = components.len();
        labels[seed as usize] = label;
        queue.push_back(seed);
        let mut members = vec![seed];

        while let Some(current) = queue.pop_front() {
            for neighbor in mesh.incident_edges(current).filter_map(|key| key.other(current)) {
                let slot = &mut labels[neighbor as usize];
                if *slot == UNVISITED {
                    *slot = label;
                    members.push(neighbor);
                    queue.push_back(neighbor);
                }
            }
        }

        members.sort_unstable();
        components.push(Component { vertices: members });
    }

    debug!(
        "Found {} connected components over {} vertices",
        components.len(),
        labels.len()
    );

    ComponentAnalysis { components, labels }
}

/// Whether every vertex is reachable from every other.
#[must_use]
pub fn is_connected(mesh: &PolyMesh) -> bool {
    find_connected_components(mesh).is_connected()
}
