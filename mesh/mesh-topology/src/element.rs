//! Edge and face records stored by [`PolyMesh`](crate::PolyMesh).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable vertex identifier (index into the vertex table).
pub type VertexId = u32;

/// Stable face identifier. Removed faces leave their identifier unused.
pub type FaceId = u32;

/// Unordered vertex pair identifying an edge. The smaller id is always first.
///
/// # Example
///
/// ```
/// use mesh_topology::EdgeKey;
///
/// assert_eq!(EdgeKey::new(5, 2), EdgeKey::new(2, 5));
/// assert_eq!(EdgeKey::new(5, 2).low(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(from = "[VertexId; 2]", into = "[VertexId; 2]")
)]
pub struct EdgeKey {
    low: VertexId,
    high: VertexId,
}

impl EdgeKey {
    /// Build the key for the edge between `v0` and `v1`, in either order.
    #[inline]
    #[must_use]
    pub const fn new(v0: VertexId, v1: VertexId) -> Self {
        if v0 <= v1 {
            Self { low: v0, high: v1 }
        } else {
            Self { low: v1, high: v0 }
        }
    }

    /// Smaller endpoint.
    #[inline]
    #[must_use]
    pub const fn low(&self) -> VertexId {
        self.low
    }

    /// Larger endpoint.
    #[inline]
    #[must_use]
    pub const fn high(&self) -> VertexId {
        self.high
    }

    /// Both endpoints, smaller first.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> (VertexId, VertexId) {
        (self.low, self.high)
    }

    /// Whether `v` is an endpoint.
    #[inline]
    #[must_use]
    pub const fn contains(&self, v: VertexId) -> bool {
        self.low == v || self.high == v
    }

    /// The endpoint opposite `v`, or `None` if `v` is not on this edge.
    #[inline]
    #[must_use]
    pub const fn other(&self, v: VertexId) -> Option<VertexId> {
        if v == self.low {
            Some(self.high)
        } else if v == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

impl From<[VertexId; 2]> for EdgeKey {
    fn from([v0, v1]: [VertexId; 2]) -> Self {
        Self::new(v0, v1)
    }
}

impl From<EdgeKey> for [VertexId; 2] {
    fn from(key: EdgeKey) -> Self {
        [key.low, key.high]
    }
}

impl std::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.low, self.high)
    }
}

/// An edge together with the faces bounded by it.
///
/// A manifold interior edge has exactly two adjacent faces, a boundary edge
/// has one. Edges with no faces exist only when inserted explicitly (for
/// example a bridge between two components).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    pub(crate) key: EdgeKey,
    pub(crate) faces: Vec<FaceId>,
    pub(crate) explicit: bool,
}

impl Edge {
    pub(crate) const fn new(key: EdgeKey) -> Self {
        Self {
            key,
            faces: Vec::new(),
            explicit: false,
        }
    }

    /// The vertex pair of this edge.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> EdgeKey {
        self.key
    }

    /// Faces bounded by this edge, in insertion order.
    #[inline]
    #[must_use]
    pub fn faces(&self) -> &[FaceId] {
        &self.faces
    }

    /// Number of adjacent faces.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Exactly one adjacent face.
    #[inline]
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        self.faces.len() == 1
    }

    /// No adjacent face.
    #[inline]
    #[must_use]
    pub fn is_dangling(&self) -> bool {
        self.faces.is_empty()
    }

    /// More than two adjacent faces.
    #[inline]
    #[must_use]
    pub fn is_non_manifold(&self) -> bool {
        self.faces.len() > 2
    }

    /// Whether the edge was inserted through [`PolyMesh::add_edge`](crate::PolyMesh::add_edge).
    ///
    /// Explicit edges survive the removal of all their faces.
    #[inline]
    #[must_use]
    pub const fn is_explicit(&self) -> bool {
        self.explicit
    }
}

/// A polygonal face: a cyclic loop of at least three vertices, none repeated.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Face {
    pub(crate) vertices: Vec<VertexId>,
}

impl Face {
    /// Corners in winding order.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Number of corners.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Faces always have corners; provided for API symmetry with `len`.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Whether the face is a triangle.
    #[inline]
    #[must_use]
    pub fn is_triangle(&self) -> bool {
        self.vertices.len() == 3
    }

    /// Directed edges `(from, to)` following the winding, closing back to the first corner.
    pub fn directed_edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Whether the winding walks from `from` straight to `to`.
    #[must_use]
    pub fn has_directed_edge(&self, from: VertexId, to: VertexId) -> bool {
        self.directed_edges().any(|(a, b)| a == from && b == to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_key_is_unordered() {
        let k = EdgeKey::new(7, 3);
        assert_eq!(k.vertices(), (3, 7));
        assert_eq!(k, EdgeKey::new(3, 7));
        assert_eq!(k.other(3), Some(7));
        assert_eq!(k.other(7), Some(3));
        assert_eq!(k.other(4), None);
        assert!(k.contains(7));
        assert_eq!(k.to_string(), "(3, 7)");
    }

    #[test]
    fn edge_keys_sort_lexicographically() {
        let mut keys = vec![EdgeKey::new(2, 1), EdgeKey::new(0, 5), EdgeKey::new(1, 0)];
        keys.sort();
        assert_eq!(
            keys,
            vec![EdgeKey::new(0, 1), EdgeKey::new(0, 5), EdgeKey::new(1, 2)]
        );
    }

    #[test]
    fn face_directed_edges_wrap_around() {
        let face = Face {
            vertices: vec![4, 5, 6, 7],
        };
        let edges: Vec<_> = face.directed_edges().collect();
        assert_eq!(edges, vec![(4, 5), (5, 6), (6, 7), (7, 4)]);
        assert!(face.has_directed_edge(7, 4));
        assert!(!face.has_directed_edge(4, 7));
        assert!(!face.is_triangle());
    }

    #[test]
    fn edge_classification() {
        let mut edge = Edge::new(EdgeKey::new(0, 1));
        assert!(edge.is_dangling());
        edge.faces.push(0);
        assert!(edge.is_boundary());
        edge.faces.extend([1, 2]);
        assert!(edge.is_non_manifold());
        assert_eq!(edge.face_count(), 3);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn edge_key_serializes_as_sorted_pair() {
        assert_eq!(serde_json::to_string(&EdgeKey::new(5, 2)).unwrap(), "[2,5]");
        let key: EdgeKey = serde_json::from_str("[9,4]").unwrap();
        assert_eq!(key, EdgeKey::new(4, 9));
        assert_eq!(key.low(), 4);
    }
}
