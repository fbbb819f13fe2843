//! Indexed polygon mesh with explicit edge and adjacency tables.

use hashbrown::{HashMap, HashSet};
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::element::{Edge, EdgeKey, Face, FaceId, VertexId};
use crate::error::{MeshError, MeshResult};
use crate::vertex::Vertex;

/// An indexed polygon mesh.
///
/// Vertices, edges and faces live in flat tables and refer to each other by
/// identifier only. Two derived tables are kept in sync by every structural
/// mutation:
///
/// - edge table: `EdgeKey -> Edge`, each edge listing its adjacent faces
/// - vertex adjacency: for every vertex, the set of incident edge keys
///
/// Faces are never renumbered. Removing a face leaves a hole in the face
/// identifier space so that identifiers held by callers stay valid.
///
/// # Example
///
/// ```
/// use mesh_topology::{PolyMesh, Vertex};
///
/// let mut mesh = PolyMesh::new();
/// let a = mesh.add_vertex(Vertex::from_coords(0.0, 0.0, 0.0));
/// let b = mesh.add_vertex(Vertex::from_coords(1.0, 0.0, 0.0));
/// let c = mesh.add_vertex(Vertex::from_coords(0.0, 1.0, 0.0));
///
/// let face = mesh.add_face(&[a, b, c]).unwrap();
///
/// assert_eq!(mesh.edge_count(), 3);
/// assert_eq!(mesh.edge_face_count(a, b), Some(1));
/// assert_eq!(mesh.neighbors(a), vec![b, c]);
/// assert_eq!(mesh.face(face).map(|f| f.len()), Some(3));
/// ```
///
/// # Serialization
///
/// With the `serde` feature, a mesh serializes as its vertices, face loops
/// (`null` for removed identifiers) and explicit edges. The adjacency tables
/// are rebuilt on load, so a deserialized mesh has been validated exactly as
/// if it were built through [`add_face`](Self::add_face) and
/// [`add_edge`](Self::add_edge).
#[derive(Debug, Clone, Default)]
pub struct PolyMesh {
    vertices: Vec<Vertex>,
    faces: Vec<Option<Face>>,
    edges: HashMap<EdgeKey, Edge>,
    vertex_edges: Vec<HashSet<EdgeKey>>,
    live_faces: usize,
}

impl PolyMesh {
    /// Create an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh with room for the given number of vertices and faces.
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            edges: HashMap::with_capacity(face_count * 3 / 2),
            vertex_edges: Vec::with_capacity(vertex_count),
            live_faces: 0,
        }
    }

    /// Build a mesh from vertices and face loops.
    ///
    /// # Errors
    ///
    /// Returns the error of the first loop that [`add_face`](Self::add_face)
    /// rejects.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_topology::{PolyMesh, Vertex};
    ///
    /// let vertices = vec![
    ///     Vertex::from_coords(0.0, 0.0, 0.0),
    ///     Vertex::from_coords(1.0, 0.0, 0.0),
    ///     Vertex::from_coords(1.0, 1.0, 0.0),
    ///     Vertex::from_coords(0.0, 1.0, 0.0),
    /// ];
    /// let mesh = PolyMesh::from_polygons(vertices, [vec![0_u32, 1, 2, 3]]).unwrap();
    ///
    /// assert_eq!(mesh.face_count(), 1);
    /// assert_eq!(mesh.edge_count(), 4);
    /// ```
    pub fn from_polygons<I>(vertices: Vec<Vertex>, loops: I) -> MeshResult<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<[VertexId]>,
    {
        let mut mesh = Self::with_capacity(vertices.len(), 0);
        for vertex in vertices {
            mesh.add_vertex(vertex);
        }
        for corners in loops {
            mesh.add_face(corners.as_ref())?;
        }
        Ok(mesh)
    }

    /// Build a mesh from vertices and triangle index triplets.
    ///
    /// # Errors
    ///
    /// Same as [`from_polygons`](Self::from_polygons).
    pub fn from_triangles(vertices: Vec<Vertex>, triangles: &[[VertexId; 3]]) -> MeshResult<Self> {
        Self::from_polygons(vertices, triangles)
    }

    /// Append a vertex and return its identifier.
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: identifiers are u32, meshes beyond 4B vertices are unsupported
    pub fn add_vertex(&mut self, vertex: impl Into<Vertex>) -> VertexId {
        let id = self.vertices.len() as VertexId;
        self.vertices.push(vertex.into());
        self.vertex_edges.push(HashSet::new());
        id
    }

    /// Add a face given its corners in winding order.
    ///
    /// Each edge of the loop is created if missing; an existing edge gains the
    /// new face in its adjacency list instead of being duplicated.
    ///
    /// # Errors
    ///
    /// - [`MeshError::InvalidVertex`] if a corner does not exist
    /// - [`MeshError::DegenerateFace`] if the loop has fewer than three distinct vertices
    /// - [`MeshError::SelfLoop`] if two consecutive corners are the same vertex
    /// - [`MeshError::DegenerateFace`] if any other corner repeats, as in `[0, 1, 0, 2]`
    ///
    /// The mesh is unchanged when an error is returned.
    pub fn add_face(&mut self, corners: &[VertexId]) -> MeshResult<FaceId> {
        self.validate_loop(corners)?;
        Ok(self.insert_face(corners.to_vec()))
    }

    /// Remove a face and return it.
    ///
    /// Edges left without faces are dropped, except those inserted through
    /// [`add_edge`](Self::add_edge).
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::FaceNotFound`] if `id` is not a live face.
    pub fn remove_face(&mut self, id: FaceId) -> MeshResult<Face> {
        let face = self
            .faces
            .get_mut(id as usize)
            .and_then(Option::take)
            .ok_or(MeshError::FaceNotFound { face: id })?;
        self.live_faces -= 1;

        for (a, b) in face.directed_edges() {
            let key = EdgeKey::new(a, b);
            let orphaned = self.edges.get_mut(&key).is_some_and(|edge| {
                if let Some(pos) = edge.faces.iter().position(|&f| f == id) {
                    edge.faces.remove(pos);
                }
                edge.faces.is_empty() && !edge.explicit
            });
            if orphaned {
                self.detach_edge(key);
            }
        }

        Ok(face)
    }

    /// Insert an edge between two existing vertices.
    ///
    /// Idempotent: if the edge exists it is only marked explicit, so it
    /// survives the removal of its faces. A newly created edge has no
    /// adjacent face.
    ///
    /// # Errors
    ///
    /// - [`MeshError::InvalidVertex`] if either endpoint does not exist
    /// - [`MeshError::SelfLoop`] if `v0 == v1`
    pub fn add_edge(&mut self, v0: VertexId, v1: VertexId) -> MeshResult<EdgeKey> {
        self.check_vertex(v0)?;
        self.check_vertex(v1)?;
        if v0 == v1 {
            return Err(MeshError::SelfLoop { vertex: v0 });
        }

        let key = EdgeKey::new(v0, v1);
        self.attach_edge(key, None).explicit = true;
        Ok(key)
    }

    /// Vertices sharing an edge with `v`, ascending.
    ///
    /// Returns an empty list for an isolated or unknown vertex.
    #[must_use]
    pub fn neighbors(&self, v: VertexId) -> Vec<VertexId> {
        let mut out: Vec<VertexId> = self
            .incident_edges(v)
            .filter_map(|key| key.other(v))
            .collect();
        out.sort_unstable();
        out
    }

    /// Edges touching `v`, in no particular order.
    pub fn incident_edges(&self, v: VertexId) -> impl Iterator<Item = EdgeKey> + '_ {
        self.vertex_edges.get(v as usize).into_iter().flatten().copied()
    }

    /// Number of edges touching `v`.
    #[must_use]
    pub fn degree(&self, v: VertexId) -> usize {
        self.vertex_edges.get(v as usize).map_or(0, HashSet::len)
    }

    /// Look up the edge between two vertices, in either order.
    #[must_use]
    pub fn edge(&self, v0: VertexId, v1: VertexId) -> Option<&Edge> {
        self.edges.get(&EdgeKey::new(v0, v1))
    }

    /// Look up an edge by key.
    #[must_use]
    pub fn edge_by_key(&self, key: EdgeKey) -> Option<&Edge> {
        self.edges.get(&key)
    }

    /// Whether an edge joins the two vertices.
    #[must_use]
    pub fn contains_edge(&self, v0: VertexId, v1: VertexId) -> bool {
        self.edges.contains_key(&EdgeKey::new(v0, v1))
    }

    /// Number of faces adjacent to the edge, or `None` if there is no such edge.
    #[must_use]
    pub fn edge_face_count(&self, v0: VertexId, v1: VertexId) -> Option<usize> {
        self.edge(v0, v1).map(Edge::face_count)
    }

    /// All edges, in no particular order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// All edges sorted by key.
    #[must_use]
    pub fn sorted_edges(&self) -> Vec<&Edge> {
        let mut edges: Vec<&Edge> = self.edges.values().collect();
        edges.sort_unstable_by_key(|edge| edge.key);
        edges
    }

    /// Live faces with their identifiers, ascending.
    #[allow(clippy::cast_possible_truncation)]
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.faces
            .iter()
            .enumerate()
            .filter_map(|(idx, face)| face.as_ref().map(|f| (idx as FaceId, f)))
    }

    /// Look up a live face.
    #[must_use]
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id as usize).and_then(Option::as_ref)
    }

    /// Look up a vertex.
    #[must_use]
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id as usize)
    }

    /// Position of a vertex.
    #[must_use]
    pub fn position(&self, id: VertexId) -> Option<Point3<f64>> {
        self.vertex(id).map(|v| v.position)
    }

    /// The vertex table, indexed by identifier.
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// All vertex identifiers, ascending.
    #[allow(clippy::cast_possible_truncation)]
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + use<> {
        0..self.vertices.len() as VertexId
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of live faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.live_faces
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the mesh has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Translate every vertex by `offset`.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for vertex in &mut self.vertices {
            vertex.translate(&offset);
        }
    }

    /// Append another mesh.
    ///
    /// Vertex identifiers of `other` are shifted by this mesh's vertex count.
    /// Faces of `other` are re-added in order and so receive fresh identifiers;
    /// its explicit edges are carried over.
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: identifiers are u32, meshes beyond 4B vertices are unsupported
    pub fn merge(&mut self, other: &Self) {
        let offset = self.vertices.len() as VertexId;

        self.vertices.reserve(other.vertices.len());
        for vertex in &other.vertices {
            self.add_vertex(*vertex);
        }

        for (_, face) in other.faces() {
            self.insert_face(face.vertices.iter().map(|&v| v + offset).collect());
        }

        for edge in other.edges.values().filter(|edge| edge.explicit) {
            let key = EdgeKey::new(edge.key.low() + offset, edge.key.high() + offset);
            self.attach_edge(key, None).explicit = true;
        }
    }

    /// Verify that the face, edge and vertex-adjacency tables agree.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InconsistentAdjacency`] describing the first
    /// mismatch found.
    pub fn check_invariants(&self) -> MeshResult<()> {
        let fail = |details: String| Err(MeshError::InconsistentAdjacency { details });

        if self.vertex_edges.len() != self.vertices.len() {
            return fail(format!(
                "{} adjacency sets for {} vertices",
                self.vertex_edges.len(),
                self.vertices.len()
            ));
        }
        if self.faces().count() != self.live_faces {
            return fail(format!("live face counter is {}", self.live_faces));
        }

        for (id, face) in self.faces() {
            for (a, b) in face.directed_edges() {
                let key = EdgeKey::new(a, b);
                let Some(edge) = self.edges.get(&key) else {
                    return fail(format!("face {id} uses missing edge {key}"));
                };
                let listed = edge.faces.iter().filter(|&&f| f == id).count();
                let used = face
                    .directed_edges()
                    .filter(|&(x, y)| EdgeKey::new(x, y) == key)
                    .count();
                if listed != used {
                    return fail(format!(
                        "edge {key} lists face {id} {listed} times, face uses it {used} times"
                    ));
                }
            }
        }

        for (key, edge) in &self.edges {
            if edge.key != *key {
                return fail(format!("edge stored under {key} carries key {}", edge.key));
            }
            if key.high() as usize >= self.vertices.len() {
                return fail(format!("edge {key} references a missing vertex"));
            }
            if edge.faces.is_empty() && !edge.explicit {
                return fail(format!("implicit edge {key} has no faces"));
            }
            for &f in &edge.faces {
                match self.face(f) {
                    Some(face) if face.directed_edges().any(|(a, b)| EdgeKey::new(a, b) == *key) => {}
                    _ => return fail(format!("edge {key} lists face {f} which does not bound it")),
                }
            }
            for v in [key.low(), key.high()] {
                if !self.vertex_edges[v as usize].contains(key) {
                    return fail(format!("vertex {v} does not list incident edge {key}"));
                }
            }
        }

        for (v, keys) in self.vertex_edges.iter().enumerate() {
            for key in keys {
                if !key.contains(v as VertexId) || !self.edges.contains_key(key) {
                    return fail(format!("vertex {v} lists foreign or missing edge {key}"));
                }
            }
        }

        Ok(())
    }

    fn check_vertex(&self, v: VertexId) -> MeshResult<()> {
        if (v as usize) < self.vertices.len() {
            Ok(())
        } else {
            Err(MeshError::InvalidVertex {
                index: v,
                vertex_count: self.vertices.len(),
            })
        }
    }

    fn validate_loop(&self, corners: &[VertexId]) -> MeshResult<()> {
        for &v in corners {
            self.check_vertex(v)?;
        }

        let distinct = corners.iter().collect::<HashSet<_>>().len();
        if distinct < 3 {
            return Err(MeshError::DegenerateFace {
                len: corners.len(),
                distinct,
            });
        }

        let n = corners.len();
        if let Some(i) = (0..n).find(|&i| corners[i] == corners[(i + 1) % n]) {
            return Err(MeshError::SelfLoop { vertex: corners[i] });
        }

        // A revisited corner would walk some edge twice
        if distinct != n {
            return Err(MeshError::DegenerateFace { len: n, distinct });
        }

        Ok(())
    }

    /// Insert a loop that is already known to be valid.
    #[allow(clippy::cast_possible_truncation)]
    fn insert_face(&mut self, vertices: Vec<VertexId>) -> FaceId {
        let id = self.faces.len() as FaceId;
        let n = vertices.len();
        for i in 0..n {
            let key = EdgeKey::new(vertices[i], vertices[(i + 1) % n]);
            self.attach_edge(key, Some(id));
        }
        self.faces.push(Some(Face { vertices }));
        self.live_faces += 1;
        id
    }

    fn attach_edge(&mut self, key: EdgeKey, face: Option<FaceId>) -> &mut Edge {
        if !self.edges.contains_key(&key) {
            self.vertex_edges[key.low() as usize].insert(key);
            self.vertex_edges[key.high() as usize].insert(key);
        }
        let edge = self.edges.entry(key).or_insert_with(|| Edge::new(key));
        if let Some(face) = face {
            edge.faces.push(face);
        }
        edge
    }

    fn detach_edge(&mut self, key: EdgeKey) {
        self.edges.remove(&key);
        self.vertex_edges[key.low() as usize].remove(&key);
        self.vertex_edges[key.high() as usize].remove(&key);
    }
}

/// Plain data form of a [`PolyMesh`], without derived tables.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct MeshData {
    vertices: Vec<Vertex>,
    faces: Vec<Option<Vec<VertexId>>>,
    explicit_edges: Vec<EdgeKey>,
}

#[cfg(feature = "serde")]
impl MeshData {
    fn new(mesh: &PolyMesh) -> Self {
        let mut explicit_edges: Vec<EdgeKey> = mesh
            .edges
            .values()
            .filter(|edge| edge.explicit)
            .map(|edge| edge.key)
            .collect();
        explicit_edges.sort_unstable();

        Self {
            vertices: mesh.vertices.clone(),
            faces: mesh
                .faces
                .iter()
                .map(|face| face.as_ref().map(|f| f.vertices.clone()))
                .collect(),
            explicit_edges,
        }
    }
}

#[cfg(feature = "serde")]
impl PolyMesh {
    fn from_data(data: MeshData) -> MeshResult<Self> {
        let mut mesh = Self::with_capacity(data.vertices.len(), data.faces.len());
        for vertex in data.vertices {
            mesh.add_vertex(vertex);
        }
        for face in data.faces {
            match face {
                Some(corners) => {
                    mesh.add_face(&corners)?;
                }
                // Keeps later face identifiers stable
                None => mesh.faces.push(None),
            }
        }
        for key in data.explicit_edges {
            mesh.add_edge(key.low(), key.high())?;
        }
        Ok(mesh)
    }
}

#[cfg(feature = "serde")]
impl Serialize for PolyMesh {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        MeshData::new(self).serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for PolyMesh {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let data = MeshData::deserialize(deserializer)?;
        Self::from_data(data).map_err(serde::de::Error::custom)
    }
}

/// Corner positions of the unit cube from (0,0,0) to (1,1,1).
const CUBE_CORNERS: [[f64; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

/// Create a closed unit cube of 12 triangles.
///
/// Vertices 0-3 are the bottom (z=0), 4-7 the top (z=1). Faces come in
/// pairs, one pair per side, in the order bottom, top, front, back, left,
/// right, with CCW winding seen from outside.
///
/// # Example
///
/// ```
/// use mesh_topology::unit_cube;
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert_eq!(cube.face_count(), 12);
/// assert_eq!(cube.edge_count(), 18);
/// ```
#[must_use]
pub fn unit_cube() -> PolyMesh {
    let mut mesh = PolyMesh::with_capacity(8, 12);
    for corner in CUBE_CORNERS {
        mesh.add_vertex(corner);
    }

    // Bottom (z=0), top (z=1)
    mesh.insert_face(vec![0, 2, 1]);
    mesh.insert_face(vec![0, 3, 2]);
    mesh.insert_face(vec![4, 5, 6]);
    mesh.insert_face(vec![4, 6, 7]);

    // Front (y=0), back (y=1)
    mesh.insert_face(vec![0, 1, 5]);
    mesh.insert_face(vec![0, 5, 4]);
    mesh.insert_face(vec![3, 7, 6]);
    mesh.insert_face(vec![3, 6, 2]);

    // Left (x=0), right (x=1)
    mesh.insert_face(vec![0, 4, 7]);
    mesh.insert_face(vec![0, 7, 3]);
    mesh.insert_face(vec![1, 2, 6]);
    mesh.insert_face(vec![1, 6, 5]);

    mesh
}

/// Create a closed unit cube of 6 quads, same vertex layout as [`unit_cube`].
///
/// Face order: bottom, top, front, back, left, right.
#[must_use]
pub fn unit_cube_quads() -> PolyMesh {
    let mut mesh = PolyMesh::with_capacity(8, 6);
    for corner in CUBE_CORNERS {
        mesh.add_vertex(corner);
    }

    mesh.insert_face(vec![0, 3, 2, 1]);
    mesh.insert_face(vec![4, 5, 6, 7]);
    mesh.insert_face(vec![0, 1, 5, 4]);
    mesh.insert_face(vec![3, 7, 6, 2]);
    mesh.insert_face(vec![0, 4, 7, 3]);
    mesh.insert_face(vec![1, 2, 6, 5]);

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> PolyMesh {
        let vertices = vec![
            Vertex::from_coords(0.0, 0.0, 0.0),
            Vertex::from_coords(1.0, 0.0, 0.0),
            Vertex::from_coords(0.0, 1.0, 0.0),
        ];
        PolyMesh::from_triangles(vertices, &[[0, 1, 2]]).unwrap()
    }

    #[test]
    fn cube_edges_are_shared_by_two_faces() {
        let cube = unit_cube();
        assert_eq!(cube.edge_count(), 18);
        assert!(cube.edges().all(|e| e.face_count() == 2));
        cube.check_invariants().unwrap();

        let quads = unit_cube_quads();
        assert_eq!(quads.edge_count(), 12);
        assert!(quads.edges().all(|e| e.face_count() == 2));
        quads.check_invariants().unwrap();
    }

    #[test]
    fn shared_edge_is_not_duplicated() {
        let mut mesh = triangle();
        let d = mesh.add_vertex(Vertex::from_coords(1.0, 1.0, 0.0));
        mesh.add_face(&[1, d, 2]).unwrap();

        assert_eq!(mesh.edge_count(), 5);
        assert_eq!(mesh.edge_face_count(1, 2), Some(2));
        assert_eq!(mesh.edge_face_count(2, 1), Some(2));
        mesh.check_invariants().unwrap();
    }

    #[test]
    fn degenerate_face_is_rejected() {
        let mut mesh = triangle();
        let before = mesh.clone();

        let err = mesh.add_face(&[0, 1, 0]).unwrap_err();
        assert_eq!(err, MeshError::DegenerateFace { len: 3, distinct: 2 });

        let err = mesh.add_face(&[0, 1]).unwrap_err();
        assert!(matches!(err, MeshError::DegenerateFace { distinct: 2, .. }));

        let err = mesh.add_face(&[]).unwrap_err();
        assert!(matches!(err, MeshError::DegenerateFace { distinct: 0, .. }));

        assert_eq!(mesh.face_count(), before.face_count());
        assert_eq!(mesh.edge_count(), before.edge_count());
    }

    #[test]
    fn repeated_consecutive_corner_is_rejected() {
        let mut mesh = triangle();
        mesh.add_vertex(Vertex::from_coords(1.0, 1.0, 0.0));

        let err = mesh.add_face(&[0, 1, 1, 3]).unwrap_err();
        assert_eq!(err, MeshError::SelfLoop { vertex: 1 });
    }

    #[test]
    fn revisited_corner_is_rejected() {
        let mut mesh = triangle();
        mesh.add_vertex(Vertex::from_coords(1.0, 1.0, 0.0));

        // Walks (0, 1) twice, which would read as an interior edge
        let err = mesh.add_face(&[0, 1, 0, 3]).unwrap_err();
        assert_eq!(err, MeshError::DegenerateFace { len: 4, distinct: 3 });
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.edge_face_count(0, 1), Some(1));
    }

    #[test]
    fn unknown_vertex_is_rejected() {
        let mut mesh = triangle();
        let err = mesh.add_face(&[0, 1, 7]).unwrap_err();
        assert_eq!(
            err,
            MeshError::InvalidVertex {
                index: 7,
                vertex_count: 3
            }
        );
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn remove_face_prunes_orphaned_edges() {
        let mut cube = unit_cube();
        // Bottom pair shares the diagonal (0, 2)
        cube.remove_face(0).unwrap();
        cube.remove_face(1).unwrap();

        assert_eq!(cube.face_count(), 10);
        assert!(!cube.contains_edge(0, 2));
        assert_eq!(cube.edge_count(), 17);
        assert_eq!(cube.edge_face_count(0, 1), Some(1));
        assert!(cube.face(0).is_none());
        cube.check_invariants().unwrap();
    }

    #[test]
    fn remove_missing_face_fails() {
        let mut mesh = triangle();
        mesh.remove_face(0).unwrap();
        assert_eq!(
            mesh.remove_face(0).unwrap_err(),
            MeshError::FaceNotFound { face: 0 }
        );
        assert_eq!(mesh.edge_count(), 0);
    }

    #[test]
    fn explicit_edge_survives_face_removal() {
        let mut mesh = triangle();
        mesh.add_edge(0, 1).unwrap();
        mesh.remove_face(0).unwrap();

        assert!(mesh.contains_edge(0, 1));
        assert_eq!(mesh.edge_face_count(0, 1), Some(0));
        assert!(!mesh.contains_edge(1, 2));
        mesh.check_invariants().unwrap();
    }

    #[test]
    fn add_edge_is_idempotent() {
        let mut mesh = triangle();
        let d = mesh.add_vertex(Vertex::from_coords(5.0, 5.0, 5.0));

        let k1 = mesh.add_edge(2, d).unwrap();
        let k2 = mesh.add_edge(d, 2).unwrap();
        assert_eq!(k1, k2);
        assert_eq!(mesh.edge_count(), 4);
        assert_eq!(mesh.degree(d), 1);
        assert_eq!(mesh.neighbors(d), vec![2]);
        assert_eq!(mesh.neighbors(2), vec![0, 1, d]);

        // Existing face edge keeps its adjacency
        mesh.add_edge(0, 1).unwrap();
        assert_eq!(mesh.edge_face_count(0, 1), Some(1));
        assert_eq!(mesh.edge_count(), 4);
    }

    #[test]
    fn add_edge_rejects_self_loop() {
        let mut mesh = triangle();
        assert_eq!(
            mesh.add_edge(1, 1).unwrap_err(),
            MeshError::SelfLoop { vertex: 1 }
        );
    }

    #[test]
    fn face_added_over_explicit_edge_counts_it() {
        let mut mesh = PolyMesh::new();
        for corner in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            mesh.add_vertex(corner);
        }
        mesh.add_edge(0, 1).unwrap();
        mesh.add_face(&[0, 1, 2]).unwrap();

        assert_eq!(mesh.edge_count(), 3);
        assert_eq!(mesh.edge_face_count(0, 1), Some(1));
        assert!(mesh.edge(0, 1).is_some_and(Edge::is_explicit));
    }

    #[test]
    fn isolated_vertex_has_no_neighbors() {
        let mut mesh = triangle();
        let lone = mesh.add_vertex(Vertex::from_coords(9.0, 9.0, 9.0));
        assert!(mesh.neighbors(lone).is_empty());
        assert_eq!(mesh.degree(lone), 0);
        assert!(mesh.neighbors(99).is_empty());
    }

    #[test]
    fn merge_offsets_identifiers() {
        let mut mesh = unit_cube();
        let mut other = unit_cube();
        other.translate(Vector3::new(3.0, 0.0, 0.0));
        other.add_vertex(Vertex::from_coords(9.0, 0.0, 0.0));
        other.add_edge(7, 8).unwrap();

        mesh.merge(&other);

        assert_eq!(mesh.vertex_count(), 17);
        assert_eq!(mesh.face_count(), 24);
        assert_eq!(mesh.edge_count(), 37);
        assert!(mesh.contains_edge(15, 16));
        assert!(!mesh.contains_edge(7, 8));
        assert_eq!(mesh.position(8), Some(Point3::new(3.0, 0.0, 0.0)));
        mesh.check_invariants().unwrap();
    }

    #[test]
    fn faces_skip_removed_identifiers() {
        let mut cube = unit_cube_quads();
        cube.remove_face(2).unwrap();
        let ids: Vec<FaceId> = cube.faces().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 1, 3, 4, 5]);
    }

    #[test]
    fn sorted_edges_are_ordered() {
        let cube = unit_cube_quads();
        let keys: Vec<EdgeKey> = cube.sorted_edges().iter().map(|e| e.key()).collect();
        let mut expected = keys.clone();
        expected.sort();
        assert_eq!(keys, expected);
        assert_eq!(keys[0], EdgeKey::new(0, 1));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serialization_round_trip_rebuilds_tables() {
        let mut mesh = unit_cube();
        mesh.remove_face(3).unwrap();
        let lone = mesh.add_vertex(Vertex::from_coords(4.0, 0.0, 0.0));
        mesh.add_edge(0, lone).unwrap();

        let json = serde_json::to_string(&mesh).unwrap();
        let restored: PolyMesh = serde_json::from_str(&json).unwrap();

        restored.check_invariants().unwrap();
        assert_eq!(restored.vertex_count(), 9);
        assert_eq!(restored.face_count(), 11);
        assert!(restored.face(3).is_none());
        assert_eq!(restored.face(4), mesh.face(4));
        assert!(restored.edge(0, lone).is_some_and(Edge::is_explicit));

        let edges = |m: &PolyMesh| m.sorted_edges().into_iter().cloned().collect::<Vec<_>>();
        assert_eq!(edges(&restored), edges(&mesh));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialization_rejects_invalid_topology() {
        let load = |faces: Vec<Option<Vec<VertexId>>>, explicit_edges: Vec<EdgeKey>| {
            let data = MeshData {
                vertices: CUBE_CORNERS[..4].iter().map(|&c| Vertex::from(c)).collect(),
                faces,
                explicit_edges,
            };
            let json = serde_json::to_string(&data).unwrap();
            serde_json::from_str::<PolyMesh>(&json)
        };

        assert!(load(vec![Some(vec![0, 1, 2]), None], vec![]).is_ok());
        assert!(load(vec![Some(vec![0, 1, 7])], vec![]).is_err());
        assert!(load(vec![Some(vec![0, 1, 0, 2])], vec![]).is_err());
        assert!(load(vec![], vec![EdgeKey::new(2, 2)]).is_err());
    }
}
