//! Vertex type.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A mesh vertex.
///
/// The vertex identifier is its index in the owning [`PolyMesh`](crate::PolyMesh);
/// it never changes once assigned.
///
/// # Example
///
/// ```
/// use mesh_topology::{Vertex, Point3};
///
/// let v = Vertex::from_coords(1.0, 2.0, 3.0);
/// assert_eq!(v.position, Point3::new(1.0, 2.0, 3.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// Position in 3D space.
    pub position: Point3<f64>,
}

impl Vertex {
    /// Create a vertex at the given position.
    #[inline]
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self { position }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    #[must_use]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Squared Euclidean distance to another vertex.
    #[inline]
    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        (self.position - other.position).norm_squared()
    }

    /// Euclidean distance to another vertex.
    #[inline]
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Move the vertex by `offset`.
    #[inline]
    pub fn translate(&mut self, offset: &Vector3<f64>) {
        self.position += offset;
    }
}

impl From<Point3<f64>> for Vertex {
    fn from(position: Point3<f64>) -> Self {
        Self::new(position)
    }
}

impl From<[f64; 3]> for Vertex {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::from_coords(x, y, z)
    }
}
