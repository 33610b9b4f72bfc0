//! Core data types for 3D convex hull computation

use crate::config::HullConfig;
use crate::geometry::tetrahedron_volume;
use crate::halfedge::{Face, HalfEdgeMesh};
use crate::quickhull::QuickHull;
use crate::{ConvexHullError, MIN_POINTS, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 3D point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Create a point from spherical coordinates (azimuth, elevation in radians, radius)
    pub fn from_spherical(azimuth: f64, elevation: f64, radius: f64) -> Self {
        let x = radius * elevation.cos() * azimuth.cos();
        let y = radius * elevation.cos() * azimuth.sin();
        let z = radius * elevation.sin();
        Self { x, y, z }
    }

    /// Create a point from spherical coordinates in degrees
    pub fn from_spherical_deg(azimuth_deg: f64, elevation_deg: f64, radius: f64) -> Self {
        Self::from_spherical(azimuth_deg.to_radians(), elevation_deg.to_radians(), radius)
    }

    /// Coordinate along `axis` (0 = x, 1 = y, 2 = z)
    #[inline]
    pub fn axis(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Dot product with another point
    #[inline]
    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product with another point
    #[inline]
    pub fn cross(&self, other: &Point) -> Point {
        Point {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    #[inline]
    pub fn sub(&self, other: &Point) -> Point {
        Point {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }

    #[inline]
    pub fn add(&self, other: &Point) -> Point {
        Point {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }

    /// Scale by a scalar
    #[inline]
    pub fn scale(&self, s: f64) -> Point {
        Point {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// Compute the magnitude/length
    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    pub fn magnitude_squared(&self) -> f64 {
        self.dot(self)
    }

    /// Unit vector in the same direction, or `None` for a zero/non-finite vector
    pub fn try_normalize(&self) -> Option<Point> {
        let mag = self.magnitude();
        if mag.is_finite() && mag > 0.0 {
            Some(self.scale(1.0 / mag))
        } else {
            None
        }
    }

    /// Normalize to unit length; zero vectors are returned unchanged
    pub fn normalize(&self) -> Point {
        self.try_normalize().unwrap_or(*self)
    }

    /// Distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        self.sub(other).magnitude()
    }

    pub fn distance_squared(&self, other: &Point) -> f64 {
        self.sub(other).magnitude_squared()
    }
}

impl From<[f64; 3]> for Point {
    fn from(p: [f64; 3]) -> Self {
        Point::new(p[0], p[1], p[2])
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.6})", self.x, self.y, self.z)
    }
}

/// The result of a convex hull computation
///
/// `vertices` always holds the full input, independent of which points ended
/// up on the hull boundary. The mesh only contains visible faces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvexHull3D {
    /// Input points
    vertices: Vec<Point>,
    /// Triangular faces with twin-edge adjacency
    mesh: HalfEdgeMesh,
    /// Visibility tolerance used during construction
    tolerance: f64,
}

impl ConvexHull3D {
    /// Create an empty hull
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(vertices: Vec<Point>, mesh: HalfEdgeMesh, tolerance: f64) -> Self {
        Self {
            vertices,
            mesh,
            tolerance,
        }
    }

    /// Build a convex hull from points using the Quickhull algorithm
    pub fn build(points: &[Point]) -> Result<Self> {
        Self::build_with_config(points, &HullConfig::default())
    }

    /// Build a convex hull with an explicit configuration
    pub fn build_with_config(points: &[Point], config: &HullConfig) -> Result<Self> {
        config.validate()?;
        if points.len() < MIN_POINTS {
            log::error!(
                "ConvexHull3D: at least {} points are required, got {}",
                MIN_POINTS,
                points.len()
            );
            return Err(ConvexHullError::InsufficientVertices {
                found: points.len(),
            });
        }
        Ok(QuickHull::new(points, config).build())
    }

    /// Rebuild this hull in place from `points`.
    ///
    /// On failure the error is logged and the hull is left empty; callers
    /// check [`ConvexHull3D::is_empty`].
    pub fn from_points(&mut self, points: &[Point]) -> &mut Self {
        self.reset();
        if let Ok(hull) = Self::build(points) {
            *self = hull;
        }
        self
    }

    /// Clear faces and vertices so the hull can be reused
    pub fn reset(&mut self) -> &mut Self {
        self.vertices.clear();
        self.mesh = HalfEdgeMesh::default();
        self.tolerance = 0.0;
        self
    }

    /// True when no hull has been built
    pub fn is_empty(&self) -> bool {
        self.mesh.num_faces() == 0
    }

    /// Get the input points
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Get the faces
    pub fn faces(&self) -> &[Face] {
        self.mesh.faces()
    }

    /// Get the half-edge mesh
    pub fn mesh(&self) -> &HalfEdgeMesh {
        &self.mesh
    }

    /// Get the number of faces
    pub fn num_faces(&self) -> usize {
        self.mesh.num_faces()
    }

    /// Get the number of input points
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Tolerance used to decide point-outside-face during construction
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Sorted indices of the input points that lie on the hull boundary
    pub fn hull_vertex_indices(&self) -> Vec<usize> {
        let mut used = vec![false; self.vertices.len()];
        for face in self.faces() {
            for idx in face.indices() {
                used[idx] = true;
            }
        }
        used.iter()
            .enumerate()
            .filter_map(|(i, &u)| u.then_some(i))
            .collect()
    }

    /// Check whether a point lies inside or on the hull
    pub fn contains_point(&self, point: &Point) -> bool {
        !self.is_empty()
            && self
                .faces()
                .iter()
                .all(|face| face.plane().distance_to_point(point) <= self.tolerance)
    }

    /// Compute the volume of the convex hull
    pub fn volume(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }

        // the mean of the face centroids is inside a convex hull, so every
        // face forms a positively oriented tetrahedron with it
        let inner = self
            .faces()
            .iter()
            .fold(Point::default(), |acc, f| acc.add(&f.centroid()))
            .scale(1.0 / self.num_faces() as f64);

        self.faces()
            .iter()
            .map(|face| {
                let [a, b, c] = face.indices();
                tetrahedron_volume(&inner, &self.vertices[a], &self.vertices[b], &self.vertices[c])
            })
            .sum()
    }

    /// Compute the surface area of the convex hull
    pub fn surface_area(&self) -> f64 {
        let mut area = 0.0;

        for face in self.faces() {
            let [a, b, c] = face.indices();
            let e1 = self.vertices[b].sub(&self.vertices[a]);
            let e2 = self.vertices[c].sub(&self.vertices[a]);
            area += e1.cross(&e2).magnitude() / 2.0;
        }

        area
    }

    /// Check the half-edge invariants and that no input point lies outside
    /// any face by more than the tolerance
    pub fn validate(&self) -> Result<()> {
        self.mesh.validate()?;

        let n = self.vertices.len();
        for (id, face) in self.mesh.faces_enumerated() {
            if let Some(i) = face.indices().into_iter().find(|&i| i >= n) {
                return Err(ConvexHullError::InvalidMesh(format!(
                    "{id} uses point {i} but the hull has {n} points"
                )));
            }
        }

        for (id, face) in self.mesh.faces_enumerated() {
            for (i, point) in self.vertices.iter().enumerate() {
                let distance = face.plane().distance_to_point(point);
                if distance > self.tolerance {
                    return Err(ConvexHullError::InvalidMesh(format!(
                        "point {i} lies {distance:e} outside {id}"
                    )));
                }
            }
        }

        Ok(())
    }
}
