//! Half-edge mesh of triangular faces
//!
//! Faces and half-edges live in flat `Vec`s and refer to each other through
//! [`FaceId`] / [`HalfEdgeId`] indices, so the cyclic face/edge/twin graph
//! needs no shared ownership.
//!
//! A half-edge stores its *head*, the vertex it points to; the tail is the
//! head of the previous edge in the ring. A face built from `(a, b, c)` owns
//! the ring `c → a`, `a → b`, `b → c` (edges 0, 1, 2), which is
//! counter-clockwise seen from the side its plane normal points to.

use crate::geometry::Plane;
use crate::types::Point;
use crate::vertex_list::VertexId;
use crate::{ConvexHullError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a face in a [`HalfEdgeMesh`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaceId(pub usize);

/// Index of a half-edge in a [`HalfEdgeMesh`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HalfEdgeId(pub usize);

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FaceId({})", self.0)
    }
}

impl fmt::Display for HalfEdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HalfEdgeId({})", self.0)
    }
}

/// Construction state of a face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FaceFlag {
    #[default]
    Visible,
    Deleted,
}

/// A directed edge of a face ring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalfEdge {
    vertex: VertexId,
    face: FaceId,
    next: HalfEdgeId,
    prev: HalfEdgeId,
    twin: Option<HalfEdgeId>,
}

impl HalfEdge {
    /// Vertex this edge points to
    pub fn head(&self) -> VertexId {
        self.vertex
    }

    pub fn face(&self) -> FaceId {
        self.face
    }

    pub fn next(&self) -> HalfEdgeId {
        self.next
    }

    pub fn prev(&self) -> HalfEdgeId {
        self.prev
    }

    /// Opposite edge in the adjacent face
    pub fn twin(&self) -> Option<HalfEdgeId> {
        self.twin
    }
}

/// A triangular face of the hull
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    edge: HalfEdgeId,
    vertices: [VertexId; 3],
    flag: FaceFlag,
    centroid: Point,
    plane: Plane,
    /// First vertex of the assigned list this face can see
    #[serde(skip)]
    pub(crate) outside: Option<VertexId>,
}

impl Face {
    /// Entry edge of the ring (edge 0)
    pub fn edge(&self) -> HalfEdgeId {
        self.edge
    }

    pub fn vertices(&self) -> [VertexId; 3] {
        self.vertices
    }

    /// Vertex indices into the input points
    pub fn indices(&self) -> [usize; 3] {
        self.vertices.map(|v| v.0)
    }

    /// Check if this face uses a point index
    pub fn contains(&self, index: usize) -> bool {
        self.vertices.iter().any(|v| v.0 == index)
    }

    pub fn flag(&self) -> FaceFlag {
        self.flag
    }

    pub fn is_visible(&self) -> bool {
        self.flag == FaceFlag::Visible
    }

    pub fn centroid(&self) -> Point {
        self.centroid
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Outward unit normal
    pub fn normal(&self) -> Point {
        self.plane.normal
    }

    /// Signed distance of `point` to the face plane (positive = outside)
    #[inline]
    pub fn distance_to_point(&self, point: &Point) -> f64 {
        self.plane.distance_to_point(point)
    }
}

/// Arena of faces and half-edges
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HalfEdgeMesh {
    faces: Vec<Face>,
    edges: Vec<HalfEdge>,
}

impl HalfEdgeMesh {
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn num_half_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn faces_enumerated(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.faces.iter().enumerate().map(|(i, f)| (FaceId(i), f))
    }

    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.0]
    }

    pub(crate) fn face_mut(&mut self, id: FaceId) -> &mut Face {
        &mut self.faces[id.0]
    }

    pub fn half_edge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.edges[id.0]
    }

    pub fn head(&self, edge: HalfEdgeId) -> VertexId {
        self.edges[edge.0].vertex
    }

    pub fn tail(&self, edge: HalfEdgeId) -> VertexId {
        self.edges[self.edges[edge.0].prev.0].vertex
    }

    pub fn twin(&self, edge: HalfEdgeId) -> Option<HalfEdgeId> {
        self.edges[edge.0].twin
    }

    pub fn next(&self, edge: HalfEdgeId) -> HalfEdgeId {
        self.edges[edge.0].next
    }

    /// Edge `offset` steps around the ring from the face's entry edge.
    /// Negative offsets walk backwards, so `-1` is the last edge.
    pub fn edge(&self, face: FaceId, offset: isize) -> HalfEdgeId {
        let mut edge = self.faces[face.0].edge;
        let mut i = offset;
        while i > 0 {
            edge = self.edges[edge.0].next;
            i -= 1;
        }
        while i < 0 {
            edge = self.edges[edge.0].prev;
            i += 1;
        }
        edge
    }

    pub fn face_edges(&self, face: FaceId) -> [HalfEdgeId; 3] {
        let e0 = self.faces[face.0].edge;
        let e1 = self.edges[e0.0].next;
        let e2 = self.edges[e1.0].next;
        [e0, e1, e2]
    }

    /// Faces sharing an edge with `face`, in ring order
    pub fn neighbors(&self, face: FaceId) -> Vec<FaceId> {
        self.face_edges(face)
            .iter()
            .filter_map(|&e| self.edges[e.0].twin)
            .map(|t| self.edges[t.0].face)
            .collect()
    }

    /// Signed distance from a face plane to `point`
    #[inline]
    pub fn distance_to_point(&self, face: FaceId, point: &Point) -> f64 {
        self.faces[face.0].distance_to_point(point)
    }

    /// Create a triangle `a, b, c` with its 3-edge ring. Twins are left unset.
    pub(crate) fn add_triangle(&mut self, vertices: [VertexId; 3], points: [Point; 3]) -> FaceId {
        let face = FaceId(self.faces.len());
        let base = self.edges.len();

        for (i, &vertex) in vertices.iter().enumerate() {
            self.edges.push(HalfEdge {
                vertex,
                face,
                next: HalfEdgeId(base + (i + 1) % 3),
                prev: HalfEdgeId(base + (i + 2) % 3),
                twin: None,
            });
        }

        let [a, b, c] = points;
        let centroid = a.add(&b).add(&c).scale(1.0 / 3.0);

        self.faces.push(Face {
            edge: HalfEdgeId(base),
            vertices,
            flag: FaceFlag::Visible,
            centroid,
            plane: Plane::from_coplanar_points(&a, &b, &c),
            outside: None,
        });

        face
    }

    /// Make `a` and `b` twins of each other
    pub(crate) fn link_twins(&mut self, a: HalfEdgeId, b: HalfEdgeId) {
        self.edges[a.0].twin = Some(b);
        self.edges[b.0].twin = Some(a);
    }

    pub(crate) fn mark_deleted(&mut self, face: FaceId) {
        self.faces[face.0].flag = FaceFlag::Deleted;
    }

    /// Copy of the mesh holding only visible faces, re-indexed so that the
    /// ring of face `i` occupies edges `3i..3i + 3` starting at its entry edge.
    pub(crate) fn compact(&self) -> HalfEdgeMesh {
        let mut edge_map = vec![None; self.edges.len()];
        let mut kept = Vec::new();

        for (i, face) in self.faces.iter().enumerate() {
            if !face.is_visible() {
                continue;
            }
            let new_id = kept.len();
            for (k, e) in self.face_edges(FaceId(i)).iter().enumerate() {
                edge_map[e.0] = Some(HalfEdgeId(3 * new_id + k));
            }
            kept.push(FaceId(i));
        }

        let mut mesh = HalfEdgeMesh {
            faces: Vec::with_capacity(kept.len()),
            edges: Vec::with_capacity(3 * kept.len()),
        };

        for (new_id, &old_id) in kept.iter().enumerate() {
            let face = &self.faces[old_id.0];
            let base = 3 * new_id;

            for (k, e) in self.face_edges(old_id).iter().enumerate() {
                let edge = &self.edges[e.0];
                mesh.edges.push(HalfEdge {
                    vertex: edge.vertex,
                    face: FaceId(new_id),
                    next: HalfEdgeId(base + (k + 1) % 3),
                    prev: HalfEdgeId(base + (k + 2) % 3),
                    twin: edge.twin.and_then(|t| edge_map[t.0]),
                });
            }

            mesh.faces.push(Face {
                edge: HalfEdgeId(base),
                outside: None,
                ..face.clone()
            });
        }

        mesh
    }

    /// Every stored face and half-edge id must index into the arenas; a
    /// deserialized mesh can carry anything.
    fn check_ids(&self) -> Result<()> {
        let out_of_range = |what: String| {
            Err(ConvexHullError::InvalidMesh(format!("{what} is out of range")))
        };
        let edge_ok = |e: HalfEdgeId| self.edges.get(e.0).is_some();

        for (id, face) in self.faces_enumerated() {
            if !edge_ok(face.edge) {
                return out_of_range(format!("entry edge {} of {id}", face.edge));
            }
        }

        for (i, edge) in self.edges.iter().enumerate() {
            let e = HalfEdgeId(i);
            if self.faces.get(edge.face.0).is_none() {
                return out_of_range(format!("face {} of {e}", edge.face));
            }
            if !edge_ok(edge.next) || !edge_ok(edge.prev) {
                return out_of_range(format!("next/prev of {e}"));
            }
            if let Some(twin) = edge.twin
                && !edge_ok(twin)
            {
                return out_of_range(format!("twin {twin} of {e}"));
            }
        }

        Ok(())
    }

    /// Check the structural invariants of a finished hull: every face is
    /// visible with a closed 3-edge ring, and every half-edge has a twin in
    /// another face running the opposite way.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ConvexHullError::InvalidMesh(msg));

        self.check_ids()?;

        for (id, face) in self.faces_enumerated() {
            if !face.is_visible() {
                return invalid(format!("{id} is deleted"));
            }

            let ring = self.face_edges(id);
            if self.edges[ring[2].0].next != ring[0] {
                return invalid(format!("ring of {id} does not close after 3 edges"));
            }

            for (i, &e) in ring.iter().enumerate() {
                let edge = &self.edges[e.0];
                if edge.face != id {
                    return invalid(format!("{e} in ring of {id} names {}", edge.face));
                }
                if edge.vertex != face.vertices[i] {
                    return invalid(format!("{e} head does not match vertex {i} of {id}"));
                }
                if self.edges[edge.next.0].prev != e || self.edges[edge.prev.0].next != e {
                    return invalid(format!("next/prev links of {e} are inconsistent"));
                }
            }
        }

        for (i, edge) in self.edges.iter().enumerate() {
            let e = HalfEdgeId(i);
            let Some(twin) = edge.twin else {
                return invalid(format!("{e} has no twin"));
            };
            if self.edges[twin.0].twin != Some(e) {
                return invalid(format!("twin of {twin} is not {e}"));
            }
            if self.edges[twin.0].face == edge.face {
                return invalid(format!("{e} and its twin share {}", edge.face));
            }
            if self.head(twin) != self.tail(e) || self.tail(twin) != self.head(e) {
                return invalid(format!("{e} and {twin} do not run in opposite directions"));
            }
        }

        Ok(())
    }
}
