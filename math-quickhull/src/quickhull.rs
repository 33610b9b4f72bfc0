//! Quickhull algorithm implementation for 3D convex hulls
//!
//! Based on:
//! - Barber, C.B., Dobkin, D.P., and Huhdanpaa, H.T., "The Quickhull algorithm
//!   for convex hulls," ACM Trans. on Mathematical Software, 22(4):469-483, 1996.
//!
//! The hull is grown one point at a time over a half-edge mesh:
//! - every outside point is assigned to the face that sees it best; the
//!   assigned points of a face form one contiguous run of the `assigned` list
//!   starting at `Face::outside`
//! - the farthest point of the first face with outside points is inserted,
//!   every face it sees is deleted (depth-first over the twin edges) and the
//!   boundary of that region, the horizon, is closed with a cone of new faces
//! - the points freed by the deleted faces are re-tested against the cone only
//! - visibility scans over large batches of points run in parallel with rayon,
//!   linking the results stays sequential so the output is deterministic

use crate::config::HullConfig;
use crate::geometry::{LineSegment, Plane, find_extremes, tolerance_from_extremes};
use crate::halfedge::{FaceId, HalfEdgeId, HalfEdgeMesh};
use crate::types::{ConvexHull3D, Point};
use crate::vertex_list::{HullVertex, VertexId, VertexList};
use rayon::prelude::*;

/// Incremental hull builder. One instance performs exactly one build.
pub(crate) struct QuickHull {
    vertices: Vec<HullVertex>,
    mesh: HalfEdgeMesh,
    /// Points outside at least one visible face, grouped by face
    assigned: VertexList,
    /// Points orphaned by the faces deleted in the current step
    unassigned: VertexList,
    new_faces: Vec<FaceId>,
    horizon: Vec<HalfEdgeId>,
    tolerance: f64,
    tolerance_override: Option<f64>,
    tolerance_scale: f64,
    parallel_threshold: usize,
}

impl QuickHull {
    pub fn new(points: &[Point], config: &HullConfig) -> Self {
        Self {
            vertices: points.iter().copied().map(HullVertex::new).collect(),
            mesh: HalfEdgeMesh::default(),
            assigned: VertexList::new(),
            unassigned: VertexList::new(),
            new_faces: Vec::new(),
            horizon: Vec::new(),
            tolerance: 0.0,
            tolerance_override: config.tolerance,
            tolerance_scale: config.tolerance_scale,
            parallel_threshold: config.parallel_threshold,
        }
    }

    /// Run the whole construction. Expects at least 4 points.
    pub fn build(mut self) -> ConvexHull3D {
        self.compute_initial_hull();

        let mut iterations = 0;
        while let Some(vertex) = self.next_vertex_to_add() {
            self.add_vertex_to_hull(vertex);
            iterations += 1;
        }

        let mesh = self.mesh.compact();
        self.cleanup();

        if let Err(e) = mesh.validate() {
            log::warn!("Quickhull produced an inconsistent mesh (degenerate input?): {e}");
        }

        log::debug!(
            "Quickhull: {} points -> {} faces after {} insertions (tolerance {:e})",
            self.vertices.len(),
            mesh.num_faces(),
            iterations,
            self.tolerance
        );

        let points = self.vertices.into_iter().map(|v| v.point).collect();
        ConvexHull3D::from_parts(points, mesh, self.tolerance)
    }

    fn point(&self, v: VertexId) -> &Point {
        &self.vertices[v.0].point
    }

    fn add_face(&mut self, a: VertexId, b: VertexId, c: VertexId) -> FaceId {
        let points = [a, b, c].map(|v| self.vertices[v.0].point);
        self.mesh.add_triangle([a, b, c], points)
    }

    /// Twin edge `a.1` of face `a.0` with edge `b.1` of face `b.0`
    fn link_faces(&mut self, a: (FaceId, isize), b: (FaceId, isize)) {
        let ea = self.mesh.edge(a.0, a.1);
        let eb = self.mesh.edge(b.0, b.1);
        self.mesh.link_twins(ea, eb);
    }

    /// Build the starting tetrahedron and distribute the remaining points
    /// over its faces
    fn compute_initial_hull(&mut self) {
        let points: Vec<Point> = self.vertices.iter().map(|v| v.point).collect();

        let extremes = find_extremes(&points);
        self.tolerance = self.tolerance_override.unwrap_or_else(|| {
            tolerance_from_extremes(&points, &extremes, self.tolerance_scale)
        });

        // 1. the two points with the greatest 1-D separation
        let axis = extremes.widest_axis(&points);
        let v0 = extremes.min[axis];
        let v1 = extremes.max[axis];

        // 2. the point farthest from the segment v0-v1
        let line = LineSegment::new(points[v0], points[v1]);
        let Some(v2) = farthest(
            (0..points.len()).filter(|&i| i != v0 && i != v1),
            |i| {
                let closest = line.closest_point_to_point(&points[i], true);
                closest.distance_squared(&points[i])
            },
        ) else {
            return;
        };

        // 3. the point farthest from the plane v0, v1, v2
        let plane = Plane::from_coplanar_points(&points[v0], &points[v1], &points[v2]);
        let Some(v3) = farthest(
            (0..points.len()).filter(|&i| i != v0 && i != v1 && i != v2),
            |i| plane.distance_to_point(&points[i]).abs(),
        ) else {
            return;
        };

        let [v0, v1, v2, v3] = [v0, v1, v2, v3].map(VertexId);

        let faces = if plane.distance_to_point(&points[v3.0]) < 0.0 {
            // v3 is behind the plane, so its normal already points outside
            let f = [
                self.add_face(v0, v1, v2),
                self.add_face(v3, v1, v0),
                self.add_face(v3, v2, v1),
                self.add_face(v3, v0, v2),
            ];

            // the side faces against the base
            self.link_faces((f[1], 2), (f[0], 1));
            self.link_faces((f[2], 2), (f[0], 2));
            self.link_faces((f[3], 2), (f[0], 0));

            // the side faces against each other
            self.link_faces((f[1], 1), (f[2], 0));
            self.link_faces((f[2], 1), (f[3], 0));
            self.link_faces((f[3], 1), (f[1], 0));
            f
        } else {
            // v3 is in front of the plane: flip the base
            let f = [
                self.add_face(v0, v2, v1),
                self.add_face(v3, v0, v1),
                self.add_face(v3, v1, v2),
                self.add_face(v3, v2, v0),
            ];

            self.link_faces((f[1], 2), (f[0], 0));
            self.link_faces((f[2], 2), (f[0], 2));
            self.link_faces((f[3], 2), (f[0], 1));

            self.link_faces((f[1], 0), (f[2], 1));
            self.link_faces((f[2], 0), (f[3], 1));
            self.link_faces((f[3], 0), (f[1], 1));
            f
        };

        let candidates: Vec<VertexId> = (0..points.len())
            .map(VertexId)
            .filter(|v| ![v0, v1, v2, v3].contains(v))
            .collect();

        let best = self.best_faces(&candidates, &faces);
        for (vertex, face) in candidates.into_iter().zip(best) {
            if let Some(face) = face {
                self.add_vertex_to_face(vertex, face);
            }
        }
    }

    /// Face among `faces` that `point` lies farthest beyond the tolerance
    /// from. Deleted faces are skipped; ties keep the earlier face.
    fn best_face(&self, point: &Point, faces: &[FaceId]) -> Option<FaceId> {
        let mut max_distance = self.tolerance;
        let mut max_face = None;

        for &face in faces {
            if !self.mesh.face(face).is_visible() {
                continue;
            }
            let distance = self.mesh.distance_to_point(face, point);
            if distance > max_distance {
                max_distance = distance;
                max_face = Some(face);
            }
        }

        max_face
    }

    fn best_faces(&self, candidates: &[VertexId], faces: &[FaceId]) -> Vec<Option<FaceId>> {
        if candidates.len() >= self.parallel_threshold {
            candidates
                .par_iter()
                .map(|&v| self.best_face(self.point(v), faces))
                .collect()
        } else {
            candidates
                .iter()
                .map(|&v| self.best_face(self.point(v), faces))
                .collect()
        }
    }

    /// Put `vertex` at the front of the run of points `face` can see
    fn add_vertex_to_face(&mut self, vertex: VertexId, face: FaceId) {
        self.vertices[vertex.0].face = Some(face);

        match self.mesh.face(face).outside {
            None => self.assigned.append(&mut self.vertices, vertex),
            Some(outside) => self
                .assigned
                .insert_before(&mut self.vertices, outside, vertex),
        }

        self.mesh.face_mut(face).outside = Some(vertex);
    }

    fn remove_vertex_from_face(&mut self, vertex: VertexId, face: FaceId) {
        if self.mesh.face(face).outside == Some(vertex) {
            // hand the run over to the next point, if it still belongs to face
            let next = self.vertices[vertex.0]
                .next
                .filter(|n| self.vertices[n.0].face == Some(face));
            self.mesh.face_mut(face).outside = next;
        }

        self.assigned.remove(&mut self.vertices, vertex);
    }

    /// Move the whole run of `face` to the unassigned list
    fn remove_all_vertices_from_face(&mut self, face: FaceId) {
        let Some(first) = self.mesh.face(face).outside else {
            return;
        };

        let mut last = first;
        while let Some(next) = self.vertices[last.0].next
            && self.vertices[next.0].face == Some(face)
        {
            last = next;
        }

        self.assigned.remove_chain(&mut self.vertices, first, last);
        self.unassigned.append_chain(&mut self.vertices, first);
        self.mesh.face_mut(face).outside = None;
    }

    fn delete_face(&mut self, face: FaceId) {
        self.remove_all_vertices_from_face(face);
        self.mesh.mark_deleted(face);
    }

    /// Delete every face `eye` sees, starting from `face`, and collect the
    /// horizon edges in order around the deleted region.
    ///
    /// Each stack frame is a face being walked: the next edge to look at and
    /// how many edges are left. A face entered through a twin edge has
    /// already had that edge looked at, so it only walks the other two.
    fn compute_horizon(&mut self, eye: &Point, face: FaceId) {
        self.horizon.clear();
        self.delete_face(face);

        let mut stack: Vec<(HalfEdgeId, usize)> = vec![(self.mesh.edge(face, 0), 3)];

        while let Some(frame) = stack.last_mut() {
            if frame.1 == 0 {
                stack.pop();
                continue;
            }

            let edge = frame.0;
            frame.0 = self.mesh.next(edge);
            frame.1 -= 1;

            let Some(twin) = self.mesh.twin(edge) else {
                continue;
            };
            let opposite = self.mesh.half_edge(twin).face();
            if !self.mesh.face(opposite).is_visible() {
                continue;
            }

            if self.mesh.distance_to_point(opposite, eye) > self.tolerance {
                self.delete_face(opposite);
                stack.push((self.mesh.next(twin), 2));
            } else {
                self.horizon.push(edge);
            }
        }
    }

    /// New face `apex, tail, head` over a horizon edge, twinned to the
    /// retained side. Returns the side edge ending at the apex.
    fn add_adjoining_face(&mut self, apex: VertexId, horizon_edge: HalfEdgeId) -> HalfEdgeId {
        let tail = self.mesh.tail(horizon_edge);
        let head = self.mesh.head(horizon_edge);
        let face = self.add_face(apex, tail, head);

        if let Some(twin) = self.mesh.twin(horizon_edge) {
            let base = self.mesh.edge(face, -1);
            self.mesh.link_twins(base, twin);
        }

        self.mesh.edge(face, 0)
    }

    /// Close the horizon with a fan of faces around `apex`
    fn add_new_faces(&mut self, apex: VertexId) {
        self.new_faces.clear();
        let horizon = std::mem::take(&mut self.horizon);

        let mut first_side = None;
        let mut previous_side = None;

        for &horizon_edge in &horizon {
            let side = self.add_adjoining_face(apex, horizon_edge);

            match previous_side {
                None => first_side = Some(side),
                Some(previous) => {
                    let next = self.mesh.next(side);
                    self.mesh.link_twins(next, previous);
                }
            }

            self.new_faces.push(self.mesh.half_edge(side).face());
            previous_side = Some(side);
        }

        if let (Some(first), Some(last)) = (first_side, previous_side) {
            let next = self.mesh.next(first);
            self.mesh.link_twins(next, last);
        }

        self.horizon = horizon;
    }

    /// Hand the orphaned points to the new faces; points no new face can
    /// see are inside the hull for good.
    fn resolve_unassigned_points(&mut self) {
        if self.unassigned.is_empty() {
            return;
        }

        let candidates: Vec<VertexId> = self.unassigned.iter(&self.vertices).collect();
        self.unassigned.clear();

        let new_faces = std::mem::take(&mut self.new_faces);
        let best = self.best_faces(&candidates, &new_faces);

        for (vertex, face) in candidates.into_iter().zip(best) {
            match face {
                Some(face) => self.add_vertex_to_face(vertex, face),
                None => {
                    let v = &mut self.vertices[vertex.0];
                    v.face = None;
                    v.prev = None;
                    v.next = None;
                }
            }
        }

        self.new_faces = new_faces;
    }

    /// Farthest point of the first face that still has outside points
    fn next_vertex_to_add(&self) -> Option<VertexId> {
        let head = self.assigned.first()?;
        let face = self.vertices[head.0].face?;

        let mut max_distance = f64::NEG_INFINITY;
        let mut next_vertex = None;
        let mut current = self.mesh.face(face).outside;

        while let Some(v) = current {
            let vertex = &self.vertices[v.0];
            if vertex.face != Some(face) {
                break;
            }

            let distance = self.mesh.distance_to_point(face, &vertex.point);
            if next_vertex.is_none() || distance > max_distance {
                max_distance = distance;
                next_vertex = Some(v);
            }

            current = vertex.next;
        }

        next_vertex
    }

    fn add_vertex_to_hull(&mut self, vertex: VertexId) {
        self.unassigned.clear();

        let Some(face) = self.vertices[vertex.0].face else {
            self.assigned.remove(&mut self.vertices, vertex);
            return;
        };

        // take the eye out first so it cannot end up in the unassigned list
        self.remove_vertex_from_face(vertex, face);
        self.vertices[vertex.0].face = None;

        let eye = *self.point(vertex);
        self.compute_horizon(&eye, face);
        self.add_new_faces(vertex);
        self.resolve_unassigned_points();

        log::trace!(
            "Quickhull: inserted {} with a horizon of {} edges, {} points left",
            vertex,
            self.horizon.len(),
            self.assigned.iter(&self.vertices).count()
        );
    }

    fn cleanup(&mut self) {
        self.assigned.clear();
        self.unassigned.clear();
        self.new_faces.clear();
        self.horizon.clear();

        for v in &mut self.vertices {
            v.face = None;
            v.prev = None;
            v.next = None;
        }
    }
}

/// Candidate with the greatest score; the first one wins ties and a
/// non-comparable score never displaces it
fn farthest(
    candidates: impl Iterator<Item = usize>,
    score: impl Fn(usize) -> f64,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for i in candidates {
        let s = score(i);
        if best.is_none_or(|(_, max)| s > max) {
            best = Some((i, s));
        }
    }

    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;
    use crate::{ConvexHullError, halfedge::FaceFlag};
    use std::collections::BTreeSet;

    fn builder(points: &[Point]) -> QuickHull {
        QuickHull::new(points, &HullConfig::default())
    }

    fn unit_tetrahedron() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
        ]
    }

    /// Tall tetrahedron so that a point just outside the x = 0 or y = 0
    /// faces never becomes one of the initial extremes
    fn tall_tetrahedron_with(eye: Point) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 10.0),
            eye,
        ]
    }

    /// Every visible face's run starts at `outside` and holds exactly the
    /// vertices whose back-reference names that face
    fn assert_partition_consistent(qh: &QuickHull) {
        for (id, face) in qh.mesh.faces_enumerated() {
            let expected: BTreeSet<usize> = (0..qh.vertices.len())
                .filter(|&i| qh.vertices[i].face == Some(id))
                .collect();

            if !face.is_visible() {
                assert!(expected.is_empty(), "{id} is deleted but still sees points");
                assert!(face.outside.is_none());
                continue;
            }

            let mut run = BTreeSet::new();
            let mut current = face.outside;
            while let Some(v) = current {
                if qh.vertices[v.0].face != Some(id) {
                    break;
                }
                run.insert(v.0);
                current = qh.vertices[v.0].next;
            }
            assert_eq!(run, expected, "run of {id} does not match its points");

            for &i in &run {
                assert!(face.distance_to_point(&qh.vertices[i].point) > qh.tolerance);
            }
        }
    }

    fn assert_closed_loop(qh: &QuickHull) {
        let n = qh.horizon.len();
        assert!(n >= 3);
        for i in 0..n {
            let a = qh.horizon[i];
            let b = qh.horizon[(i + 1) % n];
            assert_eq!(qh.mesh.head(a), qh.mesh.tail(b), "horizon is not a closed loop");
        }
    }

    #[test]
    fn test_simple_tetrahedron() {
        let hull = ConvexHull3D::build(&unit_tetrahedron()).unwrap();
        assert_eq!(hull.num_faces(), 4);
        assert_eq!(hull.num_vertices(), 4);
        assert!(hull.validate().is_ok());
    }

    #[test]
    fn test_cube() {
        let hull = ConvexHull3D::build(&testdata::cube_vertices(1.0)).unwrap();
        // A cube has 8 vertices and 12 triangular faces (2 per square face)
        assert_eq!(hull.num_vertices(), 8);
        assert_eq!(hull.num_faces(), 12);
        assert!(hull.validate().is_ok());
    }

    #[test]
    fn test_insufficient_vertices() {
        let points = &unit_tetrahedron()[..3];
        let result = ConvexHull3D::build(points);
        assert!(matches!(
            result,
            Err(ConvexHullError::InsufficientVertices { found: 3 })
        ));
    }

    #[test]
    fn test_initial_hull_front_branch() {
        // v3 = (0, 0, 1) is in front of the base plane (0, 1, 2)
        let mut qh = builder(&unit_tetrahedron());
        qh.compute_initial_hull();

        assert_eq!(qh.mesh.num_faces(), 4);
        assert!(qh.mesh.validate().is_ok());
        assert_eq!(qh.mesh.face(FaceId(0)).indices(), [0, 2, 1]);
        for (_, face) in qh.mesh.faces_enumerated() {
            let opposite = (0..4).find(|&i| !face.contains(i)).unwrap();
            assert!(face.distance_to_point(&qh.vertices[opposite].point) < 0.0);
        }
    }

    #[test]
    fn test_initial_hull_behind_branch() {
        let mut points = unit_tetrahedron();
        points[3] = Point::new(0.0, 0.0, -1.0);
        let mut qh = builder(&points);
        qh.compute_initial_hull();

        assert!(qh.mesh.validate().is_ok());
        assert_eq!(qh.mesh.face(FaceId(0)).indices(), [0, 1, 2]);
        for (_, face) in qh.mesh.faces_enumerated() {
            let opposite = (0..4).find(|&i| !face.contains(i)).unwrap();
            assert!(face.distance_to_point(&qh.vertices[opposite].point) < 0.0);
        }
    }

    #[test]
    fn test_initial_assignment_skips_interior_points() {
        let mut points = unit_tetrahedron();
        points.push(Point::new(0.1, 0.1, 0.1));
        // outside the slanted face without moving any extreme
        points.push(Point::new(0.6, 0.6, 0.6));
        let mut qh = builder(&points);
        qh.compute_initial_hull();

        assert_eq!(qh.vertices[4].face, None);
        assert!(qh.vertices[5].face.is_some());
        assert_eq!(qh.assigned.first(), Some(VertexId(5)));
        assert_partition_consistent(&qh);
    }

    #[test]
    fn test_horizon_of_single_visible_face() {
        let points = tall_tetrahedron_with(Point::new(-0.5, 0.25, 1.0));
        let mut qh = builder(&points);
        qh.compute_initial_hull();

        let eye = qh.next_vertex_to_add().unwrap();
        assert_eq!(eye, VertexId(4));
        let face = qh.vertices[eye.0].face.unwrap();
        qh.remove_vertex_from_face(eye, face);
        qh.compute_horizon(&points[4], face);

        assert_eq!(qh.horizon.len(), 3);
        assert_closed_loop(&qh);
        let deleted = qh
            .mesh
            .faces()
            .iter()
            .filter(|f| f.flag() == FaceFlag::Deleted)
            .count();
        assert_eq!(deleted, 1);
    }

    #[test]
    fn test_horizon_of_two_visible_faces() {
        let points = tall_tetrahedron_with(Point::new(-0.5, -0.5, 1.0));
        let mut qh = builder(&points);
        qh.compute_initial_hull();

        let eye = qh.next_vertex_to_add().unwrap();
        assert_eq!(eye, VertexId(4));
        let face = qh.vertices[eye.0].face.unwrap();
        qh.remove_vertex_from_face(eye, face);
        qh.compute_horizon(&points[4], face);

        assert_eq!(qh.horizon.len(), 4);
        assert_closed_loop(&qh);

        qh.add_new_faces(eye);
        assert_eq!(qh.new_faces.len(), 4);
        // the cone is stitched to itself and to the retained faces
        for &f in &qh.new_faces {
            for e in qh.mesh.face_edges(f) {
                let twin = qh.mesh.twin(e).unwrap();
                assert_eq!(qh.mesh.twin(twin), Some(e));
                assert!(qh.mesh.face(qh.mesh.half_edge(twin).face()).is_visible());
            }
        }
        assert!(qh.mesh.compact().validate().is_ok());
    }

    #[test]
    fn test_partition_stays_consistent_while_growing() {
        let points = testdata::random_sphere_points(300, 1.0);
        let mut qh = QuickHull::new(&points, &HullConfig::default().with_parallel_threshold(50));
        qh.compute_initial_hull();
        assert_partition_consistent(&qh);

        let mut steps = 0;
        while let Some(vertex) = qh.next_vertex_to_add() {
            qh.add_vertex_to_hull(vertex);
            assert_partition_consistent(&qh);
            steps += 1;
        }
        assert!(steps > 0);
        assert!(qh.assigned.is_empty());
        assert!(qh.mesh.compact().validate().is_ok());
    }

    #[test]
    fn test_parallel_and_sequential_scans_agree() {
        let points = testdata::fibonacci_sphere_points(400, 1.0);
        let parallel = ConvexHull3D::build_with_config(
            &points,
            &HullConfig::default().with_parallel_threshold(0),
        )
        .unwrap();
        let sequential = ConvexHull3D::build_with_config(
            &points,
            &HullConfig::default().with_parallel_threshold(usize::MAX),
        )
        .unwrap();

        let faces = |h: &ConvexHull3D| h.faces().iter().map(|f| f.indices()).collect::<Vec<_>>();
        assert_eq!(faces(&parallel), faces(&sequential));
    }

    #[test]
    fn test_farthest_prefers_first_on_ties() {
        let scores = [1.0, 3.0, 3.0, f64::NAN];
        assert_eq!(farthest(0..4, |i| scores[i]), Some(1));
        assert_eq!(farthest([3, 0].into_iter(), |i| scores[i]), Some(3));
        assert_eq!(farthest(std::iter::empty(), |_| 0.0), None);
    }
}
