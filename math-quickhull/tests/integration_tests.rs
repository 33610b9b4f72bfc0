//! Integration tests for convex hull computation

use math_audio_quickhull::{
    ConvexHull3D, ConvexHullError, FaceId, HullConfig, Point, export_obj, testdata,
};
use std::collections::HashSet;
use std::path::PathBuf;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn output_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("math-quickhull");
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(format!("convhull_{name}.obj"))
}

/// Build a hull and check the properties every hull must have
fn build_and_check(name: &str, points: &[Point]) -> ConvexHull3D {
    init_logger();

    let hull = ConvexHull3D::build(points).expect("Failed to build convex hull");
    let mesh = hull.mesh();

    assert!(!hull.is_empty(), "{name}: empty hull");
    hull.validate().unwrap_or_else(|e| panic!("{name}: invalid hull: {e}"));

    // every face has three distinct neighbours that point back at it
    for (id, _) in mesh.faces_enumerated() {
        let neighbors = mesh.neighbors(id);
        let distinct: HashSet<FaceId> = neighbors.iter().copied().collect();
        assert_eq!(distinct.len(), 3, "{name}: {id} does not have 3 neighbours");
        for n in neighbors {
            assert!(mesh.neighbors(n).contains(&id));
        }
    }

    // closed triangulated sphere: F = 2V - 4
    let hull_vertices = hull.hull_vertex_indices().len();
    assert_eq!(hull.num_faces(), 2 * hull_vertices - 4, "{name}: Euler mismatch");

    for p in points {
        assert!(hull.contains_point(p), "{name}: {p} outside its own hull");
    }
    assert!(hull.volume() > 0.0);
    assert!(hull.surface_area() > 0.0);

    let obj_path = output_path(name);
    export_obj(&hull, &obj_path).expect("Failed to export OBJ");
    let reloaded = testdata::load_obj_vertices(&obj_path).unwrap();
    assert_eq!(reloaded.len(), points.len());

    hull
}

#[test]
fn test_regular_tetrahedron() {
    let hull = build_and_check("regular_tetrahedron", &testdata::regular_tetrahedron_vertices());
    assert_eq!(hull.num_faces(), 4);

    for v in 0..4 {
        let count = hull.faces().iter().filter(|f| f.contains(v)).count();
        assert_eq!(count, 3, "vertex {v} should touch 3 faces");
    }
    assert!((hull.volume() - 8.0 / 3.0).abs() < 1e-10);
}

#[test]
fn test_tetrahedron() {
    let hull = build_and_check("tetrahedron", &testdata::tetrahedron_vertices());
    assert_eq!(hull.num_faces(), 4);
}

#[test]
fn test_cube() {
    let hull = build_and_check("cube", &testdata::cube_vertices(2.0));
    assert_eq!(hull.num_faces(), 12);
    assert_eq!(hull.hull_vertex_indices(), (0..8).collect::<Vec<_>>());
    assert!((hull.volume() - 8.0).abs() < 1e-10);
    assert!((hull.surface_area() - 24.0).abs() < 1e-10);
}

#[test]
fn test_cube_with_centroid() {
    let mut points = testdata::cube_vertices(2.0);
    points.push(Point::new(0.0, 0.0, 0.0));

    let hull = build_and_check("cube_centroid", &points);
    assert_eq!(hull.num_faces(), 12);
    assert!(hull.faces().iter().all(|f| !f.contains(8)));
}

#[test]
fn test_interior_point_is_dropped() {
    let points = [
        Point::new(0.0, 0.0, 0.0),
        Point::new(1.0, 0.0, 0.0),
        Point::new(0.0, 1.0, 0.0),
        Point::new(0.0, 0.0, 1.0),
        Point::new(0.1, 0.1, 0.1),
    ];

    let hull = build_and_check("tetrahedron_interior", &points);
    assert_eq!(hull.num_faces(), 4);
    assert_eq!(hull.hull_vertex_indices(), vec![0, 1, 2, 3]);
}

#[test]
fn test_octahedron() {
    let hull = build_and_check("octahedron", &testdata::octahedron_vertices());
    assert_eq!(hull.num_faces(), 8);
}

#[test]
fn test_icosahedron() {
    let hull = build_and_check("icosahedron", &testdata::icosahedron_vertices());
    assert_eq!(hull.num_faces(), 20);
}

#[test]
fn test_fibonacci_spheres_keep_every_point() {
    for n in [180, 840] {
        let points = testdata::fibonacci_sphere_points(n, 1.0);
        let hull = build_and_check(&format!("fibonacci_{n}"), &points);
        assert_eq!(hull.hull_vertex_indices().len(), n);
        assert_eq!(hull.num_faces(), 2 * n - 4);
    }
}

#[test]
fn test_random_sphere_936() {
    let points = testdata::random_sphere_points(936, 1.0);
    build_and_check("random_sphere_936", &points);
}

#[test]
fn test_random_box_cloud() {
    let points = testdata::random_box_points(2000, 5.0);
    let hull = build_and_check("random_box_2000", &points);
    assert!(hull.hull_vertex_indices().len() < points.len());
}

#[test]
fn test_cube_with_interior_1000() {
    let points = testdata::cube_with_interior_points(2.0, 1000);
    let hull = build_and_check("cube_interior_1000", &points);

    assert_eq!(hull.num_faces(), 12);
    assert_eq!(hull.hull_vertex_indices(), (0..8).collect::<Vec<_>>());
}

#[test]
fn test_large_coordinates() {
    let points = testdata::cube_vertices(2.0e6);

    let hull = build_and_check("large_cube", &points);
    assert_eq!(hull.num_faces(), 12);
    assert!(hull.tolerance() > 1.0e-9);
    assert!((hull.volume() / 8.0e18 - 1.0).abs() < 1e-12);
}

#[test]
fn test_point_order_does_not_change_the_shape() {
    let mut points = testdata::cube_vertices(2.0);
    points.reverse();
    points.swap(1, 5);

    let hull = build_and_check("cube_permuted", &points);
    assert_eq!(hull.num_faces(), 12);
    assert!((hull.volume() - 8.0).abs() < 1e-10);
}

#[test]
fn test_too_few_points() {
    init_logger();
    let points = &testdata::cube_vertices(2.0)[..3];

    assert!(matches!(
        ConvexHull3D::build(points),
        Err(ConvexHullError::InsufficientVertices { found: 3 })
    ));

    let mut hull = ConvexHull3D::new();
    hull.from_points(points);
    assert!(hull.is_empty());
    assert_eq!(hull.num_faces(), 0);
}

#[test]
fn test_rebuild_is_idempotent() {
    init_logger();
    let points = testdata::fibonacci_sphere_points(200, 2.0);

    let mut hull = ConvexHull3D::new();
    hull.from_points(&points);
    let first: Vec<[usize; 3]> = hull.faces().iter().map(|f| f.indices()).collect();

    hull.reset().from_points(&points);
    let second: Vec<[usize; 3]> = hull.faces().iter().map(|f| f.indices()).collect();

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_far_point_is_outside() {
    let hull = build_and_check("icosahedron_far", &testdata::icosahedron_vertices());
    assert!(!hull.contains_point(&Point::new(10.0, 0.0, 0.0)));
    assert!(hull.contains_point(&Point::new(0.0, 0.0, 0.0)));
}

#[test]
fn test_explicit_tolerance_is_used() {
    init_logger();
    let config = HullConfig::default().with_tolerance(1.0e-6);
    let hull = ConvexHull3D::build_with_config(&testdata::octahedron_vertices(), &config).unwrap();
    assert_eq!(hull.tolerance(), 1.0e-6);
    assert_eq!(hull.num_faces(), 8);
}

#[test]
fn test_hull_serde_round_trip() {
    let hull = build_and_check("octahedron_serde", &testdata::octahedron_vertices());

    let json = serde_json::to_string(&hull).unwrap();
    let restored: ConvexHull3D = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.num_faces(), hull.num_faces());
    assert_eq!(restored.vertices(), hull.vertices());
    assert!(restored.validate().is_ok());
    for (a, b) in hull.faces().iter().zip(restored.faces()) {
        assert_eq!(a.indices(), b.indices());
    }
}

#[test]
fn test_load_missing_obj_file() {
    let result = testdata::load_obj_vertices("/nonexistent/path/to/points.obj");
    assert!(matches!(result, Err(ConvexHullError::IoError(_))));
}
