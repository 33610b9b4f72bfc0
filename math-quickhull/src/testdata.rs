//! Point sets for tests and benchmarks
//!
//! Platonic solids, sphere samplings and random clouds, plus a loader for
//! the vertex lines of Wavefront OBJ files.

use crate::ConvexHullError;
use crate::types::Point;
use rand::Rng;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Random points near a sphere (radius varies by +-10%)
pub fn random_sphere_points(n: usize, radius: f64) -> Vec<Point> {
    let mut rng = rand::rng();

    (0..n)
        .map(|_| {
            let azimuth = rng.random::<f64>() * 2.0 * std::f64::consts::PI;
            let elevation = (rng.random::<f64>() * 2.0 - 1.0).asin();
            let r = radius * (0.9 + 0.2 * rng.random::<f64>());
            Point::from_spherical(azimuth, elevation, r)
        })
        .collect()
}

/// Points uniformly distributed inside an axis-aligned box `[-half, half]^3`
pub fn random_box_points(n: usize, half: f64) -> Vec<Point> {
    let mut rng = rand::rng();

    (0..n)
        .map(|_| {
            Point::new(
                rng.random_range(-half..half),
                rng.random_range(-half..half),
                rng.random_range(-half..half),
            )
        })
        .collect()
}

/// Points exactly on a sphere, spread with a Fibonacci lattice
pub fn fibonacci_sphere_points(n: usize, radius: f64) -> Vec<Point> {
    let golden_ratio = (1.0 + 5.0_f64.sqrt()) / 2.0;

    (0..n)
        .map(|i| {
            let theta = 2.0 * std::f64::consts::PI * (i as f64) / golden_ratio;
            let phi = ((2 * i + 1) as f64 / n as f64 - 1.0).acos();
            Point::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            )
        })
        .collect()
}

/// Axis-aligned cube of edge `size` centred on the origin
pub fn cube_vertices(size: f64) -> Vec<Point> {
    let s = size / 2.0;
    let mut points = Vec::with_capacity(8);
    for z in [-s, s] {
        for (x, y) in [(-s, -s), (s, -s), (s, s), (-s, s)] {
            points.push(Point::new(x, y, z));
        }
    }
    points
}

/// Cube corners followed by `n_interior` random points strictly inside
pub fn cube_with_interior_points(size: f64, n_interior: usize) -> Vec<Point> {
    let mut points = cube_vertices(size);
    // keep clear of the faces so none of them can end up on the hull
    points.extend(random_box_points(n_interior, size * 0.45));
    points
}

/// Tetrahedron with one face on the z = 0 plane
pub fn tetrahedron_vertices() -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0, 0.0),
        Point::new(1.0, 0.0, 0.0),
        Point::new(0.5, 3.0_f64.sqrt() / 2.0, 0.0),
        Point::new(0.5, 3.0_f64.sqrt() / 6.0, (2.0 / 3.0_f64).sqrt()),
    ]
}

/// Regular tetrahedron inscribed in the cube `[-1, 1]^3`
pub fn regular_tetrahedron_vertices() -> Vec<Point> {
    vec![
        Point::new(1.0, 1.0, 1.0),
        Point::new(1.0, -1.0, -1.0),
        Point::new(-1.0, 1.0, -1.0),
        Point::new(-1.0, -1.0, 1.0),
    ]
}

pub fn icosahedron_vertices() -> Vec<Point> {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;

    vec![
        Point::new(-1.0, phi, 0.0),
        Point::new(1.0, phi, 0.0),
        Point::new(-1.0, -phi, 0.0),
        Point::new(1.0, -phi, 0.0),
        Point::new(0.0, -1.0, phi),
        Point::new(0.0, 1.0, phi),
        Point::new(0.0, -1.0, -phi),
        Point::new(0.0, 1.0, -phi),
        Point::new(phi, 0.0, -1.0),
        Point::new(phi, 0.0, 1.0),
        Point::new(-phi, 0.0, -1.0),
        Point::new(-phi, 0.0, 1.0),
    ]
}

pub fn octahedron_vertices() -> Vec<Point> {
    vec![
        Point::new(1.0, 0.0, 0.0),
        Point::new(-1.0, 0.0, 0.0),
        Point::new(0.0, 1.0, 0.0),
        Point::new(0.0, -1.0, 0.0),
        Point::new(0.0, 0.0, 1.0),
        Point::new(0.0, 0.0, -1.0),
    ]
}

/// Load the points of a Wavefront OBJ file
///
/// Only `v x y z` lines are read; faces, normals and everything else are
/// skipped. A file without a single vertex line is an error.
pub fn load_obj_vertices<P: AsRef<Path>>(path: P) -> Result<Vec<Point>, ConvexHullError> {
    let reader = BufReader::new(File::open(path)?);
    let mut points = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if parts.next() != Some("v") {
            continue;
        }

        let coords: Vec<f64> = parts.take(3).filter_map(|s| s.parse().ok()).collect();
        if let [x, y, z] = coords[..] {
            points.push(Point::new(x, y, z));
        }
    }

    if points.is_empty() {
        Err(ConvexHullError::InvalidObj("no `v x y z` vertex lines found".to_string()))
    } else {
        Ok(points)
    }
}
