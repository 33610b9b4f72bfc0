//! Wavefront OBJ export

use crate::types::ConvexHull3D;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Export a convex hull to an OBJ file
///
/// All input points are written as `v` lines so face indices stay equal to
/// the input indices; interior points are simply unreferenced. Each face gets
/// its own `vn` line.
pub fn export_obj<P: AsRef<Path>>(hull: &ConvexHull3D, path: P) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_obj(hull, &mut writer)?;
    writer.flush()
}

/// Write the OBJ text of a hull to any writer
pub fn write_obj<W: Write>(hull: &ConvexHull3D, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "# Convex hull")?;
    writeln!(out, "# points: {}", hull.num_vertices())?;
    writeln!(out, "# faces: {}", hull.num_faces())?;

    for p in hull.vertices() {
        writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
    }

    for face in hull.faces() {
        let n = face.normal();
        writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
    }

    // OBJ indices are 1-based
    for (i, face) in hull.faces().iter().enumerate() {
        let [a, b, c] = face.indices();
        let n = i + 1;
        writeln!(out, "f {}//{n} {}//{n} {}//{n}", a + 1, b + 1, c + 1)?;
    }

    Ok(())
}
