//! STL reading and writing.
//!
//! Reading keeps every triangle's own corners so that deduplication is
//! left to [`crate::index_soup`].

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use nalgebra::Vector3;
use stl_io::{Normal, Triangle, Vertex};

use crate::error::{MeshError, Result};
use crate::index::IndexedMesh;
use crate::soup::{Point3, TriangleSoup};

/// Read an ASCII or binary STL stream as a triangle soup.
pub fn read_stl<R: Read + Seek>(reader: &mut R) -> Result<TriangleSoup> {
    let triangles = stl_io::create_stl_reader(reader)
        .map_err(|e| MeshError::Stl(e.to_string()))?
        .map(|tri| -> Result<[Point3; 3]> {
            let tri = tri.map_err(|e| MeshError::Stl(e.to_string()))?;
            Ok(tri.vertices.map(|v| [v[0], v[1], v[2]]))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TriangleSoup::new(triangles))
}

/// Load an STL file as a triangle soup.
pub fn load_stl(path: impl AsRef<Path>) -> Result<TriangleSoup> {
    let mut reader = BufReader::new(File::open(path)?);
    read_stl(&mut reader)
}

/// Write an indexed mesh as binary STL with per-face normals.
pub fn write_stl<W: Write>(mesh: &IndexedMesh, writer: &mut W) -> Result<()> {
    let triangles: Vec<Triangle> = mesh
        .triangles()
        .map(|corners| Triangle {
            normal: Normal::new(face_normal(&corners)),
            vertices: corners.map(Vertex::new),
        })
        .collect();

    stl_io::write_stl(writer, triangles.iter())?;
    Ok(())
}

/// Write an indexed mesh to a binary STL file.
pub fn export_stl(mesh: &IndexedMesh, path: impl AsRef<Path>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_stl(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Unit normal of a triangle, `+Z` for degenerate faces.
fn face_normal(corners: &[Point3; 3]) -> [f32; 3] {
    let [a, b, c] = corners.map(|p| Vector3::new(p[0], p[1], p[2]));
    let n = (b - a).cross(&(c - a));
    match n.try_normalize(1e-10) {
        Some(n) => [n.x, n.y, n.z],
        None => [0.0, 0.0, 1.0],
    }
}
