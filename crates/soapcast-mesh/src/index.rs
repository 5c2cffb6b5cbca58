//! Triangle soup to indexed mesh conversion.
//!
//! Corners are deduplicated by exact coordinate equality and every
//! triangle is rewritten as three indices into the unique vertex table.

use std::cmp::Ordering;

use serde::Serialize;

use crate::error::{MeshError, Result};
use crate::soup::{point_bounds, Point3, TriangleSoup};

/// Indexed mesh: unique vertices plus one `(i, j, k)` corner triple per triangle.
///
/// `vertices[i[t]]`, `vertices[j[t]]` and `vertices[k[t]]` are the first,
/// second and third corner of triangle `t`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexedMesh {
    /// Unique vertex positions, sorted lexicographically by `(x, y, z)`.
    pub vertices: Vec<Point3>,
    /// First-corner index of each triangle.
    pub i: Vec<u32>,
    /// Second-corner index of each triangle.
    pub j: Vec<u32>,
    /// Third-corner index of each triangle.
    pub k: Vec<u32>,
}

impl IndexedMesh {
    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.i.len()
    }

    /// Number of unique vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Check if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.i.is_empty()
    }

    /// Corner positions of triangle `t`.
    pub fn triangle(&self, t: usize) -> Option<[Point3; 3]> {
        let (a, b, c) = (*self.i.get(t)?, *self.j.get(t)?, *self.k.get(t)?);
        Some([
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ])
    }

    /// Iterate over triangles as corner positions.
    pub fn triangles(&self) -> impl ExactSizeIterator<Item = [Point3; 3]> + '_ {
        (0..self.num_triangles()).map(move |t| {
            [
                self.vertices[self.i[t] as usize],
                self.vertices[self.j[t] as usize],
                self.vertices[self.k[t] as usize],
            ]
        })
    }

    /// Axis-aligned bounds `(min, max)`, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        point_bounds(&self.vertices)
    }

    /// Flat array of vertex positions: `[x0, y0, z0, x1, y1, z1, ...]`.
    pub fn flat_vertices(&self) -> Vec<f32> {
        self.vertices.as_flattened().to_vec()
    }

    /// Flat array of triangle indices: `[i0, j0, k0, i1, j1, k1, ...]`.
    pub fn flat_indices(&self) -> Vec<u32> {
        let mut indices = Vec::with_capacity(self.num_triangles() * 3);
        for t in 0..self.num_triangles() {
            indices.extend_from_slice(&[self.i[t], self.j[t], self.k[t]]);
        }
        indices
    }

    /// Expand back into a triangle soup.
    pub fn to_soup(&self) -> TriangleSoup {
        TriangleSoup::new(self.triangles().collect())
    }
}

/// Index a triangle soup.
///
/// An empty soup yields an empty mesh.
pub fn index_soup(soup: &TriangleSoup) -> Result<IndexedMesh> {
    index_points(soup.points())
}

/// Index a flat corner sequence where every three points form a triangle.
///
/// Fails with [`MeshError::InvalidMeshShape`] if the point count is not a
/// multiple of 3. Zero points is accepted and yields an empty mesh.
pub fn index_points(points: &[Point3]) -> Result<IndexedMesh> {
    if points.len() % 3 != 0 {
        return Err(MeshError::InvalidMeshShape(format!(
            "{} points do not form complete triangles",
            points.len()
        )));
    }

    let (vertices, inverse) = unique_with_inverse(points)?;

    let num_triangles = points.len() / 3;
    let mut i = Vec::with_capacity(num_triangles);
    let mut j = Vec::with_capacity(num_triangles);
    let mut k = Vec::with_capacity(num_triangles);
    for corners in inverse.chunks_exact(3) {
        i.push(corners[0]);
        j.push(corners[1]);
        k.push(corners[2]);
    }

    Ok(IndexedMesh { vertices, i, j, k })
}

/// Sorted unique points and, for each input position, the index of its
/// unique point.
fn unique_with_inverse(points: &[Point3]) -> Result<(Vec<Point3>, Vec<u32>)> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    // Ties are bit-identical points, so an unstable sort cannot change the output.
    order.sort_unstable_by(|&a, &b| cmp_points(&points[a], &points[b]));

    let mut vertices: Vec<Point3> = Vec::new();
    let mut inverse = vec![0u32; points.len()];

    for &pos in &order {
        let p = &points[pos];
        let is_new = vertices
            .last()
            .is_none_or(|last| cmp_points(last, p) != Ordering::Equal);
        if is_new {
            vertices.push(*p);
        }
        inverse[pos] = u32::try_from(vertices.len() - 1).map_err(|_| {
            MeshError::InvalidMeshShape(format!(
                "more than {} unique vertices",
                u32::MAX as u64 + 1
            ))
        })?;
    }

    Ok((vertices, inverse))
}

/// Lexicographic order on `(x, y, z)` under IEEE-754 total ordering.
///
/// Two points compare equal exactly when their coordinates are bit-identical,
/// so `-0.0` and `0.0` stay distinct.
fn cmp_points(a: &Point3, b: &Point3) -> Ordering {
    a[0].total_cmp(&b[0])
        .then_with(|| a[1].total_cmp(&b[1]))
        .then_with(|| a[2].total_cmp(&b[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_edge_soup() -> TriangleSoup {
        TriangleSoup::new(vec![
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
        ])
    }

    /// 10x10x10 cube with 12 triangles, 36 corners and 8 distinct points.
    fn cube_soup() -> TriangleSoup {
        let s = 10.0f32;
        let v = [
            [0.0, 0.0, 0.0],
            [s, 0.0, 0.0],
            [s, s, 0.0],
            [0.0, s, 0.0],
            [0.0, 0.0, s],
            [s, 0.0, s],
            [s, s, s],
            [0.0, s, s],
        ];
        let faces: [[usize; 3]; 12] = [
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [2, 3, 7],
            [2, 7, 6],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];
        TriangleSoup::new(faces.iter().map(|f| [v[f[0]], v[f[1]], v[f[2]]]).collect())
    }

    /// Regular grid of `n x n` quads split into two triangles each.
    fn grid_soup(n: usize) -> TriangleSoup {
        let mut triangles = Vec::with_capacity(n * n * 2);
        for y in 0..n {
            for x in 0..n {
                let (x0, y0) = (x as f32, y as f32);
                let (x1, y1) = (x0 + 1.0, y0 + 1.0);
                let z = ((x * 7 + y * 3) % 5) as f32 * 0.1;
                triangles.push([[x0, y0, z], [x1, y0, z], [x1, y1, z]]);
                triangles.push([[x0, y0, z], [x1, y1, z], [x0, y1, z]]);
            }
        }
        TriangleSoup::new(triangles)
    }

    fn assert_reconstructs(soup: &TriangleSoup, mesh: &IndexedMesh) {
        assert_eq!(mesh.num_triangles(), soup.len());
        for (t, tri) in soup.triangles().iter().enumerate() {
            assert_eq!(mesh.vertices[mesh.i[t] as usize], tri[0]);
            assert_eq!(mesh.vertices[mesh.j[t] as usize], tri[1]);
            assert_eq!(mesh.vertices[mesh.k[t] as usize], tri[2]);
        }
    }

    #[test]
    fn test_shared_edge() {
        let soup = shared_edge_soup();
        let mesh = index_soup(&soup).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.i[0], 0);
        // (1,0,0) is corner 2 of T0 and corner 1 of T1
        assert_eq!(mesh.i[1], mesh.j[0]);
        // (0,1,0) is corner 3 of T0 and corner 2 of T1
        assert_eq!(mesh.j[1], mesh.k[0]);
        assert_reconstructs(&soup, &mesh);
    }

    #[test]
    fn test_vertices_sorted_lexicographically() {
        let mesh = index_soup(&shared_edge_soup()).unwrap();
        assert_eq!(
            mesh.vertices,
            vec![
                [0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
            ]
        );
        assert_eq!(mesh.i, vec![0, 2]);
        assert_eq!(mesh.j, vec![2, 1]);
        assert_eq!(mesh.k, vec![1, 3]);
    }

    #[test]
    fn test_cube_dedup() {
        let soup = cube_soup();
        let mesh = index_soup(&soup).unwrap();
        assert_eq!(mesh.num_triangles(), 12);
        assert_eq!(mesh.num_vertices(), 8);
        assert_reconstructs(&soup, &mesh);
    }

    #[test]
    fn test_minimal_and_complete() {
        let soup = grid_soup(12);
        let mesh = index_soup(&soup).unwrap();

        assert!(mesh.num_vertices() <= 3 * soup.len());
        for pair in mesh.vertices.windows(2) {
            assert_eq!(cmp_points(&pair[0], &pair[1]), Ordering::Less);
        }
        for p in soup.points() {
            assert!(mesh
                .vertices
                .binary_search_by(|v| cmp_points(v, p))
                .is_ok());
        }
    }

    #[test]
    fn test_deterministic() {
        let soup = grid_soup(20);
        let first = index_soup(&soup).unwrap();
        let second = index_soup(&soup).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_large_grid() {
        let soup = grid_soup(100);
        let mesh = index_soup(&soup).unwrap();
        assert_eq!(mesh.num_triangles(), 20_000);
        // Corners only merge when z matches across neighbouring cells.
        assert!(mesh.num_vertices() >= 101 * 101);
        assert!(mesh.num_vertices() < soup.points().len());
        assert_reconstructs(&soup, &mesh);
    }

    #[test]
    fn test_invalid_shape() {
        let points = [[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
        let err = index_points(&points).unwrap_err();
        assert!(matches!(err, MeshError::InvalidMeshShape(_)));

        for n in [1, 2, 5, 7] {
            let points = vec![[0.0f32; 3]; n];
            assert!(matches!(
                index_points(&points),
                Err(MeshError::InvalidMeshShape(_))
            ));
        }
    }

    #[test]
    fn test_empty() {
        let mesh = index_points(&[]).unwrap();
        assert!(mesh.vertices.is_empty());
        assert!(mesh.i.is_empty());
        assert!(mesh.j.is_empty());
        assert!(mesh.k.is_empty());
        assert!(mesh.is_empty());
        assert_eq!(mesh.bounds(), None);
    }

    #[test]
    fn test_exact_equality_only() {
        let eps = f32::EPSILON;
        let soup = TriangleSoup::new(vec![
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            [[1.0 + eps, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        ]);
        let mesh = index_soup(&soup).unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_ne!(mesh.i[0], mesh.i[1]);
    }

    #[test]
    fn test_signed_zero_is_distinct() {
        let soup = TriangleSoup::new(vec![
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            [[-0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        ]);
        let mesh = index_soup(&soup).unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.i[0], 1);
        assert_eq!(mesh.i[1], 0);
        assert_reconstructs(&soup, &mesh);
    }

    #[test]
    fn test_degenerate_triangle() {
        let p = [2.0, 3.0, 4.0];
        let mesh = index_points(&[p, p, p]).unwrap();
        assert_eq!(mesh.vertices, vec![p]);
        assert_eq!((mesh.i[0], mesh.j[0], mesh.k[0]), (0, 0, 0));
    }

    #[test]
    fn test_flat_views() {
        let mesh = index_soup(&shared_edge_soup()).unwrap();
        assert_eq!(mesh.flat_vertices().len(), 12);
        assert_eq!(mesh.flat_indices(), vec![0, 2, 1, 2, 1, 3]);
    }

    #[test]
    fn test_to_soup_round_trip() {
        let soup = cube_soup();
        let mesh = index_soup(&soup).unwrap();
        assert_eq!(mesh.to_soup(), soup);
        assert_eq!(mesh.triangle(3), Some(soup.triangles()[3]));
        assert_eq!(mesh.triangle(12), None);
    }
}
