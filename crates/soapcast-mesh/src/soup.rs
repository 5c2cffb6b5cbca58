//! Triangle soup: every triangle owns its three corners.

use crate::error::{MeshError, Result};

/// A 3D point as stored by STL files.
pub type Point3 = [f32; 3];

/// A mesh where each triangle stores independent copies of its corners.
///
/// Coincident corners of adjacent triangles are not shared. Use
/// [`crate::index_soup`] to derive the indexed form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleSoup {
    triangles: Vec<[Point3; 3]>,
}

impl TriangleSoup {
    /// Create a soup from complete triangles.
    pub fn new(triangles: Vec<[Point3; 3]>) -> Self {
        Self { triangles }
    }

    /// Create a soup from a flat point sequence.
    ///
    /// Points are grouped in consecutive runs of three. Fails with
    /// [`MeshError::InvalidMeshShape`] if the count is not a multiple of 3.
    pub fn from_points(points: &[Point3]) -> Result<Self> {
        if points.len() % 3 != 0 {
            return Err(MeshError::InvalidMeshShape(format!(
                "{} points do not form complete triangles",
                points.len()
            )));
        }
        let triangles = points
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Ok(Self { triangles })
    }

    /// Create a soup from flat coordinates `[x0, y0, z0, x1, y1, z1, ...]`.
    pub fn from_flat(coords: &[f32]) -> Result<Self> {
        if coords.len() % 3 != 0 {
            return Err(MeshError::InvalidMeshShape(format!(
                "{} coordinates do not form complete points",
                coords.len()
            )));
        }
        let points: Vec<Point3> = coords
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Self::from_points(&points)
    }

    /// Triangles in input order.
    pub fn triangles(&self) -> &[[Point3; 3]] {
        &self.triangles
    }

    /// All corners in input order (`3 * len()` points).
    pub fn points(&self) -> &[Point3] {
        self.triangles.as_flattened()
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Check if the soup has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Axis-aligned bounds `(min, max)`, or `None` for an empty soup.
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        point_bounds(self.points())
    }
}

/// Compute axis-aligned bounds of a point set.
pub(crate) fn point_bounds<'a>(
    points: impl IntoIterator<Item = &'a Point3>,
) -> Option<(Point3, Point3)> {
    let mut iter = points.into_iter();
    let first = *iter.next()?;
    let mut min = first;
    let mut max = first;

    for p in iter {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }

    Some((min, max))
}
