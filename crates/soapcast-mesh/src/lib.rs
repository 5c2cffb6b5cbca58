#![warn(missing_docs)]

//! Triangle-soup meshes and indexed mesh construction for soapcast.
//!
//! STL files store every triangle with its own three corners. Renderers
//! want a shared vertex table plus per-triangle indices. This crate loads
//! the former and derives the latter:
//!
//! ```no_run
//! use soapcast_mesh::{index_soup, load_stl};
//!
//! let soup = load_stl("file.stl")?;
//! let mesh = index_soup(&soup)?;
//! println!("{} triangles, {} vertices", mesh.num_triangles(), mesh.num_vertices());
//! # Ok::<(), soapcast_mesh::MeshError>(())
//! ```
//!
//! Vertices are merged only when their coordinates are bit-identical.
//! Near-duplicates produced by numerical noise stay separate.

pub mod error;
pub mod index;
pub mod soup;
pub mod stl;

pub use error::{MeshError, Result};
pub use index::{index_points, index_soup, IndexedMesh};
pub use soup::{Point3, TriangleSoup};
pub use stl::{export_stl, load_stl, read_stl, write_stl};
