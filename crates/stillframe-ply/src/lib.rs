//! Reader for the **PLY** polygon file format.
//!
//! This crate is intentionally dependency-free so it can be consumed by
//! conversion tools and tests without pulling in any engine or GPU code.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`header`] | `Header`, `Element`, `Property`, `parse_header` |
//! | [`mesh`] | `TriangleMesh`, `Bounds`, vertex normal computation |
//! | [`error`] | `ParseError`, `Location` |
//!
//! Supported: `ascii 1.0`, `binary_little_endian 1.0`, `binary_big_endian 1.0`;
//! vertex `x y z` with optional `nx ny nz` and `red green blue`; faces as a
//! `vertex_indices` (or `vertex_index`) list, fan-triangulated. Other elements
//! and properties are read and skipped.
//!
//! # Quick start
//!
//! ```rust
//! let src = b"ply
//! format ascii 1.0
//! element vertex 3
//! property float x
//! property float y
//! property float z
//! element face 1
//! property list uchar int vertex_indices
//! end_header
//! 0 0 0
//! 1 0 0
//! 0 1 0
//! 3 0 1 2
//! ";
//!
//! let mut mesh = stillframe_ply::parse_bytes(src).unwrap();
//! mesh.compute_vertex_normals();
//! assert_eq!(mesh.triangles, vec![[0, 1, 2]]);
//! assert_eq!(mesh.normals[0], [0.0, 0.0, 1.0]);
//! ```

mod body;
pub mod error;
pub mod header;
pub mod mesh;

pub use error::{Location, ParseError};
pub use header::{parse_header, Format, Header};
pub use mesh::{Bounds, TriangleMesh};

/// Parses a complete `.ply` file held in memory.
pub fn parse_bytes(input: &[u8]) -> Result<TriangleMesh, ParseError> {
    let parsed = parse_header(input)?;
    body::read_body(
        &parsed.header,
        &input[parsed.body_offset..],
        parsed.body_offset,
        parsed.line_count,
    )
}
