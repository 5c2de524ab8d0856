//! Mesh discovery and decoding.

mod load;
mod sources;

pub use load::load_mesh;
pub use sources::{enumerate_meshes, frame_name, MeshAsset, MAX_PADDED_ORDINAL};
