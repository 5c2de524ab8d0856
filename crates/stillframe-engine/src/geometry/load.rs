use std::path::Path;

use stillframe_ply::TriangleMesh;

use crate::error::MeshLoadError;

/// Reads a mesh file, choosing the decoder by extension (`.ply`, `.obj`).
///
/// Normals are not computed here; see [`TriangleMesh::compute_vertex_normals`].
pub fn load_mesh(path: &Path) -> Result<TriangleMesh, MeshLoadError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let mesh = match ext.as_str() {
        "ply" => load_ply(path)?,
        "obj" => load_obj(path)?,
        _ => return Err(MeshLoadError::UnsupportedFormat { path: path.to_path_buf() }),
    };

    if mesh.is_empty() {
        return Err(MeshLoadError::Empty { path: path.to_path_buf() });
    }

    log::debug!(
        "loaded {}: {} vertices, {} triangles",
        path.display(),
        mesh.vertices.len(),
        mesh.triangles.len()
    );
    Ok(mesh)
}

fn load_ply(path: &Path) -> Result<TriangleMesh, MeshLoadError> {
    let bytes = std::fs::read(path).map_err(|source| MeshLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    stillframe_ply::parse_bytes(&bytes).map_err(|source| MeshLoadError::Ply {
        path: path.to_path_buf(),
        source,
    })
}

fn load_obj(path: &Path) -> Result<TriangleMesh, MeshLoadError> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| match source {
        tobj::LoadError::OpenFileFailed | tobj::LoadError::ReadError => MeshLoadError::Read {
            path: path.to_path_buf(),
            source: std::io::Error::other(source),
        },
        source => MeshLoadError::Obj { path: path.to_path_buf(), source },
    })?;

    // All models of the file are merged into one mesh.
    let mut mesh = TriangleMesh::default();
    for model in models {
        let m = model.mesh;
        let base = mesh.vertices.len() as u32;

        mesh.vertices
            .extend(m.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]));
        if m.vertex_color.len() == m.positions.len() {
            mesh.colors
                .extend(m.vertex_color.chunks_exact(3).map(|c| [c[0], c[1], c[2]]));
        }
        mesh.triangles.extend(
            m.indices
                .chunks_exact(3)
                .map(|t| [base + t[0], base + t[1], base + t[2]]),
        );
    }

    // Colors are per vertex or absent; a partial set is dropped.
    if mesh.colors.len() != mesh.vertices.len() {
        mesh.colors.clear();
    }

    Ok(mesh)
}
