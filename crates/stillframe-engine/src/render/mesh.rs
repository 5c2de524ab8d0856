use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use stillframe_ply::{Bounds, TriangleMesh};
use wgpu::util::DeviceExt;

use crate::options::srgb_to_linear;

// ── vertex layouts ────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Linear RGB; zero when the mesh has no colors.
    pub color: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x3  // color
    ];

    /// Per-vertex for triangles, per-instance for point sprites.
    pub(super) fn layout(step_mode: wgpu::VertexStepMode) -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode,
            attributes: &Self::ATTRS,
        }
    }
}

/// One wireframe edge, expanded to a screen-space quad in the shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct EdgeInstance {
    pub a: [f32; 3],
    pub b: [f32; 3],
}

impl EdgeInstance {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // a
        1 => Float32x3  // b
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<EdgeInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

// ── gpu mesh ──────────────────────────────────────────────────────────────

/// GPU copy of a staged mesh.
///
/// Buffers are immutable; a changed mesh is uploaded again.
pub struct GpuMesh {
    pub(super) vertices: wgpu::Buffer,
    pub(super) vertex_count: u32,

    /// `None` for point clouds.
    pub(super) indices: Option<wgpu::Buffer>,
    pub(super) index_count: u32,

    pub(super) edges: Option<wgpu::Buffer>,
    pub(super) edge_count: u32,

    pub(super) has_colors: bool,
    bounds: Bounds,
}

impl GpuMesh {
    /// Uploads `mesh`. Returns `Ok(None)` for a mesh without vertices.
    ///
    /// Normals missing from the mesh are uploaded as zero, which the shader
    /// renders unlit. Fails without touching the device when a buffer would
    /// exceed `max_buffer_size`.
    pub fn upload(device: &wgpu::Device, mesh: &TriangleMesh) -> Result<Option<Self>> {
        let Some(bounds) = mesh.bounds() else { return Ok(None) };
        let has_normals = mesh.has_normals();
        let has_colors = mesh.has_colors();

        let edge_list = mesh.edges();
        check_buffer_sizes(
            buffer_sizes(mesh.vertices.len(), mesh.triangles.len(), edge_list.len()),
            device.limits().max_buffer_size,
        )?;

        let vertices: Vec<Vertex> = mesh
            .vertices
            .iter()
            .enumerate()
            .map(|(i, &position)| Vertex {
                position,
                normal: if has_normals { mesh.normals[i] } else { [0.0; 3] },
                color: if has_colors {
                    mesh.colors[i].map(|c| srgb_to_linear(c.clamp(0.0, 1.0)))
                } else {
                    [0.0; 3]
                },
            })
            .collect();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("stillframe mesh vbo"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let (indices, index_count) = if mesh.triangles.is_empty() {
            (None, 0)
        } else {
            let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("stillframe mesh ibo"),
                contents: bytemuck::cast_slice(&mesh.triangles),
                usage: wgpu::BufferUsages::INDEX,
            });
            (Some(ibo), (mesh.triangles.len() * 3) as u32)
        };

        let edge_instances: Vec<EdgeInstance> = edge_list
            .into_iter()
            .map(|[a, b]| EdgeInstance {
                a: mesh.vertices[a as usize],
                b: mesh.vertices[b as usize],
            })
            .collect();

        let (edges, edge_count) = if edge_instances.is_empty() {
            (None, 0)
        } else {
            let buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("stillframe mesh edges"),
                contents: bytemuck::cast_slice(&edge_instances),
                usage: wgpu::BufferUsages::VERTEX,
            });
            (Some(buf), edge_instances.len() as u32)
        };

        Ok(Some(Self {
            vertices: vertex_buffer,
            vertex_count: vertices.len() as u32,
            indices,
            index_count,
            edges,
            edge_count,
            has_colors,
            bounds,
        }))
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn is_point_cloud(&self) -> bool {
        self.indices.is_none()
    }
}

// ── limits ────────────────────────────────────────────────────────────────

/// Byte sizes of the vertex, index and edge buffers for a mesh of the given
/// element counts.
fn buffer_sizes(vertices: usize, triangles: usize, edges: usize) -> [(&'static str, u64); 3] {
    let bytes = |count: usize, stride: usize| (count as u64).saturating_mul(stride as u64);
    [
        ("vertex", bytes(vertices, std::mem::size_of::<Vertex>())),
        ("index", bytes(triangles, std::mem::size_of::<[u32; 3]>())),
        ("edge", bytes(edges, std::mem::size_of::<EdgeInstance>())),
    ]
}

fn check_buffer_sizes(sizes: [(&'static str, u64); 3], max_buffer_size: u64) -> Result<()> {
    for (name, size) in sizes {
        anyhow::ensure!(
            size <= max_buffer_size,
            "mesh {name} buffer needs {size} bytes; the device allows {max_buffer_size}"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_layouts_match_shader_strides() {
        assert_eq!(std::mem::size_of::<Vertex>(), 36);
        assert_eq!(std::mem::size_of::<EdgeInstance>(), 24);
    }

    #[test]
    fn sizes_scale_with_element_counts() {
        assert_eq!(
            buffer_sizes(10, 4, 3),
            [("vertex", 360), ("index", 48), ("edge", 72)]
        );
    }

    #[test]
    fn oversized_vertex_buffer_is_rejected() {
        // 7.5M vertices at 36 bytes exceed the default 256 MiB limit.
        let limit = wgpu::Limits::default().max_buffer_size;
        let err = check_buffer_sizes(buffer_sizes(7_500_000, 0, 0), limit).unwrap_err();
        assert!(err.to_string().contains("vertex buffer"), "{err}");
    }

    #[test]
    fn sizes_at_the_limit_are_accepted() {
        assert!(check_buffer_sizes(buffer_sizes(1, 0, 0), 36).is_ok());
        assert!(check_buffer_sizes(buffer_sizes(2, 0, 0), 36).is_err());
    }

    #[test]
    fn huge_counts_saturate_instead_of_wrapping() {
        let [(_, v), _, _] = buffer_sizes(usize::MAX, 0, 0);
        assert_eq!(v, u64::MAX);
    }
}
