/// Indexed triangle mesh as read from disk.
///
/// `normals` and `colors` are either empty or hold one entry per vertex.
/// A mesh without triangles is a point cloud.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub vertices: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub triangles: Vec<[u32; 3]>,
}

/// Axis-aligned bounds of a vertex set.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Bounds {
    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }

    /// Length of the box diagonal.
    pub fn diagonal(&self) -> f32 {
        let d = sub(self.max, self.min);
        dot(d, d).sqrt()
    }
}

impl TriangleMesh {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn is_point_cloud(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty() && self.normals.len() == self.vertices.len()
    }

    pub fn has_colors(&self) -> bool {
        !self.colors.is_empty() && self.colors.len() == self.vertices.len()
    }

    /// Returns `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Bounds> {
        let first = *self.vertices.first()?;
        let mut b = Bounds { min: first, max: first };
        for v in &self.vertices[1..] {
            for k in 0..3 {
                b.min[k] = b.min[k].min(v[k]);
                b.max[k] = b.max[k].max(v[k]);
            }
        }
        Some(b)
    }

    /// Recomputes per-vertex normals from the triangles, replacing any
    /// normals read from the file.
    ///
    /// Each vertex receives the sum of the un-normalized face normals of the
    /// triangles that use it (so larger faces weigh more), then the sum is
    /// normalized. Vertices not referenced by any triangle keep a zero normal.
    pub fn compute_vertex_normals(&mut self) {
        let mut acc = vec![[0.0f32; 3]; self.vertices.len()];

        for tri in &self.triangles {
            let [a, b, c] = tri.map(|i| self.vertices[i as usize]);
            let n = cross(sub(b, a), sub(c, a));
            for &i in tri {
                let slot = &mut acc[i as usize];
                slot[0] += n[0];
                slot[1] += n[1];
                slot[2] += n[2];
            }
        }

        for n in &mut acc {
            let len = dot(*n, *n).sqrt();
            if len > f32::EPSILON {
                *n = [n[0] / len, n[1] / len, n[2] / len];
            } else {
                *n = [0.0; 3];
            }
        }

        self.normals = acc;
    }

    /// Unique undirected edges of all triangles, sorted.
    pub fn edges(&self) -> Vec<[u32; 2]> {
        let mut edges: Vec<[u32; 2]> = self
            .triangles
            .iter()
            .flat_map(|&[a, b, c]| [[a, b], [b, c], [c, a]])
            .map(|[u, v]| if u < v { [u, v] } else { [v, u] })
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> TriangleMesh {
        // Unit square in the z = 0 plane, counter-clockwise seen from +z.
        TriangleMesh {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            triangles: vec![[0, 1, 2], [0, 2, 3]],
            ..Default::default()
        }
    }

    fn approx(a: [f32; 3], b: [f32; 3]) -> bool {
        (0..3).all(|k| (a[k] - b[k]).abs() < 1e-5)
    }

    // ── normals ───────────────────────────────────────────────────────────

    #[test]
    fn planar_mesh_normals_face_up() {
        let mut m = quad();
        m.compute_vertex_normals();
        assert_eq!(m.normals.len(), 4);
        for n in &m.normals {
            assert!(approx(*n, [0.0, 0.0, 1.0]), "{n:?}");
        }
    }

    #[test]
    fn normals_replace_file_normals() {
        let mut m = quad();
        m.normals = vec![[1.0, 0.0, 0.0]; 4];
        m.compute_vertex_normals();
        assert!(approx(m.normals[0], [0.0, 0.0, 1.0]));
    }

    #[test]
    fn shared_vertex_normal_is_area_weighted() {
        // Large triangle facing +z and a small one facing +x share vertex 0.
        let mut m = TriangleMesh {
            vertices: vec![
                [0.0, 0.0, 0.0],
                [4.0, 0.0, 0.0],
                [0.0, 4.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
            ],
            triangles: vec![[0, 1, 2], [0, 3, 4]],
            ..Default::default()
        };
        m.compute_vertex_normals();
        let n = m.normals[0];
        assert!(n[2] > n[0], "larger face should dominate: {n:?}");
        assert!((dot(n, n) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn unreferenced_vertices_get_zero_normals() {
        let mut m = quad();
        m.vertices.push([5.0, 5.0, 5.0]);
        m.compute_vertex_normals();
        assert_eq!(m.normals[4], [0.0; 3]);
    }

    #[test]
    fn point_cloud_normals_are_zero() {
        let mut m = TriangleMesh { vertices: vec![[1.0, 2.0, 3.0]], ..Default::default() };
        m.compute_vertex_normals();
        assert!(m.is_point_cloud());
        assert_eq!(m.normals, vec![[0.0; 3]]);
    }

    // ── bounds / edges ────────────────────────────────────────────────────

    #[test]
    fn bounds_cover_all_vertices() {
        let b = quad().bounds().unwrap();
        assert_eq!(b.min, [0.0, 0.0, 0.0]);
        assert_eq!(b.max, [1.0, 1.0, 0.0]);
        assert_eq!(b.center(), [0.5, 0.5, 0.0]);
        assert!((b.diagonal() - 2.0f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        assert!(TriangleMesh::default().bounds().is_none());
    }

    #[test]
    fn edges_are_deduplicated() {
        // Two triangles share the diagonal 0-2: 5 unique edges.
        let edges = quad().edges();
        assert_eq!(edges, vec![[0, 1], [0, 2], [0, 3], [1, 2], [2, 3]]);
    }
}
