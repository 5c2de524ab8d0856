use std::marker::PhantomData;
use std::path::Path;

use stillframe_ply::TriangleMesh;

use crate::error::CaptureWriteError;
use crate::options::RenderOptions;

use super::RenderSurface;

/// Surface created, no options applied yet.
#[derive(Debug)]
pub struct Created;

/// Options applied; geometry may be staged.
#[derive(Debug)]
pub struct Configured;

/// Owns a render surface and tracks its lifecycle in the type.
///
/// ```text
/// Viewer<S, Created> --configure--> Viewer<S, Configured> --stage--> Staged<'_, S>
/// ```
pub struct Viewer<S, State = Created> {
    surface: S,
    _state: PhantomData<State>,
}

impl<S: RenderSurface> Viewer<S, Created> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            _state: PhantomData,
        }
    }

    /// Applies `options` to the surface. Must precede any geometry.
    pub fn configure(mut self, options: &RenderOptions) -> Viewer<S, Configured> {
        self.surface.apply_options(options);
        Viewer {
            surface: self.surface,
            _state: PhantomData,
        }
    }
}

impl<S: RenderSurface> Viewer<S, Configured> {
    /// Computes display normals for `mesh` and places it in the surface.
    ///
    /// Point clouds keep the normals they were loaded with; there are no
    /// faces to derive new ones from. The returned guard borrows the viewer
    /// mutably, so nothing else can be staged until it is retired or dropped.
    pub fn stage(&mut self, mut mesh: TriangleMesh) -> Staged<'_, S> {
        if !mesh.is_point_cloud() {
            mesh.compute_vertex_normals();
        }
        self.surface.add_geometry(mesh);
        Staged {
            surface: &mut self.surface,
            retired: false,
        }
    }
}

impl<S, State> Viewer<S, State> {
    pub fn surface(&self) -> &S {
        &self.surface
    }
}

/// A mesh resident in the surface.
///
/// Dropping the guard removes the mesh; [`Staged::retire`] does the same and
/// returns it.
#[must_use = "a staged mesh is removed as soon as the guard is dropped"]
pub struct Staged<'v, S: RenderSurface> {
    surface: &'v mut S,
    retired: bool,
}

impl<S: RenderSurface> Staged<'_, S> {
    /// Updates the geometry, polls, renders, and writes the frame to `path`,
    /// in that order.
    pub fn render_and_capture(&mut self, path: &Path) -> Result<(), CaptureWriteError> {
        let rendered = self
            .surface
            .update_geometry()
            .and_then(|()| self.surface.poll_events())
            .and_then(|()| self.surface.update_renderer());
        if let Err(reason) = rendered {
            return Err(CaptureWriteError::Render {
                path: path.to_path_buf(),
                reason,
            });
        }

        self.surface.capture_screen_image(path)
    }

    /// Blocks in the surface's user event loop until it is closed.
    pub fn run_interactive(&mut self) -> anyhow::Result<()> {
        self.surface.update_geometry()?;
        self.surface.run()
    }

    /// Removes the mesh from the surface and returns it.
    ///
    /// `None` means the surface had already lost the geometry.
    pub fn retire(mut self) -> Option<TriangleMesh> {
        self.retired = true;
        self.surface.remove_geometry()
    }
}

impl<S: RenderSurface> Drop for Staged<'_, S> {
    fn drop(&mut self) {
        if !self.retired {
            self.surface.remove_geometry();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{Call, RecordingSurface};

    fn triangle() -> TriangleMesh {
        TriangleMesh {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            triangles: vec![[0, 1, 2]],
            ..TriangleMesh::default()
        }
    }

    fn configured() -> (Viewer<RecordingSurface, Configured>, RecordingSurface) {
        let surface = RecordingSurface::new();
        let handle = surface.clone();
        (Viewer::new(surface).configure(&RenderOptions::default()), handle)
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn capture_follows_update_poll_render() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("frame.png");
        let (mut viewer, handle) = configured();

        let mut staged = viewer.stage(triangle());
        staged.render_and_capture(&out).unwrap();
        staged.retire();

        assert_eq!(
            handle.log.borrow().calls,
            [
                Call::ApplyOptions,
                Call::AddGeometry(3),
                Call::UpdateGeometry,
                Call::PollEvents,
                Call::UpdateRenderer,
                Call::Capture(out.clone()),
                Call::RemoveGeometry,
            ]
        );
        assert!(out.exists());
    }

    #[test]
    fn render_failure_skips_capture() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("frame.png");
        let (mut viewer, handle) = configured();
        handle.log.borrow_mut().fail_render = true;

        let mut staged = viewer.stage(triangle());
        let err = staged.render_and_capture(&out).unwrap_err();
        assert!(matches!(err, CaptureWriteError::Render { .. }));
        drop(staged);

        assert!(handle.log.borrow().captures().is_empty());
        assert!(!out.exists());
    }

    #[test]
    fn upload_failure_skips_render_and_capture() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("frame.png");
        let (mut viewer, handle) = configured();
        handle.log.borrow_mut().fail_upload = true;

        let mut staged = viewer.stage(triangle());
        let err = staged.render_and_capture(&out).unwrap_err();
        assert!(err.to_string().contains("device limit"), "{err}");
        drop(staged);

        let calls = &handle.log.borrow().calls;
        assert_eq!(calls[2..], [Call::UpdateGeometry, Call::RemoveGeometry]);
        assert!(!out.exists());
    }

    #[test]
    fn interactive_run_updates_geometry_first() {
        let (mut viewer, handle) = configured();
        let mut staged = viewer.stage(triangle());
        staged.run_interactive().unwrap();
        drop(staged);

        let calls = &handle.log.borrow().calls;
        assert_eq!(calls[2..], [Call::UpdateGeometry, Call::Run, Call::RemoveGeometry]);
    }

    // ── staging ───────────────────────────────────────────────────────────

    #[test]
    fn stage_computes_normals_and_retire_hands_mesh_back() {
        let (mut viewer, handle) = configured();
        let staged = viewer.stage(triangle());
        assert_eq!(handle.log.borrow().slot.as_ref().unwrap().normals.len(), 3);

        let mesh = staged.retire().unwrap();
        assert_eq!(mesh.normals, vec![[0.0, 0.0, 1.0]; 3]);
        assert_eq!(viewer.surface().staged_count(), 0);
    }

    #[test]
    fn point_cloud_keeps_loaded_normals() {
        let (mut viewer, _handle) = configured();
        let cloud = TriangleMesh {
            vertices: vec![[0.0; 3], [1.0; 3]],
            normals: vec![[0.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
            ..TriangleMesh::default()
        };
        let mesh = viewer.stage(cloud.clone()).retire().unwrap();
        assert_eq!(mesh.normals, cloud.normals);
    }

    #[test]
    fn dropping_the_guard_retires() {
        let (mut viewer, handle) = configured();
        drop(viewer.stage(triangle()));
        assert_eq!(viewer.surface().staged_count(), 0);
        assert_eq!(handle.log.borrow().calls.last(), Some(&Call::RemoveGeometry));

        // A second stage sees an empty slot.
        viewer.stage(triangle()).retire();
        assert_eq!(handle.log.borrow().max_staged, 1);
    }

    #[test]
    fn retire_does_not_remove_twice() {
        let (mut viewer, handle) = configured();
        viewer.stage(triangle()).retire();
        let removes = handle
            .log
            .borrow()
            .calls
            .iter()
            .filter(|c| **c == Call::RemoveGeometry)
            .count();
        assert_eq!(removes, 1);
    }
}
