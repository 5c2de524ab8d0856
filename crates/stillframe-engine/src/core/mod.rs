//! Staging contract between the mode controller and a render surface.
//!
//! `RenderSurface` is the raw, side-effecting API a drawing surface offers.
//! `Viewer` and `Staged` wrap it in a typestate so that options are applied
//! before geometry, at most one geometry is staged at a time, and a capture
//! always follows a geometry update and a render.

mod surface;
mod viewer;

#[cfg(test)]
pub(crate) mod testing;

pub use surface::RenderSurface;
pub use viewer::{Configured, Created, Staged, Viewer};
