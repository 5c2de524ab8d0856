//! Mode controller.
//!
//! A session owns the render surface from creation to teardown and drives
//! it either over every mesh in a directory (batch) or over a single mesh
//! with a user-driven preview before the capture (interactive).

mod config;
mod controller;
mod report;

pub use config::{Mode, SessionConfig};
pub use controller::run_session;
pub use report::{CapturedFrame, SessionReport, SkippedMesh};
