use std::path::PathBuf;

/// One written image.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedFrame {
    pub ordinal: usize,
    pub source: PathBuf,
    pub path: PathBuf,
}

/// A mesh that failed to load; its ordinal has no frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedMesh {
    pub ordinal: usize,
    pub source: PathBuf,
    /// Rendered load error.
    pub reason: String,
}

/// Outcome of a completed session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionReport {
    pub frames: Vec<CapturedFrame>,
    pub skipped: Vec<SkippedMesh>,
}

impl SessionReport {
    pub fn log_summary(&self) {
        if self.skipped.is_empty() {
            log::info!("{} frame(s) captured", self.frames.len());
            return;
        }

        let ordinals: Vec<String> = self.skipped.iter().map(|s| s.ordinal.to_string()).collect();
        log::warn!(
            "{} frame(s) captured, {} mesh(es) skipped (ordinals {})",
            self.frames.len(),
            self.skipped.len(),
            ordinals.join(", ")
        );
    }
}
