use std::path::{Path, PathBuf};

/// Frames beyond this ordinal no longer fit the 3-digit naming scheme.
pub const MAX_PADDED_ORDINAL: usize = 999;

/// A mesh file and its position in the sorted directory listing.
///
/// The ordinal, not the file name, determines the output file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshAsset {
    pub ordinal: usize,
    pub path: PathBuf,
}

impl MeshAsset {
    /// File name for diagnostics (`a.ply`).
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Output image name for this ordinal (`render007.png`).
    pub fn frame_name(&self) -> String {
        frame_name(self.ordinal)
    }
}

/// `render{ordinal:03}.png`.
pub fn frame_name(ordinal: usize) -> String {
    format!("render{ordinal:03}.png")
}

/// Lists the mesh candidates in `dir`, sorted by file name.
///
/// Every regular file is a candidate; subdirectories are skipped. Files
/// that turn out not to be meshes fail later, at load time, and keep their
/// ordinal. The order depends only on the names, so an unchanged directory
/// always yields the same sequence.
pub fn enumerate_meshes(dir: &Path) -> std::io::Result<Vec<MeshAsset>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        // Follows symlinks; dangling links are skipped.
        if entry.path().is_file() {
            paths.push((entry.file_name(), entry.path()));
        }
    }

    paths.sort_by(|a, b| a.0.cmp(&b.0));

    if let Some(warning) = padding_overflow(paths.len(), dir) {
        log::warn!("{warning}");
    }

    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(ordinal, (_, path))| MeshAsset { ordinal, path })
        .collect())
}

/// Warning for a listing whose last frame names no longer fit three digits.
fn padding_overflow(count: usize, dir: &Path) -> Option<String> {
    (count > MAX_PADDED_ORDINAL + 1).then(|| {
        format!(
            "{count} meshes in {}; frame names past {} exceed three digits",
            dir.display(),
            frame_name(MAX_PADDED_ORDINAL)
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    fn names(assets: &[MeshAsset]) -> Vec<String> {
        assets.iter().map(MeshAsset::file_name).collect()
    }

    #[test]
    fn sorted_by_file_name_with_sequential_ordinals() {
        let dir = tempfile::tempdir().unwrap();
        for n in ["c.ply", "a.ply", "b10.ply", "b2.ply"] {
            touch(dir.path(), n);
        }

        let assets = enumerate_meshes(dir.path()).unwrap();
        // Plain lexicographic order, not natural order.
        assert_eq!(names(&assets), ["a.ply", "b10.ply", "b2.ply", "c.ply"]);
        let ordinals: Vec<_> = assets.iter().map(|a| a.ordinal).collect();
        assert_eq!(ordinals, [0, 1, 2, 3]);
    }

    #[test]
    fn repeated_calls_are_stable() {
        let dir = tempfile::tempdir().unwrap();
        for n in ["m3.ply", "m1.ply", "m2.obj", "M0.ply"] {
            touch(dir.path(), n);
        }
        let first = enumerate_meshes(dir.path()).unwrap();
        let second = enumerate_meshes(dir.path()).unwrap();
        assert_eq!(first, second);
        // Uppercase sorts before lowercase.
        assert_eq!(first[0].file_name(), "M0.ply");
    }

    #[test]
    fn subdirectories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.ply");
        std::fs::create_dir(dir.path().join("a_dir")).unwrap();
        let assets = enumerate_meshes(dir.path()).unwrap();
        assert_eq!(names(&assets), ["b.ply"]);
        assert_eq!(assets[0].ordinal, 0);
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(enumerate_meshes(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(enumerate_meshes(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn frame_names_are_zero_padded() {
        assert_eq!(frame_name(0), "render000.png");
        assert_eq!(frame_name(12), "render012.png");
        assert_eq!(frame_name(999), "render999.png");
        assert_eq!(frame_name(1000), "render1000.png");
        let asset = MeshAsset { ordinal: 7, path: PathBuf::from("meshes/x.ply") };
        assert_eq!(asset.frame_name(), "render007.png");
        assert_eq!(asset.file_name(), "x.ply");
    }

    #[test]
    fn thousand_meshes_fit_without_warning() {
        assert_eq!(padding_overflow(1000, Path::new("meshes")), None);
    }

    #[test]
    fn more_than_a_thousand_meshes_warn() {
        let warning = padding_overflow(1001, Path::new("meshes")).unwrap();
        assert!(warning.contains("1001 meshes in meshes"), "{warning}");
        assert!(warning.contains("render999.png"), "{warning}");
    }

    #[test]
    fn ordinals_continue_past_three_digits() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..1001 {
            touch(dir.path(), &format!("m{i:04}.ply"));
        }
        let assets = enumerate_meshes(dir.path()).unwrap();
        assert_eq!(assets.len(), 1001);
        assert_eq!(assets[1000].file_name(), "m1000.ply");
        assert_eq!(assets[1000].frame_name(), "render1000.png");
    }
}
