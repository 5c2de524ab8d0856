use std::path::Path;

use serde::de::Error as _;

use crate::error::ConfigLoadError;

use super::RenderOptions;

/// Reads and validates a render-options file.
pub fn load_render_options(path: &Path) -> Result<RenderOptions, ConfigLoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let options = parse(&text).map_err(|source| ConfigLoadError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("render options loaded from {}: {options:?}", path.display());
    Ok(options)
}

fn parse(text: &str) -> Result<RenderOptions, serde_json::Error> {
    let options: RenderOptions = serde_json::from_str(text)?;

    for (name, value) in [("point_size", options.point_size), ("line_width", options.line_width)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(serde_json::Error::custom(format!(
                "{name} must be a positive number, got {value}"
            )));
        }
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ColorMode, ShadeMode};
    use std::io::Write;

    fn write_tmp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn open3d_style_file_loads() {
        let f = write_tmp(
            r#"{
                "background_color" : [ 0.0, 0.0, 0.0 ],
                "class_name" : "RenderOption",
                "default_mesh_color" : [ 0.7, 0.7, 0.7 ],
                "image_max_depth" : 3000,
                "light_on" : true,
                "line_width" : 1.0,
                "mesh_color_option" : 1,
                "mesh_shade_option" : 1,
                "mesh_show_back_face" : true,
                "mesh_show_wireframe" : false,
                "point_color_option" : 9,
                "point_show_normal" : false,
                "point_size" : 3.0,
                "version_major" : 1,
                "version_minor" : 0
            }"#,
        );
        let o = load_render_options(f.path()).unwrap();
        assert_eq!(o.background_color, [0.0, 0.0, 0.0]);
        assert_eq!(o.mesh_shade_option, ShadeMode::Smooth);
        assert_eq!(o.point_color_option, ColorMode::Normal);
        assert_eq!(o.point_size, 3.0);
        assert!(o.mesh_show_back_face);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let f = write_tmp(r#"{ "point_size": 2.0 }"#);
        let o = load_render_options(f.path()).unwrap();
        assert_eq!(o.point_size, 2.0);
        assert_eq!(o, RenderOptions { point_size: 2.0, ..RenderOptions::default() });
    }

    #[test]
    fn empty_object_is_all_defaults() {
        let f = write_tmp("{}");
        assert_eq!(load_render_options(f.path()).unwrap(), RenderOptions::default());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_render_options(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Read { .. }));
    }

    #[test]
    fn syntax_error_is_malformed() {
        let f = write_tmp(r#"{ "point_size": 2.0,"#);
        let err = load_render_options(f.path()).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Malformed { .. }));
    }

    #[test]
    fn wrong_type_is_malformed() {
        let f = write_tmp(r#"{ "light_on": "yes" }"#);
        assert!(matches!(
            load_render_options(f.path()).unwrap_err(),
            ConfigLoadError::Malformed { .. }
        ));
    }

    #[test]
    fn unknown_enum_value_is_malformed() {
        let f = write_tmp(r#"{ "mesh_color_option": 7 }"#);
        assert!(load_render_options(f.path()).is_err());
    }

    #[test]
    fn non_positive_point_size_is_malformed() {
        let f = write_tmp(r#"{ "point_size": 0 }"#);
        let err = load_render_options(f.path()).unwrap_err();
        assert!(err.to_string().contains("point_size"));
    }
}
