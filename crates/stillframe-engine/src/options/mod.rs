//! Render appearance options.
//!
//! The on-disk format is a JSON object using the same keys as Open3D's
//! `RenderOption` JSON, so existing `renderOptions.json` files load as-is.
//! Unknown keys are ignored and missing keys take the defaults below.

mod load;

pub use load::load_render_options;

use serde::Deserialize;

/// How surface normals are chosen for lighting.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
#[serde(try_from = "u8")]
pub enum ShadeMode {
    /// One normal per triangle, derived from screen-space derivatives.
    Flat,
    /// Interpolated vertex normals.
    Smooth,
}

impl TryFrom<u8> for ShadeMode {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Flat),
            1 => Ok(Self::Smooth),
            other => Err(format!("unknown shade option {other}")),
        }
    }
}

/// Source of per-fragment color.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
#[serde(try_from = "u8")]
pub enum ColorMode {
    /// Vertex colors when present, otherwise the default mesh color.
    Default,
    /// Same as `Default`; kept distinct because files spell it differently.
    Color,
    XCoordinate,
    YCoordinate,
    ZCoordinate,
    /// Normal direction mapped into RGB.
    Normal,
}

impl ColorMode {
    /// Value understood by `mesh.wgsl`.
    pub fn shader_code(self) -> u32 {
        match self {
            Self::Default | Self::Color => 0,
            Self::XCoordinate => 1,
            Self::YCoordinate => 2,
            Self::ZCoordinate => 3,
            Self::Normal => 4,
        }
    }
}

impl TryFrom<u8> for ColorMode {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Default),
            1 => Ok(Self::Color),
            2 => Ok(Self::XCoordinate),
            3 => Ok(Self::YCoordinate),
            4 => Ok(Self::ZCoordinate),
            9 => Ok(Self::Normal),
            other => Err(format!("unknown color option {other}")),
        }
    }
}

/// Immutable appearance record applied to a render context before the first
/// geometry is staged.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Clear color, straight sRGB in `[0, 1]`.
    pub background_color: [f32; 3],
    /// Point sprite size in pixels, for meshes without faces.
    pub point_size: f32,
    /// Wireframe line width in pixels.
    pub line_width: f32,
    pub light_on: bool,
    pub mesh_shade_option: ShadeMode,
    pub mesh_color_option: ColorMode,
    pub point_color_option: ColorMode,
    pub mesh_show_back_face: bool,
    pub mesh_show_wireframe: bool,
    /// Surface color used when the mesh has no vertex colors.
    pub default_mesh_color: [f32; 3],
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            background_color: [1.0, 1.0, 1.0],
            point_size: 5.0,
            line_width: 1.0,
            light_on: true,
            mesh_shade_option: ShadeMode::Flat,
            mesh_color_option: ColorMode::Color,
            point_color_option: ColorMode::Default,
            mesh_show_back_face: false,
            mesh_show_wireframe: false,
            default_mesh_color: [0.7, 0.7, 0.7],
        }
    }
}

impl RenderOptions {
    /// Background as a wgpu clear color.
    ///
    /// The off-screen target is an sRGB format, so the straight sRGB value is
    /// converted to linear here.
    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b] = self.background_color.map(|c| srgb_to_linear(c.clamp(0.0, 1.0)) as f64);
        wgpu::Color { r, g, b, a: 1.0 }
    }
}

pub(crate) fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_color_is_linear_and_opaque() {
        let mut o = RenderOptions::default();
        o.background_color = [1.0, 0.0, 0.5];
        let c = o.clear_color();
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 0.214).abs() < 1e-3);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn clear_color_clamps_out_of_range_channels() {
        let mut o = RenderOptions::default();
        o.background_color = [2.0, -1.0, 0.0];
        let c = o.clear_color();
        assert_eq!((c.r, c.g), (1.0, 0.0));
    }

    #[test]
    fn color_mode_codes() {
        assert_eq!(ColorMode::try_from(9).unwrap(), ColorMode::Normal);
        assert_eq!(ColorMode::Normal.shader_code(), 4);
        assert_eq!(ColorMode::Default.shader_code(), ColorMode::Color.shader_code());
        assert!(ColorMode::try_from(5).is_err());
        assert!(ShadeMode::try_from(2).is_err());
    }
}
