/// Initialization parameters for the render context.
#[derive(Debug, Clone)]
pub struct ContextInit {
    /// Off-screen target width in pixels. Captured images have this size.
    pub width: u32,

    /// Off-screen target height in pixels.
    pub height: u32,

    /// Title of the interactive preview window.
    pub title: String,

    /// Backends wgpu may pick an adapter from.
    pub backends: wgpu::Backends,

    pub power_preference: wgpu::PowerPreference,

    /// Limits requested from the adapter/device.
    ///
    /// The default limits allow 8192px textures, enough for the default 1920x1080.
    pub required_limits: wgpu::Limits,
}

impl Default for ContextInit {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            title: "stillframe".to_string(),
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_limits: wgpu::Limits::default(),
        }
    }
}
