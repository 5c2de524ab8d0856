use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};

use super::Gpu;

/// Color format of the off-screen target. Shaders output linear color.
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Upper bound for a single frame readback.
const READBACK_TIMEOUT: Duration = Duration::from_secs(30);

/// Depth buffer matching a color target of the same size.
pub struct DepthTarget {
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl DepthTarget {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("stillframe depth"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            width,
            height,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Recreates the buffer if the size changed.
    pub fn ensure_size(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.width != width || self.height != height {
            *self = Self::new(device, width, height);
        }
    }
}

/// Fixed-size color + depth target that frames are rendered into and read
/// back from.
pub struct OffscreenTarget {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth: DepthTarget,
    width: u32,
    height: u32,
}

impl OffscreenTarget {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Result<Self> {
        let max = device.limits().max_texture_dimension_2d;
        anyhow::ensure!(
            width > 0 && height > 0 && width <= max && height <= max,
            "render size {width}x{height} is outside 1..={max}"
        );

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("stillframe offscreen color"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            color,
            color_view,
            depth: DepthTarget::new(device, width, height),
            width,
            height,
        })
    }

    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.color_view
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        self.depth.view()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Copies the color texture to host memory as opaque RGB.
    ///
    /// Blocks until the copy has finished; everything submitted before the
    /// call is finished afterwards.
    pub fn read_rgb(&self, gpu: &Gpu) -> Result<image::RgbImage> {
        let bytes_per_pixel = 4u32;
        let unpadded = bytes_per_pixel * self.width;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;

        let staging = gpu.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("stillframe readback"),
            size: u64::from(padded) * u64::from(self.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("stillframe readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(self.height),
                },
            },
            extent(self.width, self.height),
        );
        let copy = gpu.submit(encoder);

        let slice = staging.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        gpu.wait(copy, READBACK_TIMEOUT)
            .context("timed out waiting for frame readback")?;
        map_result(rx.try_recv())?;

        let mut rgb = Vec::with_capacity((self.width * self.height * 3) as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks_exact(padded as usize) {
                for px in row[..unpadded as usize].chunks_exact(4) {
                    rgb.extend_from_slice(&px[..3]);
                }
            }
        }
        staging.unmap();

        image::RgbImage::from_raw(self.width, self.height, rgb)
            .context("readback produced a buffer of the wrong size")
    }
}

/// Interprets the map callback's outcome once the copy has completed.
fn map_result(
    received: Result<Result<(), wgpu::BufferAsyncError>, mpsc::TryRecvError>,
) -> Result<()> {
    match received {
        Ok(result) => result.context("failed to map readback buffer"),
        Err(mpsc::TryRecvError::Empty) => {
            anyhow::bail!("readback buffer was not mapped after the copy finished")
        }
        Err(mpsc::TryRecvError::Disconnected) => {
            anyhow::bail!("readback callback was dropped without a result")
        }
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}
