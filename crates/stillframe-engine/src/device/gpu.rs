use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};

use super::ContextInit;

/// Owns the wgpu core objects.
///
/// Unlike a window-bound context this one is created without a surface, so
/// batch rendering works on machines with no display. The interactive
/// preview creates its window surface later from [`Gpu::instance`].
pub struct Gpu {
    /// wgpu instance used to create the adapter and, later, window surfaces.
    instance: wgpu::Instance,

    /// Selected adapter.
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Validation and out-of-memory errors raised outside an explicit check.
    /// Drained by [`Gpu::take_error`].
    errors: Arc<Mutex<Vec<String>>>,
}

impl Gpu {
    /// Creates a headless GPU context.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: &ContextInit) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("stillframe device"),
                required_features: wgpu::Features::empty(),
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        // Replaces wgpu's default handler, which panics.
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);
        device.on_uncaptured_error(Arc::new(move |e: wgpu::Error| {
            log::error!("wgpu error: {e}");
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(e.to_string());
        }));

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            errors,
        })
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Processes completed GPU work and fires pending callbacks. Never blocks.
    pub fn poll(&self) -> Result<()> {
        self.device
            .poll(wgpu::PollType::Poll)
            .context("device poll failed")?;
        Ok(())
    }

    /// Fails with the first device error reported since the last call.
    pub fn take_error(&self) -> Result<()> {
        drain_errors(&self.errors)
    }

    pub fn submit(&self, encoder: wgpu::CommandEncoder) -> wgpu::SubmissionIndex {
        self.queue.submit(std::iter::once(encoder.finish()))
    }

    /// Blocks until the work of `index` has finished and its callbacks have
    /// fired, or `timeout` elapses.
    pub fn wait(&self, index: wgpu::SubmissionIndex, timeout: Duration) -> Result<()> {
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: Some(index),
                timeout: Some(timeout),
            })
            .context("waiting for the GPU failed")?;
        self.take_error()
    }
}

fn drain_errors(errors: &Mutex<Vec<String>>) -> Result<()> {
    let pending = std::mem::take(&mut *errors.lock().unwrap_or_else(PoisonError::into_inner));
    match pending.split_first() {
        None => Ok(()),
        Some((first, [])) => anyhow::bail!("GPU error: {first}"),
        Some((first, rest)) => anyhow::bail!("GPU error: {first} (and {} more)", rest.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drained_errors_are_reported_once() {
        let errors = Mutex::new(vec!["buffer too large".to_string(), "bad bind".to_string()]);
        let err = drain_errors(&errors).unwrap_err();
        assert_eq!(err.to_string(), "GPU error: buffer too large (and 1 more)");
        assert!(drain_errors(&errors).is_ok());
    }

    #[test]
    fn no_errors_is_ok() {
        assert!(drain_errors(&Mutex::new(Vec::new())).is_ok());
    }
}
