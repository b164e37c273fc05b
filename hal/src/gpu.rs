use std::sync::Arc;

use futures::executor::block_on;
use wgpu::{Backends, Device, Instance, PowerPreference, Queue, RequestAdapterOptions};

/// Shared GPU context: a live wgpu device and queue.
///
/// `new` returns `None` on machines without a usable adapter; callers treat
/// that as "run the CPU reference path".
#[derive(Debug)]
pub struct GpuContext {
    pub device: Arc<Device>,
    pub queue: Arc<Queue>,
}

impl GpuContext {
    pub fn new() -> Option<Self> {
        let instance = Instance::new(wgpu::InstanceDescriptor {
            backends: Backends::all(),
            ..Default::default()
        });

        let adapter = block_on(instance.request_adapter(&RequestAdapterOptions {
            power_preference: PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))?;

        let (device, queue) = block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("recon-hal device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
            },
            None,
        ))
        .ok()?;

        Some(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_never_panics() {
        // May or may not find an adapter depending on the machine; both are fine.
        let _ = GpuContext::new();
    }
}
