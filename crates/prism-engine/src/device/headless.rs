use anyhow::Result;

use super::{adapter, GpuInit};

/// A device and queue without a window surface.
///
/// Used for offscreen-only work: snapshot tooling and the GPU tests.
pub struct HeadlessGpu {
    _instance: wgpu::Instance,
    _adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl HeadlessGpu {
    pub async fn new(init: GpuInit) -> Result<Self> {
        let instance = adapter::create_instance();
        let adapter = adapter::request_adapter(&instance, None, &init).await?;
        let (device, queue) = adapter::request_device(&adapter, &init).await?;

        Ok(Self {
            _instance: instance,
            _adapter: adapter,
            device,
            queue,
        })
    }

    /// Blocking constructor.
    pub fn new_blocking(init: GpuInit) -> Result<Self> {
        pollster::block_on(Self::new(init))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Device for tests, or `None` on machines without any adapter.
    #[cfg(test)]
    pub(crate) fn for_tests() -> Option<Self> {
        match Self::new_blocking(GpuInit {
            power_preference: wgpu::PowerPreference::LowPower,
            required_limits: wgpu::Limits::downlevel_defaults(),
            ..GpuInit::default()
        }) {
            Ok(gpu) => Some(gpu),
            Err(e) => {
                eprintln!("skipping GPU test: {e:#}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsatisfiable_limits_are_a_startup_error() {
        let init = GpuInit {
            required_limits: wgpu::Limits {
                max_texture_dimension_2d: u32::MAX,
                ..wgpu::Limits::default()
            },
            ..GpuInit::default()
        };

        let Err(err) = HeadlessGpu::new_blocking(init) else {
            panic!("device created with impossible limits");
        };
        let msg = format!("{err:#}");
        assert!(
            msg.contains("failed to create wgpu device/queue") || msg.contains("no GPU adapter available"),
            "{msg}"
        );
    }
}
