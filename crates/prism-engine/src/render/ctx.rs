use crate::paint::Color;

/// Renderer-facing context (device + queue).
///
/// Passed by reference to every renderer call; renderers never own it.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> Self {
        Self { device, queue }
    }
}

/// Target for drawing (encoder + color view).
///
/// `format` and `size` describe the texture behind `color_view`; renderers
/// key their pipelines and depth buffers on them.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub format: wgpu::TextureFormat,
    pub size: (u32, u32),
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        format: wgpu::TextureFormat,
        size: (u32, u32),
    ) -> Self {
        Self {
            encoder,
            color_view,
            format,
            size,
        }
    }
}

/// Load/store behavior of one color pass: clear the viewport, draw, store.
///
/// Built fresh for every frame; nothing here is cached.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderPassConfig {
    pub clear_color: Color,
}

impl RenderPassConfig {
    /// Clear to `color`, then store.
    pub fn clear(color: Color) -> Self {
        Self { clear_color: color }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_config_keeps_color() {
        let cfg = RenderPassConfig::clear(Color::TRANSPARENT);
        assert_eq!(cfg.clear_color, Color::TRANSPARENT);
    }
}
