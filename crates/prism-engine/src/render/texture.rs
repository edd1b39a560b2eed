use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Frame counters of a texture written by queued render passes.
///
/// Shared through an `Arc` because queue completion callbacks may run on a
/// different thread than the one that submitted.
#[derive(Debug, Default)]
pub struct FrameCounters {
    submitted: AtomicU64,
    completed: AtomicU64,
}

impl FrameCounters {
    /// Records a new submission; returns its 1-based frame number.
    pub fn mark_submitted(&self) -> u64 {
        self.submitted.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Records that `frame` finished on the GPU. Never moves backwards.
    pub fn mark_completed(&self, frame: u64) {
        self.completed.fetch_max(frame, Ordering::AcqRel);
    }

    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Acquire)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }
}

struct Inner {
    id: u64,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
    format: wgpu::TextureFormat,
    frames: Arc<FrameCounters>,
}

/// A GPU texture whose identity is fixed for its lifetime.
///
/// Clones are handles to the same texture. Materials hold one, so pixels
/// written into the texture later show up wherever it is sampled.
#[derive(Clone)]
pub struct SharedTexture {
    inner: Arc<Inner>,
}

impl SharedTexture {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        size: (u32, u32),
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let id = NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed);

        log::debug!("texture #{id} '{label}' created: {}x{} {format:?}", size.0, size.1);

        Self {
            inner: Arc::new(Inner {
                id,
                texture,
                view,
                size,
                format,
                frames: Arc::new(FrameCounters::default()),
            }),
        }
    }

    /// Process-unique identity, stable across clones.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.inner.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.inner.view
    }

    pub fn size(&self) -> (u32, u32) {
        self.inner.size
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.inner.format
    }

    /// True when both handles refer to the same texture.
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn counters(&self) -> Arc<FrameCounters> {
        Arc::clone(&self.inner.frames)
    }

    pub fn submitted_frames(&self) -> u64 {
        self.inner.frames.submitted()
    }

    pub fn completed_frames(&self) -> u64 {
        self.inner.frames.completed()
    }
}

impl std::fmt::Debug for SharedTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedTexture")
            .field("id", &self.inner.id)
            .field("size", &self.inner.size)
            .field("format", &self.inner.format)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_number_frames_from_one() {
        let c = FrameCounters::default();
        assert_eq!(c.mark_submitted(), 1);
        assert_eq!(c.mark_submitted(), 2);
        assert_eq!(c.submitted(), 2);
        assert_eq!(c.completed(), 0);
    }

    #[test]
    fn completion_never_regresses() {
        let c = FrameCounters::default();
        c.mark_completed(3);
        c.mark_completed(2);
        assert_eq!(c.completed(), 3);
    }
}
