use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::coords::Viewport;
use crate::paint::Color;
use crate::render::{RenderCtx, RenderPassConfig, RenderTarget, SceneRenderer, SharedTexture};
use crate::scene::{PointOfView, Scene};
use crate::view::FrameHook;

use super::readback;
use super::target::{create_offscreen_texture, OFFSCREEN_FORMAT, OFFSCREEN_SIZE};

/// Scene time passed to every offscreen render.
const OFFSCREEN_TIME: f64 = 0.0;

const STATS_INTERVAL: Duration = Duration::from_secs(1);

/// Renders a scene into a fixed 1024x1024 texture on demand.
///
/// Owns everything the offscreen path needs: device and queue handles, its
/// own `SceneRenderer` and the target texture. The texture handle never
/// changes; only its pixels do. Submissions go to the same queue as the
/// window's frames, so anything sampling the texture later in the frame sees
/// the new contents.
pub struct OffscreenRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    renderer: SceneRenderer,
    texture: SharedTexture,

    last_submission: Option<wgpu::SubmissionIndex>,

    stats_since: Instant,
    stats_frames: u64,
}

impl OffscreenRenderer {
    /// Creates and seeds the target texture. Default lighting is enabled.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let texture = create_offscreen_texture(device, queue);

        Self {
            device: device.clone(),
            queue: queue.clone(),
            renderer: SceneRenderer::new().with_default_lighting(true),
            texture,
            last_submission: None,
            stats_since: Instant::now(),
            stats_frames: 0,
        }
    }

    /// Handle to the target texture; clones share identity and contents.
    pub fn texture(&self) -> SharedTexture {
        self.texture.clone()
    }

    /// Records one pass of `scene` seen from `pov` and submits it.
    ///
    /// The pass clears to transparent black and stores. Returns without
    /// waiting for the GPU; completion is reported through
    /// `completed_frames`.
    pub fn render(&mut self, scene: &Scene, pov: &PointOfView) -> wgpu::SubmissionIndex {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("prism offscreen encoder"),
            });

        {
            let ctx = RenderCtx::new(&self.device, &self.queue);
            let mut target = RenderTarget::new(
                &mut encoder,
                self.texture.view(),
                OFFSCREEN_FORMAT,
                (OFFSCREEN_SIZE, OFFSCREEN_SIZE),
            );
            self.renderer.render(
                &ctx,
                &mut target,
                scene,
                pov,
                Viewport::full(OFFSCREEN_SIZE, OFFSCREEN_SIZE),
                OFFSCREEN_TIME,
                &RenderPassConfig::clear(Color::TRANSPARENT),
            );
        }

        let counters = self.texture.counters();
        let frame = counters.mark_submitted();
        let submission = self.queue.submit(std::iter::once(encoder.finish()));
        self.queue
            .on_submitted_work_done(move || counters.mark_completed(frame));

        self.last_submission = Some(submission.clone());
        self.log_stats();
        submission
    }

    pub fn submitted_frames(&self) -> u64 {
        self.texture.submitted_frames()
    }

    pub fn completed_frames(&self) -> u64 {
        self.texture.completed_frames()
    }

    /// Blocks until every submitted frame has finished on the GPU.
    pub fn wait_idle(&self) -> Result<()> {
        let Some(submission) = self.last_submission.clone() else {
            return Ok(());
        };
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: Some(submission),
                timeout: None,
            })
            .context("failed waiting for offscreen submissions")?;
        Ok(())
    }

    /// Waits for pending frames, then copies the texture to the CPU.
    pub fn read_pixels(&self) -> Result<Vec<u8>> {
        self.wait_idle()?;
        readback::read_rgba8(&self.device, &self.queue, &self.texture)
    }

    fn log_stats(&mut self) {
        self.stats_frames += 1;
        let elapsed = self.stats_since.elapsed();
        if elapsed < STATS_INTERVAL {
            return;
        }
        log::debug!(
            "offscreen: {:.1} frames/s, submitted={} completed={}",
            self.stats_frames as f64 / elapsed.as_secs_f64(),
            self.submitted_frames(),
            self.completed_frames(),
        );
        self.stats_since = Instant::now();
        self.stats_frames = 0;
    }
}

impl FrameHook for OffscreenRenderer {
    fn will_render_scene(&mut self, scene: &Scene, pov: &PointOfView, _time: f64) {
        self.render(scene, pov);
    }
}
