use anyhow::{Context, Result};

use prism_engine::core::{App, AppControl, FrameCtx};
use prism_engine::device::Gpu;
use prism_engine::input::Key;
use prism_engine::offscreen::{read_rgba8, OffscreenRenderer};
use prism_engine::paint::Color;
use prism_engine::render::SharedTexture;
use prism_engine::view::SceneView;

use crate::scenes::{self, CAMERA_NODE};

const SNAPSHOT_PATH: &str = "offscreen.png";

/// Seconds between window title refreshes.
const TITLE_INTERVAL: f64 = 1.0;

/// Two side-by-side views: the interactive source scene on the left, and a
/// plane showing its offscreen render on the right.
pub struct StudioApp {
    source: SceneView,
    display: SceneView,
    texture: SharedTexture,
    last_title_update: f64,
}

impl StudioApp {
    pub fn new(gpu: &Gpu<'_>) -> Result<Self> {
        let driver = OffscreenRenderer::new(gpu.device(), gpu.queue());
        let texture = driver.texture();

        let mut source = SceneView::new(scenes::source_scene());
        source.set_point_of_view(CAMERA_NODE)?;
        source.set_allows_camera_control(true);
        source.set_background(Color::GREEN);
        source.set_delegate(Box::new(driver));

        let mut display = SceneView::new(scenes::display_scene(texture.clone()));
        display.set_background(Color::GREEN);
        display.set_auto_enables_default_lighting(true);

        log::info!("studio ready: drag to orbit, right-drag to pan, R resets, F12 saves {SNAPSHOT_PATH}");

        Ok(Self {
            source,
            display,
            texture,
            last_title_update: f64::NEG_INFINITY,
        })
    }

    fn save_snapshot(&self, gpu: &Gpu<'_>) -> Result<()> {
        let mut pixels = read_rgba8(gpu.device(), gpu.queue(), &self.texture)?;
        encode_srgb(&mut pixels);
        let (w, h) = self.texture.size();
        image::save_buffer(SNAPSHOT_PATH, &pixels, w, h, image::ColorType::Rgba8)
            .with_context(|| format!("failed to write {SNAPSHOT_PATH}"))?;
        log::info!("offscreen texture saved to {SNAPSHOT_PATH}");
        Ok(())
    }

    fn update_title(&mut self, ctx: &mut FrameCtx<'_, '_>) {
        if ctx.time.elapsed - self.last_title_update < TITLE_INTERVAL {
            return;
        }
        self.last_title_update = ctx.time.elapsed;
        ctx.runtime.set_title(format!(
            "prism: offscreen render-to-texture ({:.0} fps, {} / {} frames done)",
            1.0 / ctx.time.dt.max(f32::EPSILON),
            self.texture.completed_frames(),
            self.texture.submitted_frames(),
        ));
    }
}

/// Converts linear `Rgba8Unorm` texels to sRGB so the PNG matches what the
/// sRGB window surface shows.
fn encode_srgb(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        let srgb = Color::from_rgba8(px[0], px[1], px[2], px[3]).to_srgb().to_rgba8();
        px.copy_from_slice(&srgb);
    }
}

impl App for StudioApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        // ── Keys ──────────────────────────────────────────────────────────
        if ctx.input_frame.key_pressed(Key::Escape) {
            return AppControl::Exit;
        }
        if ctx.input_frame.key_pressed(Key::R) {
            self.source.reset_camera();
        }
        if ctx.input_frame.key_pressed(Key::F12) {
            if let Err(e) = self.save_snapshot(ctx.gpu) {
                log::error!("snapshot failed: {e:#}");
            }
        }

        // ── Camera + offscreen pass ───────────────────────────────────────
        let (left, right) = ctx.surface_viewport().split_horizontal();
        self.source.handle_input(ctx.input, ctx.input_frame, left);
        self.source.will_render(ctx.time.elapsed);
        self.update_title(ctx);

        // ── Render ────────────────────────────────────────────────────────
        let time = ctx.time.elapsed;
        let source = &mut self.source;
        let display = &mut self.display;

        ctx.render(Color::BLACK, |rctx, target| {
            source.draw(rctx, target, left, time);
            display.draw(rctx, target, right, time);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_pixels_are_srgb_encoded() {
        let mut pixels = vec![0, 255, 0, 255, 55, 55, 55, 0];
        encode_srgb(&mut pixels);
        assert_eq!(&pixels[..4], &[0, 255, 0, 255]);
        // Linear 55/255 is roughly sRGB 128; alpha is untouched.
        assert!((126..=130).contains(&pixels[4]), "{pixels:?}");
        assert_eq!(pixels[7], 0);
    }
}
