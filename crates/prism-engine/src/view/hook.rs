use crate::scene::{PointOfView, Scene};

/// Per-frame observer registered on a `SceneView`.
///
/// Called on the render thread once per displayed frame, before the view
/// draws, with the view's scene, its current point of view and the frame's
/// absolute time in seconds.
pub trait FrameHook {
    fn will_render_scene(&mut self, scene: &Scene, pov: &PointOfView, time: f64);
}

impl<F> FrameHook for F
where
    F: FnMut(&Scene, &PointOfView, f64),
{
    fn will_render_scene(&mut self, scene: &Scene, pov: &PointOfView, time: f64) {
        self(scene, pov, time)
    }
}
