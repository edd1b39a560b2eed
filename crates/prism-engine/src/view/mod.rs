//! Interactive scene views.
//!
//! A `SceneView` pairs a scene with a viewpoint, a background and a renderer.
//! Frame hooks registered on a view run right before it draws; the offscreen
//! driver is hooked up this way.

mod hook;
mod orbit;
mod scene_view;

pub use hook::FrameHook;
pub use orbit::OrbitController;
pub use scene_view::SceneView;
