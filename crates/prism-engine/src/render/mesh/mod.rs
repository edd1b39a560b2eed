//! Lit, depth-tested mesh rendering of scene graphs.

mod common;
mod lighting;
mod pipeline;
mod scene_renderer;

pub use scene_renderer::SceneRenderer;
