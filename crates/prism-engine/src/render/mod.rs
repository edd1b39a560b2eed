//! GPU rendering subsystem.
//!
//! Renderers walk `scene` graphs and issue GPU commands via wgpu.
//! Each renderer is responsible for its own GPU resources (pipelines, buffers).
//!
//! Convention:
//! - World space is right-handed, +Y up; cameras look down their local -Z.
//! - Viewports are physical pixels of the target (top-left origin, +Y down).

mod ctx;
mod mesh;
mod texture;

pub use ctx::{RenderCtx, RenderPassConfig, RenderTarget};
pub use mesh::SceneRenderer;
pub use texture::{FrameCounters, SharedTexture};
