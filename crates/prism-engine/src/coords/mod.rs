//! Screen-space coordinates.
//!
//! Viewports are expressed in physical pixels because they feed wgpu viewport
//! and scissor state directly.

mod viewport;

pub use viewport::Viewport;
