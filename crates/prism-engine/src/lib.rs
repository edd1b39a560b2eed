//! Prism engine crate.
//!
//! Platform and GPU runtime plus a small scene graph, a lit mesh renderer,
//! interactive scene views and render-to-texture.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod paint;
pub mod render;
pub mod scene;
pub mod offscreen;
pub mod view;
