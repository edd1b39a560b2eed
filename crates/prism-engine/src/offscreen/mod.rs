//! Render-to-texture.
//!
//! `OffscreenRenderer` draws a scene into a fixed-size RGBA8 texture each
//! time it is triggered; any material holding the texture handle samples the
//! latest contents.

mod driver;
mod readback;
mod target;

pub use driver::OffscreenRenderer;
pub use readback::read_rgba8;
pub use target::{create_offscreen_texture, seed_pixels, OFFSCREEN_FORMAT, OFFSCREEN_SIZE, SEED_COLOR};
