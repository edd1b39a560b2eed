//! Color primitives shared by materials, lights and render passes.

mod color;

pub use color::Color;
