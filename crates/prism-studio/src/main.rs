mod app;
mod scenes;

use anyhow::Result;
use winit::dpi::LogicalSize;

use prism_engine::device::GpuInit;
use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::window::{Runtime, RuntimeConfig};

use crate::app::StudioApp;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    Runtime::run(
        RuntimeConfig {
            title: "prism: offscreen render-to-texture".to_string(),
            initial_size: LogicalSize::new(1280.0, 640.0),
        },
        GpuInit::default(),
        StudioApp::new,
    )
}
