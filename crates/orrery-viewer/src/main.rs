mod app;
mod config;
mod controls;

use orrery_engine::device::GpuInit;
use orrery_engine::logging::{init_logging, LoggingConfig};
use orrery_engine::window::{Runtime, RuntimeConfig};

use crate::app::OrreryApp;
use crate::config::ViewerConfig;

fn main() {
    init_logging(LoggingConfig::default());

    let config = ViewerConfig::from_env();
    log::info!(
        "assets {} | culling {} | post {}",
        config.asset_dir.display(),
        config.culling,
        if config.post_process { "on" } else { "off" }
    );

    let runtime = RuntimeConfig {
        title: config.title.clone(),
        ..RuntimeConfig::default()
    };

    if let Err(e) = Runtime::run(runtime, GpuInit::default(), OrreryApp::new(config)) {
        log::error!("orrery runtime error: {e:#}");
        std::process::exit(1);
    }
}
