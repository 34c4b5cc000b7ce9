#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use macaw::app::App;
use macaw::config::load_config;
use macaw::constants::LOOP_TIME;
use macaw::logging::setup_logging;
use tracing::{error, info};

/// Loads the configuration (an optional TOML path is the first argument) and runs the frame loop until quit.
fn run() -> Result<()> {
    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("Could not load configuration from {}", path.display()),
        None => "Could not load configuration".to_string(),
    })?;

    let mut app = App::new(config).context("Could not create app")?;

    info!(loop_time = ?LOOP_TIME, "Starting frame loop");
    while app.run().context("Frame failed")? {}

    info!("Frame loop finished");
    Ok(())
}

pub fn main() {
    setup_logging();

    if let Err(e) = run() {
        error!("{e:#}");
        process::exit(1);
    }
}
