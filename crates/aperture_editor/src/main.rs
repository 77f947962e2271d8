// SPDX-License-Identifier: MIT OR Apache-2.0
//! Aperture editor demo driver.
//!
//! Usage: `aperture_editor [config.ron]`
//!
//! Plays a sample camera profile at 20 ticks per second and logs the camera
//! pose. Set `RUST_LOG` to adjust verbosity.

use std::path::PathBuf;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing() -> Result<(), ParseError> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("aperture_editor=debug".parse()?)
        .add_directive("aperture_camera=debug".parse()?);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
    Ok(())
}

fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Invalid log filter: {e}");
        std::process::exit(1);
    }

    tracing::info!("Starting Aperture Editor v{}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let result = aperture_editor::driver::load_config(config_path.as_deref())
        .and_then(|config| aperture_editor::driver::play(config, aperture_editor::driver::sample_profile()));

    match result {
        Ok(report) => tracing::info!(
            ticks = report.ticks,
            frames = report.frames,
            saved = report.saved,
            "Demo finished"
        ),
        Err(e) => {
            tracing::error!("Demo failed: {e}");
            std::process::exit(1);
        }
    }
}
