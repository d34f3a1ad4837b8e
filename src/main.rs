use std::process::ExitCode;

use env_logger::Env;
use obstacle_cam::{frame_loop::run_headless, AppConfig, ObstacleCamApp};

const DEFAULT_LOG_FILTER: &str =
    "info,obstacle_cam=info,wgpu_hal=off,wgpu_core=off,wgpu=off,naga=off";

fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    if let Some(frames) = config.headless_frames {
        run_headless(&config, frames)?;
        return Ok(());
    }

    ObstacleCamApp::new(config)?.run()
}

fn main() -> ExitCode {
    // RUST_LOG overrides the default filter.
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .format_timestamp_secs()
        .try_init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
