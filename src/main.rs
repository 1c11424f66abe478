use std::path::PathBuf;
use std::process::ExitCode;

use cosmic_river::{CosmicRiver, RiverConfig};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = RiverConfig::load_or_default(path.as_deref());

    log::info!(
        "Starting Cosmic River: {} particles over {} units",
        config.particle_count,
        config.tunnel_length
    );

    match CosmicRiver::new(config).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
