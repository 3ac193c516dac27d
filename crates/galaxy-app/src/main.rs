//! The galaxy viewer binary.

use clap::Parser;
use galaxy_app::run_with_config;
use galaxy_config::{CliArgs, Config};

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().map_or_else(Config::default_dir, Ok);

    // Load or create config, then apply CLI overrides
    let mut config = match &config_dir {
        Ok(dir) => Config::load_or_create(dir).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {e}, using defaults");
            Config::default()
        }),
        Err(e) => {
            eprintln!("{e}, using defaults");
            Config::default()
        }
    };
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.as_ref().ok().map(|dir| dir.join("logs"));
    galaxy_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    if let Err(e) = run_with_config(config) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
