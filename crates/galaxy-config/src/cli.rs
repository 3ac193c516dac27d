//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Galaxy viewer command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "galaxy", about = "Procedural spiral galaxy viewer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of points in the initial galaxy.
    #[arg(long)]
    pub points: Option<usize>,

    /// Galaxy radius.
    #[arg(long)]
    pub radius: Option<f32>,

    /// Number of spiral arms.
    #[arg(long)]
    pub branches: Option<u32>,

    /// Fixed RNG seed for reproducible galaxies.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Serve the debug API on this port (implies enabling it).
    #[arg(long)]
    pub debug_port: Option<u16>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(points) = args.points {
            self.galaxy.params.total_points = points;
        }
        if let Some(radius) = args.radius {
            self.galaxy.params.radius = radius;
        }
        if let Some(branches) = args.branches {
            self.galaxy.params.branch_count = branches;
        }
        if let Some(seed) = args.seed {
            self.galaxy.seed = Some(seed);
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(port) = args.debug_port {
            self.debug.api_enabled = true;
            self.debug.api_port = port;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            points: Some(100_000),
            seed: Some(5),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.galaxy.params.total_points, 100_000);
        assert_eq!(config.galaxy.seed, Some(5));
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 720);
        assert_eq!(config.galaxy.params.branch_count, 8);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_debug_port_enables_api() {
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs {
            debug_port: Some(9911),
            ..Default::default()
        });
        assert!(config.debug.api_enabled);
        assert_eq!(config.debug.api_port, 9911);
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::parse_from(["galaxy", "--branches", "3", "--radius", "2.5"]);
        assert_eq!(args.branches, Some(3));
        assert_eq!(args.radius, Some(2.5));
        assert!(args.points.is_none());
    }
}
