//! Configuration for the galaxy viewer.
//!
//! Settings persist to disk as RON and seed the initial galaxy parameters.
//! CLI flags parsed with clap override whatever the file says. Live edits
//! made in the viewer are never written back.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CameraConfig, Config, DebugConfig, GalaxyConfig, RenderConfig, WindowConfig};
pub use error::ConfigError;
