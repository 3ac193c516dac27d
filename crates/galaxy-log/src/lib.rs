//! Structured logging for the galaxy viewer.
//!
//! Console output with uptime timestamps, plus a JSON log file in debug
//! builds. `RUST_LOG` wins over the configured level. Crates that log through
//! the `log` facade are captured by `tracing-subscriber`'s log bridge.

use std::fs::File;
use std::path::Path;

use galaxy_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Noise suppression for the GPU stack, appended to every configured level.
const GPU_DIRECTIVES: &str = "wgpu=warn,wgpu_core=warn,wgpu_hal=warn,naga=warn";

pub const LOG_FILE_NAME: &str = "galaxy.log";

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (debug builds only)
/// * `debug_build` - enables the file layer
/// * `config` - supplies `debug.log_level` when `RUST_LOG` is unset
///
/// ```no_run
/// use galaxy_config::Config;
/// use galaxy_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = filter_directives(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && let Some(log_file) = open_log_file(log_dir)
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        tracing::debug!(dir = %log_dir.display(), "File logging enabled");
        return;
    }

    subscriber.init();
}

/// Filter string used when `RUST_LOG` is not set.
///
/// A bare level from the config (e.g. `"debug"`) gets the GPU noise
/// directives appended. A full directive list is used verbatim.
pub fn filter_directives(config: Option<&Config>) -> String {
    let level = config
        .map(|c| c.debug.log_level.trim())
        .filter(|level| !level.is_empty())
        .unwrap_or("info");

    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("{level},{GPU_DIRECTIVES}")
    }
}

/// The default filter: `info` everywhere, `warn` for the GPU stack.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(filter_directives(None))
}

fn open_log_file(log_dir: &Path) -> Option<File> {
    std::fs::create_dir_all(log_dir).ok()?;
    File::create(log_dir.join(LOG_FILE_NAME)).ok()
}
