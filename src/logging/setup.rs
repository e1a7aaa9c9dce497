use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::formatter::BracketedFormatter;

/// Target whose per-entry warnings are part of the console output
const ORGANIZER_TARGET: &str = "species_sorter::data::organizer";

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Organizer warnings stay visible
/// even when `level` is quieter than `warn`. When `log_dir` is given, events
/// are also written to a timestamped file in that directory, whose path is
/// returned.
pub fn setup_logging(level: &str, log_dir: Option<&Path>) -> io::Result<Option<PathBuf>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
            match organizer_floor(level) {
                Some(directive) => filter.add_directive(directive),
                None => filter,
            }
        }
    };

    let log_file = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            let path = dir.join(format!("species_sorter_{}.log", timestamp));
            let file = fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)?;
            Some((path, file))
        }
        None => None,
    };

    let (log_path, file_layer) = match log_file {
        Some((path, file)) => {
            let layer = fmt::layer()
                .event_format(BracketedFormatter::file())
                .with_writer(Mutex::new(file))
                .with_ansi(false);
            (Some(path), Some(layer))
        }
        None => (None, None),
    };

    let stdout_layer = fmt::layer()
        .event_format(BracketedFormatter::console())
        .with_writer(io::stdout);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    if let Some(path) = &log_path {
        info!("Log file created at: {:?}", path);
    }

    Ok(log_path)
}

/// Directive keeping organizer warnings when `level` is a plain level quieter
/// than `warn`.
fn organizer_floor(level: &str) -> Option<Directive> {
    let parsed = LevelFilter::from_str(level.trim()).ok()?;
    if parsed >= LevelFilter::WARN {
        return None;
    }
    Directive::from_str(&format!("{}=warn", ORGANIZER_TARGET)).ok()
}
