use std::fs::OpenOptions;
use std::path::PathBuf;

use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode, WriteLogger};

use crate::config::{LoggingSettings, expand_path};

/// Parse a level name (`off`, `error`, … `trace`), case-insensitively.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    level.trim().parse().ok()
}

/// The file to log to, or `None` for stderr.
pub fn log_path(settings: &LoggingSettings) -> Option<PathBuf> {
    let file = settings.file.trim();
    if file.is_empty() {
        None
    } else {
        Some(expand_path(file))
    }
}

/// Install the global logger.
/// Best-effort: failures are reported on stderr and the run continues unlogged.
pub fn init(settings: &LoggingSettings) {
    let Some(level) = parse_level(&settings.level) else {
        eprintln!("shlower: unknown log level {:?}, logging disabled", settings.level);
        return;
    };
    if level == LevelFilter::Off {
        return;
    }
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();

    let result = match log_path(settings) {
        Some(path) => {
            if let Some(dir) = path.parent() {
                let _ = std::fs::create_dir_all(dir);
            }
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => WriteLogger::init(level, config, file),
                Err(e) => {
                    eprintln!("shlower: cannot open log file {}: {e}", path.display());
                    return;
                }
            }
        }
        None => TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto),
    };
    if let Err(e) = result {
        eprintln!("shlower: logger setup failed: {e}");
    }
}
