use log::LevelFilter;
use std::env;

/// Set up logging for the command-line tool. Fill progress and statistics are logged at `debug`
/// level, so they only show up if `debug_enabled` is set or `RUST_LOG` asks for them.
///
/// Calling this more than once is harmless; only the first call installs a logger.
pub fn init_logger(debug_enabled: bool) {
    let level = if debug_enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    // Let RUST_LOG override our defaults if explicitly set
    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    if builder.try_init().is_ok() {
        log::debug!("Logger initialized at {level:?} level");
    }
}

#[cfg(test)]
mod tests {
    use crate::logging::init_logger;

    #[test]
    fn test_init_logger_twice() {
        init_logger(true);
        init_logger(false);
        log::debug!("still logging");
    }
}
