//! Utilities: logging setup (console verbosity + optional log file) and
//! terminal width detection.
//!
//! Key items:
//!   init_logging / derive_level
//!   terminal_width

/// Logging helpers.
pub mod logging {
    use std::fs::OpenOptions;
    use std::path::Path;
    use std::sync::Mutex;

    use anyhow::{Context, Result};
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, registry};

    /// Verbose level to console filter: 0 warnings and errors only,
    /// 1 (the default) adds info, 2 debug, anything higher trace.
    pub fn derive_level(verbose_level: u8) -> LevelFilter {
        match verbose_level {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Install the global subscriber.
    ///
    /// Console messages go to stderr as bare text. With `log_file`, every
    /// DEBUG-or-higher event is also appended there with timestamp, level
    /// and target. A subscriber installed earlier in the process stays in
    /// place.
    pub fn init_logging(console: LevelFilter, log_file: Option<&Path>) -> Result<()> {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .without_time()
            .with_target(false)
            .with_level(false)
            .with_filter(console);

        let file_layer = match log_file {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
                Some(
                    fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_filter(LevelFilter::DEBUG),
                )
            }
            None => None,
        };

        if registry()
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .is_err()
        {
            tracing::trace!("logging already initialised");
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn verbosity_maps_to_levels() {
            assert_eq!(derive_level(0), LevelFilter::WARN);
            assert_eq!(derive_level(1), LevelFilter::INFO);
            assert_eq!(derive_level(2), LevelFilter::DEBUG);
            assert_eq!(derive_level(7), LevelFilter::TRACE);
        }

        #[test]
        fn log_file_must_be_openable() {
            let dir = tempfile::tempdir().unwrap();
            let missing = dir.path().join("no/such/dir/app.log");
            let err = init_logging(LevelFilter::WARN, Some(&missing)).unwrap_err();
            assert!(err.to_string().contains("Failed to open log file"));

            let ok = dir.path().join("app.log");
            init_logging(LevelFilter::WARN, Some(&ok)).unwrap();
            assert!(ok.exists());
        }
    }
}

pub use logging::{derive_level, init_logging};

/// Terminal width from `COLUMNS`, if set to a positive number.
pub fn terminal_width() -> Option<usize> {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|w| *w > 0)
}
