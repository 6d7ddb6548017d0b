//! Logging setup using tracing.
//!
//! Logs go to stderr so that command output on stdout stays parseable.
//! `RUST_LOG` overrides the level chosen here.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single-line human readable output.
    #[default]
    Compact,
    /// One JSON object per line, for log aggregation.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Self::default()
        }
    }

    /// Pick the level from `-v`/`-q` flags, falling back to `default`.
    pub fn from_flags(verbose: bool, quiet: bool, default: &str) -> Self {
        let level = if quiet {
            "error"
        } else if verbose {
            "debug"
        } else {
            default
        };
        Self::new(level)
    }

    pub fn json(mut self, enabled: bool) -> Self {
        if enabled {
            self.format = LogFormat::Json;
        }
        self
    }
}

/// Install the global subscriber.
///
/// A second call is a no-op, which keeps tests and embedders safe.
pub fn init_logging(config: &LogConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
