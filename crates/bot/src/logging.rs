use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

impl LogLevel {
    /// `EnvFilter` directive for the level; HTTP and SQL internals stay at warn.
    pub fn directive(&self) -> String {
        let level = match self {
            LogLevel::None => return "off".to_string(),
            LogLevel::All => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        };
        format!("{},hyper=warn,reqwest=warn,sqlx=warn", level)
    }
}

/// `RUST_LOG` overrides the command-line level when set.
pub fn init(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
