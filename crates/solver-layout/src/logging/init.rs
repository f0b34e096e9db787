use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "debug",
/// "solver_layout=trace,wgpu=warn") and takes precedence over `RUST_LOG`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    /// Level used when neither `env_filter` nor `RUST_LOG` is set.
    pub default_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Config for command-line tools: `verbose` raises the default level to debug.
    pub fn for_cli(verbose: bool) -> Self {
        Self {
            default_level: if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Warn },
            ..Self::default()
        }
    }

    fn filter(&self) -> Option<String> {
        self.env_filter.clone().or_else(|| std::env::var("RUST_LOG").ok())
    }
}

static INIT: Once = Once::new();

/// Installs the global logger once; later calls are ignored.
///
/// A logger installed by someone else (e.g. a test harness) is left in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.filter() {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(config.default_level);
            }
        }
        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let config = LoggingConfig { env_filter: Some("trace".into()), ..LoggingConfig::default() };
        assert_eq!(config.filter().as_deref(), Some("trace"));
    }

    #[test]
    fn cli_levels() {
        assert_eq!(LoggingConfig::for_cli(true).default_level, log::LevelFilter::Debug);
        assert_eq!(LoggingConfig::for_cli(false).default_level, log::LevelFilter::Warn);
    }

    #[test]
    fn init_is_idempotent() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig::default());
    }
}
