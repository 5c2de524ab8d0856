use std::sync::Once;

/// Filter used when neither the config nor `RUST_LOG` names one.
///
/// Per-mesh progress is logged at info; wgpu and naga are chatty below warn.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "debug",
/// "stillframe_engine=debug,wgpu_core=warn") and takes precedence over
/// `RUST_LOG`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Prefix records with a millisecond timestamp.
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            timestamps: true,
        }
    }
}

static INIT: Once = Once::new();

/// Installs the global logger. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let env = std::env::var("RUST_LOG").ok();
        let filter = effective_filter(config.env_filter.as_deref(), env.as_deref());

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(filter);
        builder.write_style(config.write_style);
        if config.timestamps {
            builder.format_timestamp_millis();
        } else {
            builder.format_timestamp(None);
        }
        builder.init();

        log::debug!("logging initialized with filter {filter:?}");
    });
}

fn effective_filter<'a>(configured: Option<&'a str>, env: Option<&'a str>) -> &'a str {
    let usable = |f: Option<&'a str>| f.filter(|f| !f.trim().is_empty());
    usable(configured).or(usable(env)).unwrap_or(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_filter_wins_over_environment() {
        assert_eq!(effective_filter(Some("debug"), Some("trace")), "debug");
    }

    #[test]
    fn environment_is_used_when_unconfigured() {
        assert_eq!(effective_filter(None, Some("warn")), "warn");
    }

    #[test]
    fn blank_or_missing_filter_falls_back_to_default() {
        assert_eq!(effective_filter(None, None), DEFAULT_FILTER);
        assert_eq!(effective_filter(Some("  "), None), DEFAULT_FILTER);
        assert_eq!(effective_filter(None, Some("")), DEFAULT_FILTER);
    }

    #[test]
    fn blank_configured_filter_defers_to_environment() {
        assert_eq!(effective_filter(Some("  "), Some("warn")), "warn");
    }
}
