use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "mosaic_engine=debug,wgpu=warn"). When absent, `RUST_LOG` is consulted,
/// then `default_level`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,
    /// Caps wgpu's own crates at `warn` unless the filter names them.
    pub quiet_wgpu: bool,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            quiet_wgpu: true,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

/// Filter string handed to `env_logger`, given the `RUST_LOG` value.
pub(crate) fn filter_spec(config: &LoggingConfig, rust_log: Option<&str>) -> String {
    let mut spec = config
        .env_filter
        .as_deref()
        .or(rust_log)
        .map(str::to_owned)
        .unwrap_or_else(|| config.default_level.to_string().to_lowercase());

    if config.quiet_wgpu && !spec.contains("wgpu") {
        spec.push_str(",wgpu_core=warn,wgpu_hal=warn,naga=warn");
    }
    spec
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// This function is idempotent; subsequent calls are ignored.
/// Intended usage is early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let rust_log = std::env::var("RUST_LOG").ok();
        let spec = filter_spec(&config, rust_log.as_deref());

        env_logger::Builder::new()
            .parse_filters(&spec)
            .write_style(config.write_style)
            .init();

        log::debug!("logging initialized ({spec})");
    });
}
