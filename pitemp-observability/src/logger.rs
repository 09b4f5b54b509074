use tracing_subscriber::EnvFilter;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON lines; anything else is plain text.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Default filter directive when `RUST_LOG` is unset.
pub fn default_level(debug: bool) -> &'static str {
    if debug { "debug" } else { "info" }
}

/// Build the filter: `RUST_LOG` wins, otherwise the debug flag decides.
pub fn env_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(debug)))
}

/// Install the global tracing subscriber. Call once, before anything logs.
pub fn init(debug: bool, format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(debug))
        .with_target(false);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
