use crate::duration::DurationError;
use thiserror::Error;

/// Startup errors for the exporter. Every variant is fatal.
#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("Config error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Invalid interval {value:?}: {source}")]
    InvalidInterval {
        value: String,
        #[source]
        source: DurationError,
    },

    #[error("Interval must be positive, got {0:?}")]
    NonPositiveInterval(String),
}

impl From<figment::Error> for ExporterError {
    fn from(e: figment::Error) -> Self {
        ExporterError::Config(Box::new(e))
    }
}
