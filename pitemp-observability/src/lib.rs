pub mod logger;
pub mod metrics;
pub mod prometheus_exporter;

pub use metrics::TemperatureGauge;
pub use prometheus_exporter::{CONTENT_TYPE, render_metrics};
