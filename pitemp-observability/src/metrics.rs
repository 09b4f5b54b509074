use crate::prometheus_exporter::render_metrics;
use prometheus::core::Collector;
use prometheus::{GaugeVec, Opts, Registry};

pub const METRIC_NAME: &str = "pi_temperature";
pub const METRIC_HELP: &str = "The current temperature of the Raspberry Pi in degrees Celsius.";
pub const LABEL_NAME: &str = "name";

/// Latest temperature reading per `name` label.
///
/// Backed by a prometheus `GaugeVec`, whose per-series value is a single
/// atomic `f64`: readers see either the old or the new value, never a mix.
/// Series are created lazily on the first `set` and never evicted.
///
/// Cloning is cheap and every clone shares the same series.
#[derive(Clone)]
pub struct TemperatureGauge {
    registry: Registry,
    gauge: GaugeVec,
}

impl TemperatureGauge {
    /// Create the gauge in a fresh registry.
    ///
    /// On Linux the registry also carries the process collector
    /// (`process_cpu_seconds_total`, `process_resident_memory_bytes`, ...).
    pub fn new() -> anyhow::Result<Self> {
        let gauge = Self::without_process_metrics()?;

        #[cfg(target_os = "linux")]
        gauge
            .registry
            .register(Box::new(prometheus::process_collector::ProcessCollector::for_self()))?;

        Ok(gauge)
    }

    /// Create the gauge in a registry holding nothing else.
    pub fn without_process_metrics() -> anyhow::Result<Self> {
        let registry = Registry::new();
        let gauge = GaugeVec::new(Opts::new(METRIC_NAME, METRIC_HELP), &[LABEL_NAME])?;
        registry.register(Box::new(gauge.clone()))?;
        Ok(Self { registry, gauge })
    }

    /// Replace the value stored for `label`.
    #[inline]
    pub fn set(&self, label: &str, value: f64) {
        self.gauge.with_label_values(&[label]).set(value);
    }

    /// Current value for `label`, without creating the series.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.snapshot()
            .into_iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v)
    }

    /// Every stored `(label, value)` pair, sorted by label.
    pub fn snapshot(&self) -> Vec<(String, f64)> {
        let mut values: Vec<(String, f64)> = self
            .gauge
            .collect()
            .iter()
            .flat_map(|family| family.get_metric())
            .map(|metric| {
                let label = metric
                    .get_label()
                    .iter()
                    .find(|pair| pair.get_name() == LABEL_NAME)
                    .map(|pair| pair.get_value().to_string())
                    .unwrap_or_default();
                (label, metric.get_gauge().get_value())
            })
            .collect();
        values.sort_by(|a, b| a.0.cmp(&b.0));
        values
    }

    /// Render the whole registry in text exposition format.
    pub fn render(&self) -> String {
        render_metrics(&self.registry)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
