use crate::source::{SampleError, read_celsius};
use pitemp_observability::TemperatureGauge;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("sampling interval must be positive")]
pub struct ZeroInterval;

/// Periodically copies the sensor reading into the gauge.
///
/// One task owns the timer and is the only writer, so samples are applied
/// in order and never overlap. The loop has no stop signal; it lives as long
/// as the runtime.
pub struct Sampler {
    temp_file: PathBuf,
    label: String,
    interval: Duration,
    gauge: TemperatureGauge,
}

impl Sampler {
    pub fn new(
        temp_file: impl Into<PathBuf>,
        label: impl Into<String>,
        interval: Duration,
        gauge: TemperatureGauge,
    ) -> Result<Self, ZeroInterval> {
        if interval.is_zero() {
            return Err(ZeroInterval);
        }
        Ok(Self {
            temp_file: temp_file.into(),
            label: label.into(),
            interval,
            gauge,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// One read → convert → publish cycle.
    ///
    /// On failure the gauge is left as it was.
    pub fn tick(&self) -> Result<f64, SampleError> {
        let temp = read_celsius(&self.temp_file)?;
        debug!(temp, "Updating temperature");
        self.gauge.set(&self.label, temp);
        Ok(temp)
    }

    /// Spawn the sampling loop on the current tokio runtime.
    ///
    /// The first sample is taken one interval after start. Ticks missed
    /// because a cycle overran are dropped rather than replayed.
    pub fn start(self) -> JoinHandle<()> {
        info!(interval = ?self.interval, "Starting temperature monitor");
        tokio::spawn(self.run())
    }

    /// Reads run inline on the runtime worker with a blocking `std::fs`
    /// call. Sensor files live in sysfs and return immediately.
    async fn run(self) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if let Err(e) = self.tick() {
                error!(error = %e, "Temperature sample skipped");
            }
        }
    }
}
