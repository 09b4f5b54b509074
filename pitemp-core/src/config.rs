use crate::duration::{DurationError, parse_duration};
use crate::error::ExporterError;
use figment::value::{Dict, Map, Value};
use figment::{Figment, Metadata, Profile, Provider};
use serde::Deserialize;
use std::env::VarError;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variables read at startup, paired with their config keys.
pub const ENV_VARS: [(&str, &str); 6] = [
    ("METRICS_PATH", "metrics_path"),
    ("NAME", "name"),
    ("TEMP_FILE", "temp_file"),
    ("INTERVAL", "interval"),
    ("DEBUG", "debug"),
    ("PORT", "port"),
];

/// Immutable exporter configuration, built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ExporterConfig {
    /// HTTP path serving the scrape endpoint. Always starts with `/`.
    pub metrics_path: String,
    /// Value of the `name` label on the temperature gauge.
    pub name: String,
    /// Sensor file holding millidegrees Celsius.
    pub temp_file: PathBuf,
    /// Sampling period. Always non-zero.
    pub interval: Duration,
    /// Debug logging and per-request tracing.
    pub debug: bool,
    /// Listen port, without a leading `:`. Validated only when bound.
    pub port: String,
}

/// Raw settings as found in the environment, before normalisation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvSettings {
    #[serde(default)]
    pub metrics_path: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub temp_file: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub debug: Option<String>,
    #[serde(default)]
    pub port: Option<String>,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_metrics_path() -> String { "/metrics".into() }
fn default_temp_file() -> PathBuf { "sys/class/thermal/thermal_zone0/temp".into() }
fn default_interval() -> Duration { Duration::from_secs(10) }
fn default_port() -> String { "8080".into() }

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            metrics_path: default_metrics_path(),
            name: String::new(),
            temp_file: default_temp_file(),
            interval: default_interval(),
            debug: false,
            port: default_port(),
        }
    }
}

// ── Provider ──────────────────────────────────────────────────

/// Figment provider over the exporter's environment variables.
///
/// Values are passed through as strings, untouched. figment's own `Env`
/// provider parses `007` into the number `7`, which would corrupt a label.
pub struct RawEnv<F> {
    lookup: F,
}

impl RawEnv<fn(&str) -> Option<String>> {
    /// Read from the process environment.
    pub fn process() -> Self {
        Self {
            lookup: |var: &str| env_value(std::env::var(var)),
        }
    }
}

/// A set variable is always passed on. Non-UTF-8 bytes become U+FFFD so
/// the value still fails validation instead of reading as unset.
fn env_value(result: Result<String, VarError>) -> Option<String> {
    match result {
        Ok(value) => Some(value),
        Err(VarError::NotUnicode(raw)) => Some(raw.to_string_lossy().into_owned()),
        Err(VarError::NotPresent) => None,
    }
}

impl<F> RawEnv<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Read through an arbitrary lookup function.
    pub fn with_lookup(lookup: F) -> Self {
        Self { lookup }
    }
}

impl<F> Provider for RawEnv<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn metadata(&self) -> Metadata {
        Metadata::named("environment variable(s)")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let mut dict = Dict::new();
        for (var, key) in ENV_VARS {
            if let Some(value) = (self.lookup)(var) {
                dict.insert(key.to_string(), Value::from(value));
            }
        }
        Ok(Profile::Default.collect(dict))
    }
}

// ── Impls ─────────────────────────────────────────────────────

impl ExporterConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ExporterError> {
        Self::from_figment(&Figment::from(RawEnv::process()))
    }

    /// Load configuration from any figment, applying defaults for missing keys.
    pub fn from_figment(figment: &Figment) -> Result<Self, ExporterError> {
        let settings: EnvSettings = figment.extract()?;
        Self::from_settings(settings)
    }

    /// Normalise raw settings. Fails only on a bad interval.
    pub fn from_settings(settings: EnvSettings) -> Result<Self, ExporterError> {
        let metrics_path = settings
            .metrics_path
            .map(|p| format!("/{}", p.strip_prefix('/').unwrap_or(&p)))
            .unwrap_or_else(default_metrics_path);

        let interval = match settings.interval {
            Some(raw) => parse_interval(&raw)?,
            None => default_interval(),
        };

        let port = settings
            .port
            .map(|p| p.strip_prefix(':').unwrap_or(&p).to_string())
            .unwrap_or_else(default_port);

        Ok(Self {
            metrics_path,
            name: settings.name.unwrap_or_default(),
            temp_file: settings
                .temp_file
                .map(PathBuf::from)
                .unwrap_or_else(default_temp_file),
            interval,
            debug: settings.debug.as_deref() == Some("true"),
            port,
        })
    }

    /// Address the scrape endpoint binds to (all interfaces).
    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_interval(raw: &str) -> Result<Duration, ExporterError> {
    match parse_duration(raw) {
        Ok(d) if d.is_zero() => Err(ExporterError::NonPositiveInterval(raw.to_string())),
        Ok(d) => Ok(d),
        Err(DurationError::Negative(_)) => {
            Err(ExporterError::NonPositiveInterval(raw.to_string()))
        }
        Err(source) => Err(ExporterError::InvalidInterval {
            value: raw.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Result<ExporterConfig, ExporterError> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let provider = RawEnv::with_lookup(move |var: &str| env.get(var).cloned());
        ExporterConfig::from_figment(&Figment::from(provider))
    }

    // ── Defaults ──────────────────────────────────────────────────

    #[test]
    fn empty_environment_yields_defaults() {
        let cfg = from_vars(&[]).unwrap();
        assert_eq!(cfg, ExporterConfig::default());
        assert_eq!(cfg.metrics_path, "/metrics");
        assert_eq!(cfg.name, "");
        assert_eq!(
            cfg.temp_file,
            PathBuf::from("sys/class/thermal/thermal_zone0/temp")
        );
        assert_eq!(cfg.interval, Duration::from_secs(10));
        assert!(!cfg.debug);
        assert_eq!(cfg.port, "8080");
    }

    #[test]
    fn default_listen_addr_binds_all_interfaces() {
        assert_eq!(ExporterConfig::default().listen_addr(), "0.0.0.0:8080");
    }

    // ── Normalisation ─────────────────────────────────────────────

    #[test]
    fn metrics_path_gets_exactly_one_leading_slash() {
        assert_eq!(from_vars(&[("METRICS_PATH", "prom")]).unwrap().metrics_path, "/prom");
        assert_eq!(from_vars(&[("METRICS_PATH", "/prom")]).unwrap().metrics_path, "/prom");
        assert_eq!(from_vars(&[("METRICS_PATH", "")]).unwrap().metrics_path, "/");
    }

    #[test]
    fn port_leading_colon_is_stripped() {
        let cfg = from_vars(&[("PORT", ":9100")]).unwrap();
        assert_eq!(cfg.port, "9100");
        assert_eq!(cfg.listen_addr(), "0.0.0.0:9100");
        assert_eq!(from_vars(&[("PORT", "9100")]).unwrap().port, "9100");
    }

    #[test]
    fn debug_is_enabled_only_by_exact_true() {
        assert!(from_vars(&[("DEBUG", "true")]).unwrap().debug);
        assert!(!from_vars(&[("DEBUG", "TRUE")]).unwrap().debug);
        assert!(!from_vars(&[("DEBUG", "1")]).unwrap().debug);
        assert!(!from_vars(&[("DEBUG", "yes")]).unwrap().debug);
    }

    #[test]
    fn numeric_looking_name_is_kept_verbatim() {
        let cfg = from_vars(&[("NAME", "007")]).unwrap();
        assert_eq!(cfg.name, "007");
    }

    #[test]
    fn temp_file_and_name_are_taken_as_is() {
        let cfg = from_vars(&[
            ("TEMP_FILE", "/sys/class/thermal/thermal_zone1/temp"),
            ("NAME", "rack-pi"),
        ])
        .unwrap();
        assert_eq!(
            cfg.temp_file,
            PathBuf::from("/sys/class/thermal/thermal_zone1/temp")
        );
        assert_eq!(cfg.name, "rack-pi");
    }

    // ── Interval ──────────────────────────────────────────────────

    #[test]
    fn interval_accepts_duration_strings() {
        let cfg = from_vars(&[("INTERVAL", "1m30s")]).unwrap();
        assert_eq!(cfg.interval, Duration::from_secs(90));
    }

    #[test]
    fn malformed_interval_is_a_startup_error() {
        let err = from_vars(&[("INTERVAL", "notaduration")]).unwrap_err();
        assert!(
            matches!(err, ExporterError::InvalidInterval { ref value, .. } if value == "notaduration"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn zero_or_negative_interval_is_rejected() {
        for raw in ["0", "0s", "-5s"] {
            let err = from_vars(&[("INTERVAL", raw)]).unwrap_err();
            assert!(
                matches!(err, ExporterError::NonPositiveInterval(_)),
                "{raw}: unexpected error {err}"
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_interval_is_malformed_not_unset() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(vec![b'1', 0xff, b's']);
        let value = env_value(Err(VarError::NotUnicode(raw))).unwrap();
        assert_eq!(value, "1\u{fffd}s");

        let err = from_vars(&[("INTERVAL", value.as_str())]).unwrap_err();
        assert!(
            matches!(err, ExporterError::InvalidInterval { .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn unset_variable_reads_as_none() {
        assert_eq!(env_value(Err(VarError::NotPresent)), None);
        assert_eq!(env_value(Ok("5s".to_string())), Some("5s".to_string()));
    }

    #[test]
    fn empty_interval_is_malformed() {
        let err = from_vars(&[("INTERVAL", "")]).unwrap_err();
        assert!(matches!(err, ExporterError::InvalidInterval { .. }));
    }

    // ── Figment layering ──────────────────────────────────────────

    #[test]
    fn later_providers_override_earlier_ones() {
        let figment = Figment::new()
            .merge(("interval", "5s"))
            .merge(("interval", "20s"))
            .merge(("name", "pi-4"));
        let cfg = ExporterConfig::from_figment(&figment).unwrap();
        assert_eq!(cfg.interval, Duration::from_secs(20));
        assert_eq!(cfg.name, "pi-4");
    }
}
