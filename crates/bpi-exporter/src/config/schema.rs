use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use bpi_core::error::{ExporterError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub exporter: ListenSection,

    #[serde(default)]
    pub upstream: UpstreamSection,

    #[serde(default)]
    pub scheduler: SchedulerSection,

    #[serde(default)]
    pub metric: MetricSection,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            exporter: ListenSection::default(),
            upstream: UpstreamSection::default(),
            scheduler: SchedulerSection::default(),
            metric: MetricSection::default(),
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ExporterError::UnsupportedVersion);
        }

        self.exporter.validate()?;
        self.upstream.validate()?;
        self.scheduler.validate()?;
        self.metric.validate()?;

        if self.scheduler.interval_ms <= self.upstream.timeout_ms {
            return Err(ExporterError::Config(
                "scheduler.interval_ms must be greater than upstream.timeout_ms".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListenSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ListenSection {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

impl ListenSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            ExporterError::Config(format!("exporter.listen must be a valid SocketAddr: {}", self.listen))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamSection {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl UpstreamSection {
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.url)
            .map_err(|e| ExporterError::Config(format!("upstream.url is invalid: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ExporterError::Config(
                "upstream.url must use http or https".into(),
            ));
        }
        if !(100..=120_000).contains(&self.timeout_ms) {
            return Err(ExporterError::Config(
                "upstream.timeout_ms must be between 100 and 120000".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerSection {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Run a single refresh at startup and keep serving its result.
    #[serde(default)]
    pub run_once: bool,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            run_once: false,
        }
    }
}

impl SchedulerSection {
    pub fn validate(&self) -> Result<()> {
        if !(1_000..=86_400_000).contains(&self.interval_ms) {
            return Err(ExporterError::Config(
                "scheduler.interval_ms must be between 1000 and 86400000".into(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricSection {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_subsystem")]
    pub subsystem: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_help")]
    pub help: String,
    #[serde(default = "default_currencies")]
    pub currencies: Vec<String>,
}

impl Default for MetricSection {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            subsystem: default_subsystem(),
            name: default_name(),
            help: default_help(),
            currencies: default_currencies(),
        }
    }
}

impl MetricSection {
    pub fn validate(&self) -> Result<()> {
        for (field, v) in [
            ("namespace", &self.namespace),
            ("subsystem", &self.subsystem),
            ("name", &self.name),
        ] {
            if !is_metric_ident(v) {
                return Err(ExporterError::Config(format!(
                    "metric.{field} must match [a-zA-Z_][a-zA-Z0-9_]*: {v:?}"
                )));
            }
        }

        if self.currencies.is_empty() {
            return Err(ExporterError::Config("metric.currencies must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for c in &self.currencies {
            if c.is_empty() || !c.bytes().all(|b| b.is_ascii_uppercase()) {
                return Err(ExporterError::Config(format!(
                    "metric.currencies entries must be uppercase ASCII codes: {c:?}"
                )));
            }
            if !seen.insert(c.as_str()) {
                return Err(ExporterError::Config(format!(
                    "metric.currencies contains duplicate code: {c}"
                )));
            }
        }
        Ok(())
    }

    /// Fully qualified gauge name: `{namespace}_{subsystem}_{name}`.
    pub fn full_name(&self) -> String {
        format!("{}_{}_{}", self.namespace, self.subsystem, self.name)
    }
}

fn is_metric_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_url() -> String {
    "https://api.coindesk.com/v1/bpi/currentprice.json".into()
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_interval_ms() -> u64 {
    60_000
}
fn default_namespace() -> String {
    "bitcoinIndex".into()
}
fn default_subsystem() -> String {
    "Coindesk".into()
}
fn default_name() -> String {
    "bitcoinPrice".into()
}
fn default_help() -> String {
    "Bitcoin Price Index based on Coindesk API".into()
}
fn default_currencies() -> Vec<String> {
    vec!["USD".into(), "EUR".into(), "GBP".into()]
}
