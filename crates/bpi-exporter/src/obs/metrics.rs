//! Price gauge registry plus exporter self-metrics.
//!
//! All series are handles into one `PrometheusRecorder` that is owned by this
//! struct and never installed as the global recorder. Gauge handles are atomic
//! f64 cells, so a scrape observes either the previous or the new value of a
//! label, never a partial write. The set of currency gauges is fixed at
//! construction time.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use metrics::{Counter, Gauge, Key, KeyName, Label, Metadata, Recorder};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

use bpi_core::{ErrorKind, PriceQuote};

use crate::config::MetricSection;

/// Content type of the text exposition format.
pub const SCRAPE_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const CURRENCY_LABEL: &str = "currency";
const CYCLES_TOTAL: &str = "bpi_exporter_cycles_total";
const LAST_SUCCESS: &str = "bpi_exporter_last_success_timestamp_seconds";
const DRAINING: &str = "bpi_exporter_draining";

static METADATA: Metadata<'static> =
    Metadata::new(module_path!(), metrics::Level::INFO, Some(module_path!()));

pub struct ExporterMetrics {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    rate_name: String,
    rates: HashMap<String, Gauge>,
    last_success: Gauge,
    draining_gauge: Gauge,
    draining: AtomicBool,
}

impl ExporterMetrics {
    /// Register one gauge per currency, all starting at 0.
    pub fn new(cfg: &MetricSection) -> Self {
        Self::with_labels(cfg.full_name(), &cfg.help, &cfg.currencies)
    }

    pub fn with_labels<S: AsRef<str>>(name: String, help: &str, currencies: &[S]) -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        recorder.describe_gauge(KeyName::from(name.clone()), None, help.to_string().into());
        let rates = currencies
            .iter()
            .map(|c| {
                let code = c.as_ref().to_string();
                let key = Key::from_parts(name.clone(), vec![Label::new(CURRENCY_LABEL, code.clone())]);
                let gauge = recorder.register_gauge(&key, &METADATA);
                gauge.set(0.0);
                (code, gauge)
            })
            .collect();

        recorder.describe_counter(
            KeyName::from(CYCLES_TOTAL),
            None,
            "Refresh cycles completed, by outcome.".into(),
        );
        recorder.describe_gauge(
            KeyName::from(LAST_SUCCESS),
            None,
            "Unix time of the last successful refresh.".into(),
        );
        let last_success = recorder.register_gauge(&Key::from_name(LAST_SUCCESS), &METADATA);
        let draining_gauge = recorder.register_gauge(&Key::from_name(DRAINING), &METADATA);

        Self {
            recorder,
            handle,
            rate_name: name,
            rates,
            last_success,
            draining_gauge,
            draining: AtomicBool::new(false),
        }
    }

    /// Name of the price gauge family.
    pub fn rate_name(&self) -> &str {
        &self.rate_name
    }

    /// Currency labels known to the registry.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.rates.keys().map(String::as_str)
    }

    /// Copy every numeric rate of `quote` into its gauge.
    ///
    /// Currencies absent from the quote keep their value. Currencies outside
    /// the configured set are ignored with a warning. Returns the number of
    /// gauges set.
    pub fn update(&self, quote: &PriceQuote) -> usize {
        let mut updated = 0;
        let mut unknown = Vec::new();
        for (code, rate) in quote.rates() {
            match self.rates.get(code) {
                Some(gauge) => {
                    gauge.set(rate);
                    updated += 1;
                }
                None => unknown.push(code),
            }
        }
        if !unknown.is_empty() {
            tracing::warn!(currencies = ?unknown, "ignoring rates for unconfigured currencies");
        }
        updated
    }

    /// Count a finished refresh cycle. `None` means success.
    pub fn record_cycle(&self, failure: Option<ErrorKind>) {
        let outcome = failure.map_or("success", ErrorKind::as_str);
        self.cycles(outcome).increment(1);
        if failure.is_none() {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs_f64())
                .unwrap_or_default();
            self.last_success.set(now);
        }
    }

    fn cycles(&self, outcome: &'static str) -> Counter {
        let key = Key::from_parts(CYCLES_TOTAL, vec![Label::new("outcome", outcome)]);
        self.recorder.register_counter(&key, &METADATA)
    }

    /// Mark draining state.
    pub fn set_draining(&self) {
        self.draining.store(true, Ordering::Relaxed);
        self.draining_gauge.set(1.0);
    }
    /// Return whether draining is active.
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Relaxed)
    }

    /// Render every series in the text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}
