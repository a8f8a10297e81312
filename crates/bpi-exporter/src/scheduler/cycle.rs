//! Refresh cycle: one fetch-decode-update pass and the interval loop driving it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use bpi_core::{decode, ErrorKind, ExporterError, PriceQuote};

use crate::fetch::QuoteSource;
use crate::obs::ExporterMetrics;

/// Result of one refresh cycle.
#[derive(Debug)]
pub enum FetchOutcome {
    Success(PriceQuote),
    Failure { kind: ErrorKind, message: String },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    pub fn failure_kind(&self) -> Option<ErrorKind> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<ExporterError> for FetchOutcome {
    fn from(e: ExporterError) -> Self {
        FetchOutcome::Failure {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

pub struct Scheduler {
    source: Arc<dyn QuoteSource>,
    metrics: Arc<ExporterMetrics>,
    interval: Duration,
    run_once: bool,
}

impl Scheduler {
    pub fn new(
        source: Arc<dyn QuoteSource>,
        metrics: Arc<ExporterMetrics>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            metrics,
            interval,
            run_once: false,
        }
    }

    /// Stop the loop after the first cycle.
    pub fn run_once(mut self, yes: bool) -> Self {
        self.run_once = yes;
        self
    }

    /// One cycle: fetch, decode, and on success update the registry.
    ///
    /// Never fails; errors are turned into `FetchOutcome::Failure`, logged,
    /// and counted.
    pub async fn tick(&self) -> FetchOutcome {
        let started = Instant::now();

        let outcome = match self.fetch_and_decode().await {
            Ok(quote) => {
                let updated = self.metrics.update(&quote);
                tracing::info!(
                    observed_at = %quote.observed_at(),
                    updated,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Setting the Current Rate"
                );
                FetchOutcome::Success(quote)
            }
            Err(e) if e.kind().is_cycle_local() => {
                tracing::warn!(
                    kind = e.kind().as_str(),
                    error = %e,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "refresh cycle failed, keeping last known rates"
                );
                FetchOutcome::from(e)
            }
            Err(e) => {
                tracing::error!(
                    kind = e.kind().as_str(),
                    error = %e,
                    "refresh cycle hit a non-upstream error, keeping last known rates"
                );
                FetchOutcome::from(e)
            }
        };

        self.metrics.record_cycle(outcome.failure_kind());
        outcome
    }

    // Fetching -> Decoding. A fetch error never reaches the decoder.
    async fn fetch_and_decode(&self) -> bpi_core::Result<PriceQuote> {
        let raw = self.source.fetch().await?;
        decode(&raw)
    }

    /// Run until `shutdown` flips to true (or its sender is dropped).
    ///
    /// The first cycle starts immediately. Shutdown is only observed between
    /// cycles; an in-flight fetch runs to completion or to its timeout.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            run_once = self.run_once,
            "scheduler started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                    if self.run_once {
                        tracing::info!("run_once set, scheduler stopping after first cycle");
                        break;
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("scheduler stopped");
    }
}
