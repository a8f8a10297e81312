//! Shared application state for the exporter.
//!
//! One `ExporterMetrics` is built at startup and shared by the scheduler and
//! the HTTP handlers. Startup errors are returned, not panicked.

use std::sync::Arc;

use bpi_core::error::Result;

use crate::config::ExporterConfig;
use crate::fetch::{QuoteSource, UpstreamFetcher};
use crate::obs::ExporterMetrics;
use crate::scheduler::Scheduler;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<ExporterMetrics>,
}

struct AppStateInner {
    cfg: ExporterConfig,
}

impl AppState {
    pub fn new(cfg: ExporterConfig) -> Self {
        let metrics = Arc::new(ExporterMetrics::new(&cfg.metric));
        Self {
            inner: Arc::new(AppStateInner { cfg }),
            metrics,
        }
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> Arc<ExporterMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Mark draining state (readiness turns 503).
    pub fn set_draining(&self) {
        self.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    /// Scheduler wired to the configured upstream.
    pub fn scheduler(&self) -> Result<Scheduler> {
        let fetcher = UpstreamFetcher::from_config(&self.cfg().upstream)?;
        Ok(self.scheduler_with(Arc::new(fetcher)))
    }

    /// Scheduler wired to an arbitrary quote source.
    pub fn scheduler_with(&self, source: Arc<dyn QuoteSource>) -> Scheduler {
        let sched = &self.cfg().scheduler;
        Scheduler::new(source, self.metrics(), sched.interval()).run_once(sched.run_once)
    }
}
