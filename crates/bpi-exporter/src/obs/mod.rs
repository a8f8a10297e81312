//! In-process metrics for the exporter.
//!
//! Gauges and self-metrics live in a locally owned Prometheus recorder and are
//! rendered by the `/metrics` handler.

pub mod metrics;

pub use self::metrics::{ExporterMetrics, SCRAPE_CONTENT_TYPE};
