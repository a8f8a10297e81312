//! BPI exporter library entry.
//!
//! Wires the upstream fetcher, the refresh scheduler, the gauge registry, and
//! the HTTP exposition endpoint. Consumed by the binary (`main.rs`) and by
//! integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod app_state;
pub mod config;
pub mod fetch;
pub mod obs;
pub mod ops;
pub mod router;
pub mod scheduler;
pub mod shutdown;
