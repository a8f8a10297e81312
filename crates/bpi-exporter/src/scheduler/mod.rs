//! Refresh scheduler.
//!
//! Drives the fetch -> decode -> update cycle on a fixed interval. Every cycle
//! is isolated: a failure at any stage is logged and counted, the registry is
//! left untouched, and the next tick runs as usual.

pub mod cycle;

pub use cycle::{FetchOutcome, Scheduler};
