//! BPI exporter core: the upstream quote schema, its decoder, and the error
//! taxonomy shared by the exporter.
//!
//! This crate carries no HTTP or runtime dependencies so the decoding rules can
//! be exercised in isolation from the network.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible path
//! surfaces as `ExporterError`/`Result` so a bad upstream payload can never take
//! the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod schema;

/// Shared result type.
pub use error::{ErrorKind, ExporterError, Result};
pub use schema::{decode, CurrencyRate, PriceQuote};
