//! Upstream quote schema (Bitcoin Price Index JSON).
//!
//! The decoder is lenient about shape drift (unknown fields, missing
//! currencies) and strict about the one value the exporter consumes: a
//! `rate_float` that is present must be numeric. Malformed input is always
//! reported as `ExporterError::Decode`, never a panic.

pub mod quote;

pub use quote::{decode, CurrencyRate, PriceQuote, QuoteTime};
