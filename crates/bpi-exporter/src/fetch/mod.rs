//! Upstream fetching.
//!
//! Re-exports the `QuoteSource` seam and its HTTP implementation so the
//! scheduler can depend on this module directly.

pub mod upstream;

use async_trait::async_trait;
use bytes::Bytes;

use bpi_core::error::Result;

pub use upstream::UpstreamFetcher;

/// Source of raw quote bodies. One call is one bounded upstream request.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch(&self) -> Result<Bytes>;
}
