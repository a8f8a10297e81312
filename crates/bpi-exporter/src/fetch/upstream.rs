//! HTTP fetcher for the price index endpoint.
//!
//! Each call performs a single GET with the client-wide timeout applied. The
//! response is owned by `fetch` and dropped on every return path, releasing the
//! connection back to the pool (or closing it) whether the call succeeds or not.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client, Url};

use bpi_core::error::{ExporterError, Result};

use super::QuoteSource;
use crate::config::UpstreamSection;

const USER_AGENT: &str = concat!("bpi-exporter/", env!("CARGO_PKG_VERSION"));

pub struct UpstreamFetcher {
    client: Client,
    url: Url,
}

impl UpstreamFetcher {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| ExporterError::Config(format!("invalid upstream url: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ExporterError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self { client, url })
    }

    pub fn from_config(cfg: &UpstreamSection) -> Result<Self> {
        Self::new(&cfg.url, cfg.timeout())
    }
}

#[async_trait]
impl QuoteSource for UpstreamFetcher {
    async fn fetch(&self) -> Result<Bytes> {
        let resp = self
            .client
            .get(self.url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(network_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ExporterError::HttpStatus { status: status.as_u16() });
        }

        resp.bytes().await.map_err(network_error)
    }
}

fn network_error(e: reqwest::Error) -> ExporterError {
    if e.is_timeout() {
        ExporterError::Network(format!("request timed out: {e}"))
    } else {
        ExporterError::Network(e.to_string())
    }
}
