//! Shared helpers: scripted sources, fake upstream servers, scrape parsing.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{http::StatusCode, routing::get, Router};
use bytes::Bytes;

use bpi_core::error::{ExporterError, Result};
use bpi_exporter::app_state::AppState;
use bpi_exporter::fetch::QuoteSource;
use bpi_exporter::obs::ExporterMetrics;
use bpi_exporter::router;

pub const RATE_NAME: &str = "bitcoinIndex_Coindesk_bitcoinPrice";
pub const CURRENCIES: [&str; 3] = ["USD", "EUR", "GBP"];

pub const E2E_BODY: &str =
    r#"{"bpi":{"USD":{"rate_float":50000.12},"EUR":{"rate_float":46000.5},"GBP":{"rate_float":39000.75}}}"#;

pub fn registry() -> ExporterMetrics {
    ExporterMetrics::with_labels(RATE_NAME.to_string(), "test gauge", &CURRENCIES)
}

/// Value of `name{currency="..."}` in a rendered scrape.
pub fn sample(rendered: &str, name: &str, currency: &str) -> Option<f64> {
    let label = format!("currency=\"{currency}\"");
    sample_where(rendered, name, &label)
}

/// Value of the first `name{...}` line whose labels contain `label`.
pub fn sample_where(rendered: &str, name: &str, label: &str) -> Option<f64> {
    rendered
        .lines()
        .filter(|l| !l.starts_with('#'))
        .filter(|l| l.starts_with(&format!("{name}{{")) || l.starts_with(&format!("{name} ")))
        .find(|l| label.is_empty() || l.contains(label))
        .and_then(|l| l.rsplit(' ').next())
        .map(|v| v.parse().unwrap())
}

/// Quote source replaying canned results, then repeating the last one.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<Bytes>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<Bytes>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for ScriptedSource {
    async fn fetch(&self) -> Result<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        let next = if script.len() > 1 { script.pop_front() } else { None };
        match next {
            Some(r) => r,
            None => clone_result(script.front().expect("script must not be empty")),
        }
    }
}

fn clone_result(r: &Result<Bytes>) -> Result<Bytes> {
    match r {
        Ok(b) => Ok(b.clone()),
        Err(ExporterError::Network(m)) => Err(ExporterError::Network(m.clone())),
        Err(ExporterError::HttpStatus { status }) => Err(ExporterError::HttpStatus { status: *status }),
        Err(ExporterError::Decode(m)) => Err(ExporterError::Decode(m.clone())),
        Err(e) => Err(ExporterError::Internal(e.to_string())),
    }
}

pub fn ok(body: &str) -> Result<Bytes> {
    Ok(Bytes::from(body.to_string()))
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Fake upstream answering `GET /price` with a fixed status and body.
pub async fn spawn_upstream(status: StatusCode, body: &'static str) -> SocketAddr {
    spawn_slow_upstream(status, body, Duration::ZERO).await
}

pub async fn spawn_slow_upstream(status: StatusCode, body: &'static str, delay: Duration) -> SocketAddr {
    let app = Router::new().route(
        "/price",
        get(move || async move {
            tokio::time::sleep(delay).await;
            (status, body)
        }),
    );
    serve(app).await
}

/// An address nothing listens on.
pub async fn dead_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn price_url(addr: SocketAddr) -> String {
    format!("http://{addr}/price")
}

/// Serve the exporter router on an ephemeral port.
pub async fn spawn_exporter(state: AppState) -> SocketAddr {
    serve(router::build_router(state)).await
}

pub async fn scrape(addr: SocketAddr) -> String {
    let resp = reqwest::get(format!("http://{addr}/metrics")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    resp.text().await.unwrap()
}
