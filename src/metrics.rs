use lazy_static::lazy_static;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::Result;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref UPSTREAM_REQUESTS: IntCounter = IntCounter::new(
        "upstream_requests_total",
        "Total number of upstream HTTP attempts"
    ).unwrap();

    pub static ref UPSTREAM_FAILURES: IntCounter = IntCounter::new(
        "upstream_failures_total",
        "Total number of failed upstream HTTP attempts"
    ).unwrap();

    pub static ref CACHE_HITS: IntCounter = IntCounter::new(
        "cache_hits_total",
        "Fetches answered from the response cache"
    ).unwrap();

    pub static ref CACHE_MISSES: IntCounter = IntCounter::new(
        "cache_misses_total",
        "Fetches that went upstream"
    ).unwrap();

    pub static ref WARMUPS_SENT: IntCounter = IntCounter::new(
        "prediction_warmups_total",
        "Fire-and-forget warm-up requests launched"
    ).unwrap();

    pub static ref PAGE_RENDERS: IntCounterVec = IntCounterVec::new(
        Opts::new("page_renders_total", "Rendered pages by view"),
        &["page"]
    ).unwrap();

    pub static ref FETCH_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "upstream_fetch_latency_seconds",
            "Latency of a full fetch including retries"
        ).buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 25.0, 75.0])
    ).unwrap();
}

pub fn init() -> Result<()> {
    REGISTRY.register(Box::new(UPSTREAM_REQUESTS.clone()))?;
    REGISTRY.register(Box::new(UPSTREAM_FAILURES.clone()))?;
    REGISTRY.register(Box::new(CACHE_HITS.clone()))?;
    REGISTRY.register(Box::new(CACHE_MISSES.clone()))?;
    REGISTRY.register(Box::new(WARMUPS_SENT.clone()))?;
    REGISTRY.register(Box::new(PAGE_RENDERS.clone()))?;
    REGISTRY.register(Box::new(FETCH_LATENCY.clone()))?;
    Ok(())
}

/// Prometheus text exposition of everything registered.
pub fn gather() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
