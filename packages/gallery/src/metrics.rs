//! Prometheus metrics (lock-free atomics, zero allocation on hot path).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Traffic ---
    pub requests: AtomicU64,

    // --- Gateway ---
    pub queries: AtomicU64,
    pub query_errors: AtomicU64,
    pub failovers: AtomicU64,

    // --- Pipeline ---
    pub pipeline_duration_us_sum: AtomicU64,
    pub pipeline_duration_us_max: AtomicU64,
    pub collection_fallbacks: AtomicU64,
    pub tokens_unavailable: AtomicU64,
    pub stale_discards: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            queries: AtomicU64::new(0),
            query_errors: AtomicU64::new(0),
            failovers: AtomicU64::new(0),
            pipeline_duration_us_sum: AtomicU64::new(0),
            pipeline_duration_us_max: AtomicU64::new(0),
            collection_fallbacks: AtomicU64::new(0),
            tokens_unavailable: AtomicU64::new(0),
            stale_discards: AtomicU64::new(0),
        }
    }

    pub fn record_pipeline_duration(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.pipeline_duration_us_sum.fetch_add(us, Ordering::Relaxed);
        // CAS loop for max tracking
        let mut cur = self.pipeline_duration_us_max.load(Ordering::Relaxed);
        while us > cur {
            match self.pipeline_duration_us_max.compare_exchange_weak(
                cur,
                us,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let requests = self.requests.load(Ordering::Relaxed);
        let queries = self.queries.load(Ordering::Relaxed);
        let query_errors = self.query_errors.load(Ordering::Relaxed);
        let failovers = self.failovers.load(Ordering::Relaxed);
        let dur_sum = self.pipeline_duration_us_sum.load(Ordering::Relaxed);
        let dur_max = self.pipeline_duration_us_max.swap(0, Ordering::Relaxed);
        let fallbacks = self.collection_fallbacks.load(Ordering::Relaxed);
        let unavailable = self.tokens_unavailable.load(Ordering::Relaxed);
        let stale = self.stale_discards.load(Ordering::Relaxed);

        // Convert μs to seconds for Prometheus conventions
        let dur_sum_s = dur_sum as f64 / 1_000_000.0;
        let dur_max_s = dur_max as f64 / 1_000_000.0;

        format!(
            "\
# HELP gallery_requests_total HTTP requests served.\n\
# TYPE gallery_requests_total counter\n\
gallery_requests_total {requests}\n\
# HELP gallery_queries_total Smart queries sent to the gateway.\n\
# TYPE gallery_queries_total counter\n\
gallery_queries_total {queries}\n\
# HELP gallery_query_errors_total Smart queries that failed.\n\
# TYPE gallery_query_errors_total counter\n\
gallery_query_errors_total {query_errors}\n\
# HELP gallery_failovers_total LCD primary-to-fallback failovers.\n\
# TYPE gallery_failovers_total counter\n\
gallery_failovers_total {failovers}\n\
# HELP gallery_pipeline_duration_seconds_sum Total pipeline time (seconds).\n\
# TYPE gallery_pipeline_duration_seconds_sum counter\n\
gallery_pipeline_duration_seconds_sum {dur_sum_s:.6}\n\
# HELP gallery_pipeline_duration_seconds_max Max pipeline time since last scrape (seconds).\n\
# TYPE gallery_pipeline_duration_seconds_max gauge\n\
gallery_pipeline_duration_seconds_max {dur_max_s:.6}\n\
# HELP gallery_collection_fallbacks_total Collections served without live enrichment.\n\
# TYPE gallery_collection_fallbacks_total counter\n\
gallery_collection_fallbacks_total {fallbacks}\n\
# HELP gallery_tokens_unavailable_total Tokens whose info query failed in a settled fetch.\n\
# TYPE gallery_tokens_unavailable_total counter\n\
gallery_tokens_unavailable_total {unavailable}\n\
# HELP gallery_stale_discards_total Results dropped because a newer invocation had begun.\n\
# TYPE gallery_stale_discards_total counter\n\
gallery_stale_discards_total {stale}\n"
        )
    }
}
