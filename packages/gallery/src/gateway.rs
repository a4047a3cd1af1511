//! Contract query gateway.
//!
//! [`QueryGateway`] is the only way the pipeline reaches chain state.
//! [`LcdGateway`] implements it over the Cosmos REST (LCD) smart-query route
//! with primary → fallback routing and a circuit breaker. A failed call is
//! never retried; the breaker only decides which endpoint serves the next one.

use async_trait::async_trait;
use base64::Engine;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::metrics::METRICS;

const CIRCUIT_BREAKER_THRESHOLD: u64 = 5;
const CIRCUIT_BREAKER_WINDOW_MS: u64 = 30_000;

/// Read-only smart-contract queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueryGateway: Send + Sync {
    /// Run `msg` against `contract` and return the decoded JSON answer.
    async fn query_smart(&self, contract: &str, msg: &Value) -> Result<Value, crate::Error>;
}

/// Endpoint chosen for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Primary,
    Fallback,
}

/// Breaker state change worth reporting.
#[derive(Debug, PartialEq, Eq)]
enum Transition {
    Opened { failures: u64 },
    HalfOpen,
    Recovered,
}

/// Consecutive primary node failures. Clock readings are passed in.
#[derive(Default)]
struct CircuitState {
    failures: u64,
    last_failure_ms: u64,
    open: bool,
}

impl CircuitState {
    /// Endpoint for the next call. An open breaker whose window has passed
    /// re-admits the primary.
    fn route(&mut self, now_ms: u64) -> (Route, Option<Transition>) {
        if !self.open {
            return (Route::Primary, None);
        }
        if now_ms.saturating_sub(self.last_failure_ms) > CIRCUIT_BREAKER_WINDOW_MS {
            self.open = false;
            self.failures = 0;
            return (Route::Primary, Some(Transition::HalfOpen));
        }
        (Route::Fallback, None)
    }

    /// Fold in the outcome of a call on `route`. Only primary outcomes move
    /// the breaker; a node that answered, even with a rejection, is healthy.
    fn observe(&mut self, route: Route, node_healthy: bool, now_ms: u64) -> Option<Transition> {
        if route == Route::Fallback {
            return None;
        }
        if node_healthy {
            let recovered = self.failures > 0;
            self.failures = 0;
            self.open = false;
            return recovered.then_some(Transition::Recovered);
        }
        self.failures += 1;
        self.last_failure_ms = now_ms;
        if self.failures >= CIRCUIT_BREAKER_THRESHOLD && !self.open {
            self.open = true;
            return Some(Transition::Opened {
                failures: self.failures,
            });
        }
        None
    }
}

/// Why a single LCD request failed.
enum SendFailure {
    /// The node was unreachable or unhealthy; counts toward the breaker.
    Node(crate::Error),
    /// The node answered and rejected the query (bad message, contract error).
    Rejected(crate::Error),
}

/// LCD gateway with primary → fallback routing.
pub struct LcdGateway {
    http: reqwest::Client,
    primary_url: String,
    fallback_url: String,
    circuit: Mutex<CircuitState>,
    total_failovers: AtomicU64,
}

impl LcdGateway {
    pub fn new(primary_url: &str, fallback_url: &str, timeout: Duration) -> Result<Self, crate::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| crate::Error::Config(format!("HTTP client: {e}")))?;
        info!(
            primary = primary_url,
            fallback = fallback_url,
            "LCD gateway initialized with failover"
        );
        Ok(Self {
            http,
            primary_url: primary_url.trim_end_matches('/').to_string(),
            fallback_url: fallback_url.trim_end_matches('/').to_string(),
            circuit: Mutex::new(CircuitState::default()),
            total_failovers: AtomicU64::new(0),
        })
    }

    pub fn primary_url(&self) -> &str {
        &self.primary_url
    }

    pub fn fallback_url(&self) -> &str {
        &self.fallback_url
    }

    /// `{base}/cosmwasm/wasm/v1/contract/{contract}/smart/{base64url(json(msg))}`
    pub fn smart_query_url(base: &str, contract: &str, msg: &Value) -> Result<String, crate::Error> {
        let bytes = serde_json::to_vec(msg)
            .map_err(|e| crate::Error::InvalidInput(format!("unencodable query: {e}")))?;
        let encoded = base64::engine::general_purpose::URL_SAFE.encode(bytes);
        Ok(format!(
            "{}/cosmwasm/wasm/v1/contract/{contract}/smart/{encoded}",
            base.trim_end_matches('/')
        ))
    }

    async fn send(&self, base: &str, contract: &str, msg: &Value) -> Result<Value, SendFailure> {
        let url = Self::smart_query_url(base, contract, msg).map_err(SendFailure::Rejected)?;
        let resp = self.http.get(&url).send().await.map_err(|e| {
            SendFailure::Node(crate::Error::Query(format!("{contract}: request failed: {e}")))
        })?;

        let status = resp.status();
        let body: Value = resp.json().await.map_err(|e| {
            SendFailure::Node(crate::Error::Query(format!(
                "{contract}: unreadable response ({status}): {e}"
            )))
        })?;

        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("no message");
            let err = crate::Error::Query(format!("{contract}: {status}: {message}"));
            return Err(if status.is_server_error() && status.as_u16() != 500 {
                SendFailure::Node(err)
            } else {
                // 500 is how the LCD reports contract-level query errors.
                SendFailure::Rejected(err)
            });
        }

        match body {
            Value::Object(mut map) => map.remove("data").ok_or_else(|| {
                SendFailure::Rejected(crate::Error::Parse(format!(
                    "{contract}: response has no data field"
                )))
            }),
            other => Err(SendFailure::Rejected(crate::Error::Parse(format!(
                "{contract}: expected JSON object, got {other}"
            )))),
        }
    }

    /// Quick connectivity check. Returns "ok", "degraded", or error.
    pub async fn health_check(&self) -> Result<&'static str, crate::Error> {
        let latest_block = |base: &str| {
            let url = format!("{base}/cosmos/base/tendermint/v1beta1/blocks/latest");
            let http = self.http.clone();
            async move {
                http.get(url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map(|_| ())
            }
        };

        match latest_block(&self.primary_url).await {
            Ok(()) => Ok("ok"),
            Err(_) => match latest_block(&self.fallback_url).await {
                Ok(()) => Ok("degraded"),
                Err(e) => Err(crate::Error::Query(format!("Both LCD endpoints unreachable: {e}"))),
            },
        }
    }

    // --- Failover / circuit breaker ---

    fn route(&self) -> Route {
        let (route, transition) = self
            .circuit
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .route(now_ms());
        if let Some(transition) = transition {
            self.report(transition);
        }
        route
    }

    fn observe(&self, route: Route, node_healthy: bool) {
        let transition = self
            .circuit
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .observe(route, node_healthy, now_ms());
        if let Some(transition) = transition {
            self.report(transition);
        }
    }

    fn report(&self, transition: Transition) {
        match transition {
            Transition::Opened { failures } => {
                self.total_failovers.fetch_add(1, Ordering::Relaxed);
                METRICS.failovers.fetch_add(1, Ordering::Relaxed);
                warn!(failures, fallback = %self.fallback_url, "Circuit breaker opened, routing to fallback");
            }
            Transition::HalfOpen => {
                info!(primary = %self.primary_url, "Circuit breaker half-open, retrying primary");
            }
            Transition::Recovered => info!(primary = %self.primary_url, "Primary LCD recovered"),
        }
    }

    fn base_url(&self, route: Route) -> &str {
        match route {
            Route::Primary => &self.primary_url,
            Route::Fallback => &self.fallback_url,
        }
    }

    pub fn is_circuit_open(&self) -> bool {
        self.route() == Route::Fallback
    }

    pub fn failover_count(&self) -> u64 {
        self.total_failovers.load(Ordering::Relaxed)
    }

    /// Currently active LCD URL.
    pub fn active_url(&self) -> &str {
        self.base_url(self.route())
    }
}

#[async_trait]
impl QueryGateway for LcdGateway {
    async fn query_smart(&self, contract: &str, msg: &Value) -> Result<Value, crate::Error> {
        METRICS.queries.fetch_add(1, Ordering::Relaxed);
        let route = self.route();
        let base = self.base_url(route);
        debug!(contract, url = %base, "Smart query");

        let outcome = self.send(base, contract, msg).await;
        self.observe(route, !matches!(outcome, Err(SendFailure::Node(_))));

        outcome.map_err(|failure| {
            METRICS.query_errors.fetch_add(1, Ordering::Relaxed);
            match failure {
                SendFailure::Node(e) => {
                    warn!(contract, url = %base, error = %e, "LCD node failure");
                    e
                }
                SendFailure::Rejected(e) => {
                    warn!(contract, error = %e, "Smart query rejected");
                    e
                }
            }
        })
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
