use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Global admission gate: at most one request starts per `interval`.
///
/// Callers beyond the rate are delayed, never rejected. The mutex is fair,
/// so waiting requests are admitted in arrival order.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    interval: Duration,
    last_admitted: Arc<Mutex<Option<Instant>>>,
}

impl AdmissionGate {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_admitted: Arc::new(Mutex::new(None)),
        }
    }

    /// Waits until this caller's slot opens, then claims it.
    pub async fn admit(&self) {
        let mut last = self.last_admitted.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval.saturating_sub(elapsed)).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }
    res
}

/// Middleware delaying each request until the admission gate lets it in.
pub async fn admission_throttle(
    State(gate): State<AdmissionGate>,
    req: Request,
    next: Next,
) -> Response {
    let queued_at = Instant::now();
    gate.admit().await;
    let waited = queued_at.elapsed();
    if waited >= Duration::from_millis(1) {
        tracing::debug!(
            waited_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
            path = %req.uri().path(),
            "request delayed by admission throttle"
        );
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_admission_is_immediate() {
        let gate = AdmissionGate::new(Duration::from_secs(5));
        let started = Instant::now();
        gate.admit().await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn consecutive_admissions_are_spaced() {
        let gate = AdmissionGate::new(Duration::from_millis(60));
        let started = Instant::now();
        for _ in 0..3 {
            gate.admit().await;
        }
        assert!(
            started.elapsed() >= Duration::from_millis(120),
            "three admissions need at least two intervals"
        );
    }

    #[tokio::test]
    async fn concurrent_callers_are_delayed_not_dropped() {
        let gate = AdmissionGate::new(Duration::from_millis(40));
        let started = Instant::now();
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let gate = gate.clone();
                tokio::spawn(async move { gate.admit().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        assert!(started.elapsed() >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn zero_interval_never_waits() {
        let gate = AdmissionGate::new(Duration::ZERO);
        let started = Instant::now();
        for _ in 0..10 {
            gate.admit().await;
        }
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
