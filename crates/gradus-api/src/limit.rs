use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use gradus_config::RateLimitConfig;

use crate::error::ApiError;
use crate::identity::ACTOR_ID_HEADER;
use crate::state::AppState;

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

pub trait RateLimit: Send + Sync {
    // Ok to proceed, or whole seconds to wait before retrying.
    fn check(&self, key: &str) -> Result<(), u64>;
}

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

pub struct TokenBucketLimiter {
    config: RateLimitConfig,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl TokenBucketLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Mutex::new(HashMap::new()),
        }
    }
}

impl RateLimit for TokenBucketLimiter {
    fn check(&self, key: &str) -> Result<(), u64> {
        if !self.config.enabled {
            return Ok(());
        }

        let now = Instant::now();
        let mut buckets = match self.buckets.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let bucket = buckets.entry(key.to_owned()).or_insert_with(|| Bucket {
            tokens: self.config.capacity,
            last_refill: now,
        });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.last_refill = now;
        bucket.tokens =
            (bucket.tokens + elapsed * self.config.refill_per_sec).min(self.config.capacity);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            let wait = (1.0 - bucket.tokens) / self.config.refill_per_sec;
            Err(wait.ceil().max(1.0) as u64)
        }
    }
}

// Buckets are keyed by the authenticated actor when present; anonymous
// traffic shares one bucket per forwarded address.
pub(crate) fn client_key(headers: &HeaderMap) -> String {
    if let Some(actor) = headers.get(ACTOR_ID_HEADER).and_then(|v| v.to_str().ok()) {
        let actor = actor.trim();
        if !actor.is_empty() {
            return actor.to_owned();
        }
    }
    if let Some(forwarded) = headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        && let Some(first) = forwarded.split(',').next()
    {
        let first = first.trim();
        if !first.is_empty() {
            return first.to_owned();
        }
    }
    "unknown".to_owned()
}

pub(crate) async fn enforce(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(request.headers());
    match state.limiter().check(&key) {
        Ok(()) => next.run(request).await,
        Err(retry_after_secs) => ApiError::RateLimited { retry_after_secs }.into_response(),
    }
}
