//! HTTP middleware for request ids, logging and rate limiting

use crate::error::{ApiError, ErrorCode};
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use governor::{clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota, RateLimiter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Header carrying the request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// How often idle clients are dropped from the rate limiter
pub const LIMITER_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

tokio::task_local! {
    static CURRENT_REQUEST_ID: String;
}

/// Id of the request being handled, if inside [`request_id_middleware`]
pub fn current_request_id() -> Option<String> {
    CURRENT_REQUEST_ID.try_with(Clone::clone).ok()
}

/// Rate limiter keyed by client address
pub type KeyedRateLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// Create a rate limiter; zero is treated as one request per second
pub fn create_rate_limiter(requests_per_second: u32) -> Arc<KeyedRateLimiter> {
    let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::keyed(Quota::per_second(rps)))
}

/// Drop idle keys every `every` until the limiter itself is dropped.
/// Does nothing outside a tokio runtime.
pub fn spawn_limiter_pruner(limiter: &Arc<KeyedRateLimiter>, every: Duration) {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        return;
    };
    let limiter = Arc::downgrade(limiter);
    handle.spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(limiter) = limiter.upgrade() else {
                break;
            };
            limiter.retain_recent();
            limiter.shrink_to_fit();
            debug!(clients = limiter.len(), "Pruned rate limiter");
        }
    });
}

/// State of [`rate_limit_middleware`]
#[derive(Clone)]
pub struct RateLimitState {
    limiter: Arc<KeyedRateLimiter>,
    trusted_proxies: Arc<[IpAddr]>,
}

impl RateLimitState {
    /// `X-Forwarded-For` is honored only on connections from `trusted_proxies`
    pub fn new(limiter: Arc<KeyedRateLimiter>, trusted_proxies: &[IpAddr]) -> Self {
        Self {
            limiter,
            trusted_proxies: trusted_proxies.into(),
        }
    }

    pub fn limiter(&self) -> &Arc<KeyedRateLimiter> {
        &self.limiter
    }
}

/// Address the nearest proxy appended to `X-Forwarded-For`
fn forwarded_for(request: &Request<Body>) -> Option<IpAddr> {
    request
        .headers()
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .rsplit(',')
        .next()?
        .trim()
        .parse()
        .ok()
}

/// Rate limiting key: the peer address, or the forwarded client when the
/// peer is a trusted proxy. Requests without connection info share one key.
fn client_key(request: &Request<Body>, trusted_proxies: &[IpAddr]) -> IpAddr {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    match peer {
        Some(peer) if trusted_proxies.contains(&peer) => forwarded_for(request).unwrap_or(peer),
        Some(peer) => peer,
        None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
    }
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_key(&request, &state.trusted_proxies);

    if state.limiter.check_key(&key).is_err() {
        return Err(ApiError::new(
            ErrorCode::SlowDown,
            "Please reduce your request rate",
        ));
    }

    Ok(next.run(request).await)
}

/// Request ID middleware - adds x-request-id header
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = CURRENT_REQUEST_ID
        .scope(request_id.clone(), next.run(request))
        .await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Request ID extension
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "Request completed"
    );

    response
}
