//! Per-client token buckets guarding the public feedback endpoints.
//!
//! The feedback page is anonymous, so the client IP is the only handle we
//! have on a flood of submissions or upvotes.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::ServerError;

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_seen: Instant,
}

impl Bucket {
    fn full(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_seen: now,
        }
    }

    /// Refill for the time elapsed since the last request, then take a token.
    fn take(&mut self, now: Instant, rate: f64, capacity: f64) -> bool {
        let elapsed = now.saturating_duration_since(self.last_seen).as_secs_f64();
        self.last_seen = now;
        self.tokens = (self.tokens + elapsed * rate).min(capacity);

        if self.tokens < 1.0 {
            return false;
        }
        self.tokens -= 1.0;
        true
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<Mutex<HashMap<IpAddr, Bucket>>>,
    rate: f64,
    capacity: f64,
}

impl RateLimiter {
    pub fn new(rate: f64, capacity: f64) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            rate,
            capacity,
        }
    }

    /// Returns `false` once `ip` has exhausted its bucket.
    pub async fn allow(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;
        buckets
            .entry(ip)
            .or_insert_with(|| Bucket::full(self.capacity, now))
            .take(now, self.rate, self.capacity)
    }

    /// Drop buckets that have been idle for longer than `max_idle`.
    pub async fn purge_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;
        let before = buckets.len();
        buckets.retain(|_, bucket| now.saturating_duration_since(bucket.last_seen) < max_idle);
        before - buckets.len()
    }
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ServerError> {
    if let Some(ip) = client_ip(&req) {
        if !limiter.allow(ip).await {
            warn!(ip = %ip, path = %req.uri().path(), "Rate limit exceeded");
            return Err(ServerError::RateLimited);
        }
    }

    Ok(next.run(req).await)
}

/// Try ConnectInfo first, then X-Forwarded-For, then X-Real-IP.
fn client_ip<B>(req: &Request<B>) -> Option<IpAddr> {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return Some(addr.ip());
    }

    let header_ip = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    header_ip("x-forwarded-for").or_else(|| header_ip("x-real-ip"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_burst_then_reject() {
        let limiter = RateLimiter::new(0.001, 3.0);
        let ip: IpAddr = "127.0.0.1".parse().unwrap();

        for _ in 0..3 {
            assert!(limiter.allow(ip).await);
        }
        assert!(!limiter.allow(ip).await);
    }

    #[tokio::test]
    async fn test_clients_are_independent() {
        let limiter = RateLimiter::new(0.001, 1.0);
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.allow(a).await);
        assert!(!limiter.allow(a).await);
        assert!(limiter.allow(b).await);
    }

    #[tokio::test]
    async fn test_purge_idle() {
        let limiter = RateLimiter::new(1.0, 5.0);
        let ip: IpAddr = "192.168.1.1".parse().unwrap();
        assert!(limiter.allow(ip).await);

        assert_eq!(limiter.purge_idle(Duration::from_secs(3600)).await, 0);
        assert_eq!(limiter.purge_idle(Duration::ZERO).await, 1);
        assert!(limiter.buckets.lock().await.is_empty());
    }

    #[test]
    fn test_client_ip_from_headers() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(())
            .unwrap();
        assert_eq!(client_ip(&req), Some("203.0.113.7".parse().unwrap()));

        let req = Request::builder()
            .header("x-real-ip", "198.51.100.2")
            .body(())
            .unwrap();
        assert_eq!(client_ip(&req), Some("198.51.100.2".parse().unwrap()));

        let req = Request::builder().body(()).unwrap();
        assert_eq!(client_ip(&req), None);
    }
}
