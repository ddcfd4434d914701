//! In-process login rate limiting

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::security_log;
use crate::state::AppState;

/// Login attempts allowed per IP and window
pub const LOGIN_MAX_ATTEMPTS: u32 = 5;
pub const LOGIN_WINDOW_SECS: u64 = 60;
/// Entries idle this long are dropped by [`RateLimiter::cleanup`]
const STALE_AFTER_SECS: u64 = 300;

struct IpEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    /// route name -> (IP -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, IpEntry>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    pub async fn check(
        &self,
        route: &'static str,
        ip: &str,
        max_requests: u32,
        window_secs: u64,
    ) -> bool {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(route).or_default();
        let now = Instant::now();

        let entry = route_map.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start).as_secs() >= window_secs {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| {
                now.duration_since(entry.window_start).as_secs() < STALE_AFTER_SECS
            });
        }
        map.retain(|_, route_map| !route_map.is_empty());
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.inner.lock().await.values().map(HashMap::len).sum()
    }
}

/// Client IP: the peer address, or the first `X-Forwarded-For` entry when the peer is a
/// trusted proxy.
fn extract_ip(request: &Request, trusted_proxies: &[IpAddr]) -> String {
    let peer = request
        .extensions()
        .get::<axum::extract::ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip());

    if let Some(peer) = peer
        && trusted_proxies.contains(&peer)
        && let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let ip = first.trim();
        if !ip.is_empty() {
            return ip.to_owned();
        }
    }

    peer.map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = extract_ip(&request, &state.config.trusted_proxies);
    if !state
        .rate_limiter
        .check("login", &ip, LOGIN_MAX_ATTEMPTS, LOGIN_WINDOW_SECS)
        .await
    {
        security_log!(WARN, "login_rate_limited", ip = %ip);
        return Err(AppError::new(ErrorCode::TooManyAttempts));
    }
    Ok(next.run(request).await)
}
