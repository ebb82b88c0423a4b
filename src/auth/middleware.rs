//! Axum extractors for authentication and rate limiting.

use crate::auth::token::{Claims, TokenSigner};
use crate::config::Config;
use crate::error::AppError;
use crate::storage::UserStore;
use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use redis::AsyncCommands;
use std::convert::Infallible;
use std::hash::{Hash, Hasher};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub signer: Arc<TokenSigner>,
    /// Present only when `REDIS_URL` is configured.
    pub limiter: Option<redis::Client>,
    pub config: Arc<Config>,
}

/// Authenticated session extractor.
///
/// Extracts and verifies the token from `Authorization: Bearer {token}`.
/// Returns 401 Unauthorized if missing, forged, expired or signed under a
/// retired key epoch.
pub struct AuthSession {
    pub claims: Claims,
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid authorization format".to_string()))?;

        let claims = state
            .signer
            .verify(token)
            .map_err(|e| AppError::Unauthorized(e.to_string()))?;

        Ok(AuthSession { claims })
    }
}

/// Peer address, when the server was started with connect info.
///
/// Never rejects; routers driven without `into_make_service_with_connect_info`
/// (e.g. `oneshot` in tests) simply see `None`.
pub struct ClientIp(pub Option<IpAddr>);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip()),
        ))
    }
}

/// Enforce the per-IP sign-in limit.
///
/// No-op when rate limiting is not configured or the peer address is
/// unknown.
pub async fn limit_login_attempts(state: &AppState, ip: Option<IpAddr>) -> Result<(), AppError> {
    let (Some(client), Some(ip)) = (&state.limiter, ip) else {
        return Ok(());
    };

    let mut con = client.get_multiplexed_async_connection().await?;

    let key = format!("ratelimit:login:{}", ip);
    let allowed =
        check_rate_limit(&mut con, &key, state.config.rate_limit_auth_per_min, 60).await?;

    if !allowed {
        let mut hasher = std::hash::DefaultHasher::new();
        ip.hash(&mut hasher);
        let ip_hash = format!("{:x}", hasher.finish());
        tracing::warn!(action = "rate_limited", endpoint = "auth/login", ip_hash = %ip_hash, "Rate limit exceeded");
        return Err(AppError::RateLimited);
    }

    Ok(())
}

/// Check rate limit using Redis INCR with TTL.
///
/// # Arguments
/// * `con` - Redis connection
/// * `key` - Rate limit key (e.g., "ratelimit:login:127.0.0.1")
/// * `max` - Maximum requests allowed in window
/// * `window_secs` - Time window in seconds
///
/// # Returns
/// * `Ok(true)` if under limit
/// * `Ok(false)` if limit exceeded
pub async fn check_rate_limit<C>(
    con: &mut C,
    key: &str,
    max: u32,
    window_secs: u64,
) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    let count: u32 = con.incr(key, 1).await?;

    // The window starts with the first attempt
    if count == 1 {
        con.expire::<_, ()>(key, window_secs as i64).await?;
    }

    Ok(count <= max)
}
