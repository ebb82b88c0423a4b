//! Security headers middleware.
//!
//! Every response from this service is JSON and may carry a session token,
//! so responses are never cached, framed or sniffed.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};

/// Middleware that adds security headers to all responses.
///
/// - **Cache-Control: no-store** keeps issued tokens out of shared and
///   browser caches.
/// - **Referrer-Policy: no-referrer**, **X-Content-Type-Options: nosniff**,
///   **X-Frame-Options: DENY**.
/// - **Strict-Transport-Security** for two years including subdomains; the
///   sign-in endpoint must only ever be reached over HTTPS.
/// - **Content-Security-Policy** `default-src 'none'; frame-ancestors 'none'`
///   since the API serves no documents.
///
/// # Usage
///
/// ```rust,no_run
/// use axum::Router;
/// use axum::middleware;
/// use tripgate::middleware::security_headers;
///
/// let app: Router = Router::new()
///     .layer(middleware::from_fn(security_headers));
/// ```
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("cache-control", HeaderValue::from_static("no-store"));
    headers.insert("pragma", HeaderValue::from_static("no-cache"));
    headers.insert("referrer-policy", HeaderValue::from_static("no-referrer"));
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "strict-transport-security",
        HeaderValue::from_static("max-age=63072000; includeSubDomains"),
    );
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );

    response
}
