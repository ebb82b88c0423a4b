//! API route handlers.

pub mod auth;

use crate::auth::middleware::AppState;
use axum::{routing::get, routing::post, Router};

/// Build the API router with all endpoints.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/session", get(auth::session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::auth::token::TokenSigner;
    use crate::config::Config;
    use crate::models::{now_secs, StoredUser};
    use crate::storage::MemoryUserStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    const SECRET: &str = "router-tests-signing-key-0123456";

    /// bcrypt row as written by the sign-up flow; password "U*U".
    const BCRYPT_HASH: &str = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";

    fn test_state() -> AppState {
        let users = MemoryUserStore::new().with_user(StoredUser {
            id: "9".to_string(),
            first_name: "Jean".to_string(),
            last_name: "Batten".to_string(),
            email: "a@b.com".to_string(),
            password_hash: hash_password("correct").unwrap(),
        })
        .with_user(StoredUser {
            id: "12".to_string(),
            first_name: "Amy".to_string(),
            last_name: "Johnson".to_string(),
            email: "amy@b.com".to_string(),
            password_hash: BCRYPT_HASH.to_string(),
        });

        let config = Config {
            jwt_secret: SECRET.to_string(),
            jwt_key_epoch: 1,
            token_ttl_secs: 3600,
            database_url: "postgres://unused".to_string(),
            db_max_connections: 1,
            db_connect_timeout_secs: 1,
            redis_url: None,
            rate_limit_auth_per_min: 5,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
        };

        AppState {
            users: Arc::new(users),
            signer: Arc::new(TokenSigner::from_config(&config)),
            limiter: None,
            config: Arc::new(config),
        }
    }

    async fn send(req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let app = api_router().with_state(test_state());
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn login_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn session_request(auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/api/auth/session");
        if let Some(value) = auth {
            builder = builder.header("authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_login_success() {
        let (status, body) =
            send(login_request(r#"{"email":"a@b.com","password":"correct"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["token"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (status, body) =
            send(login_request(r#"{"email":"a@b.com","password":"wrong"}"#)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid password");
    }

    #[tokio::test]
    async fn test_login_bcrypt_row() {
        let (status, body) =
            send(login_request(r#"{"email":"amy@b.com","password":"U*U"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        let claims = crate::auth::token::decode_claims(body["token"].as_str().unwrap()).unwrap();
        assert_eq!(claims.user_id, "12");
        assert_eq!(claims.email, "amy@b.com");
    }

    #[tokio::test]
    async fn test_login_bcrypt_row_wrong_password() {
        let (status, body) =
            send(login_request(r#"{"email":"amy@b.com","password":"wrong"}"#)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid password");
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let (status, body) =
            send(login_request(r#"{"email":"missing@b.com","password":"x"}"#)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");
    }

    #[tokio::test]
    async fn test_login_missing_password() {
        let (status, body) = send(login_request(r#"{"email":"a@b.com"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email and password are required");
    }

    #[derive(Clone, Default)]
    struct LogCapture(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_login_invalid_request_is_logged() {
        let capture = LogCapture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (status, _) = send(login_request(r#"{"email":"","password":""}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(login_request("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let logs = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert_eq!(logs.matches("auth_invalid_request").count(), 2);
    }

    #[tokio::test]
    async fn test_login_malformed_json() {
        let (status, body) = send(login_request("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email and password are required");
    }

    #[tokio::test]
    async fn test_session_requires_header() {
        let (status, body) = send(session_request(None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Missing authorization header");

        let (status, _) = send(session_request(Some("Token abc"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_with_valid_token() {
        let state = test_state();
        let user = state.users.find_by_email("a@b.com").await.unwrap().unwrap();
        let issued = state.signer.issue(&user).unwrap();

        let (status, body) =
            send(session_request(Some(&format!("Bearer {}", issued.token)))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["email"], "a@b.com");
        assert_eq!(body["user"]["userId"], "9");
        assert_eq!(body["expiresAt"], issued.claims.exp);
    }

    #[tokio::test]
    async fn test_session_with_expired_token() {
        let state = test_state();
        let user = state.users.find_by_email("a@b.com").await.unwrap().unwrap();
        let issued = state.signer.issue_at(&user, now_secs() - 7200).unwrap();

        let (status, body) =
            send(session_request(Some(&format!("Bearer {}", issued.token)))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Token expired");
    }

    #[tokio::test]
    async fn test_session_with_retired_epoch() {
        let state = test_state();
        let user = state.users.find_by_email("a@b.com").await.unwrap().unwrap();
        let old = TokenSigner::new(SECRET.as_bytes(), 0, 3600);
        let issued = old.issue(&user).unwrap();

        let (status, body) =
            send(session_request(Some(&format!("Bearer {}", issued.token)))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Token signed with a retired key");
    }
}
