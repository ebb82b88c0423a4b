//! Tripgate entry point.
//!
//! Bootstraps the sign-in service:
//! 1. Load configuration from environment
//! 2. Prepare the users-table pool (lazy) and optional Redis rate limiter
//! 3. Build router with API routes
//! 4. Apply security headers middleware
//! 5. Start Axum server
//!
//! Also supports `hash-password` for producing PHC strings to seed the
//! users table out-of-band.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tripgate::{
    auth::{hash_password, AppState, TokenSigner},
    config::Config,
    middleware::security_headers,
    routes,
    storage::PgUserStore,
};

/// Login bodies are two short strings.
const MAX_BODY_BYTES: usize = 16 * 1024;

fn print_hash_usage() {
    eprintln!("Usage: tripgate hash-password <password>");
    eprintln!();
    eprintln!("Print an Argon2id hash for the users.passwordhash column.");
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && args[1] == "hash-password" {
        if args.len() != 3 {
            print_hash_usage();
            std::process::exit(1);
        }

        match hash_password(&args[2]) {
            Ok(hash) => println!("{}", hash),
            Err(e) => {
                eprintln!("Error hashing password: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // Initialize tracing with env filter support (RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Fatal startup error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        key_epoch = config.jwt_key_epoch,
        token_ttl_secs = config.token_ttl_secs,
        "Starting tripgate"
    );

    let users = PgUserStore::connect_lazy(
        &config.database_url,
        config.db_max_connections,
        Duration::from_secs(config.db_connect_timeout_secs),
    )?;

    let limiter = match &config.redis_url {
        Some(url) => {
            tracing::info!("Login rate limiting enabled");
            Some(redis::Client::open(url.as_str())?)
        }
        None => {
            tracing::warn!("REDIS_URL not set, login rate limiting disabled");
            None
        }
    };

    let state = AppState {
        users: Arc::new(users),
        signer: Arc::new(TokenSigner::from_config(&config)),
        limiter,
        config: Arc::new(config.clone()),
    };

    // Same-origin deployment: CorsLayer::new() allows no cross-origin callers
    let app = routes::api_router()
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::new())
        .layer(axum::middleware::from_fn(security_headers))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);

    // Connect info feeds the per-IP login limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
