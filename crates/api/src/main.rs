mod middleware;
mod response;
mod routes;

use axum::{
    routing::{delete, get, post},
    Router,
};
use cineseat_engine::SeatEngine;
use cineseat_integrations::GatewayClient;
use cineseat_types::AppConfig;
use middleware::{AppState, AuthVerifier};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cineseat_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting CineSeat API server...");

    // Get configuration from environment
    let port = std::env::var("API_PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()?;

    let config = AppConfig::from_env();

    // Initialize database pool
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = cineseat_db::create_pool(&database_url).await?;

    tracing::info!("✓ Database connection established");

    // Connect the seat engine (loads the reservation scripts up front)
    let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into());
    let engine = SeatEngine::connect(&redis_url).await?;

    tracing::info!("✓ Seat engine connected, scripts loaded");

    // Payment gateway client (sandbox mode without GATEWAY_BASE_URL)
    let gateway = GatewayClient::from_env();

    // Bearer-token verifier
    let jwt_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let auth = AuthVerifier::new(&jwt_secret);

    // Create app state
    let state = AppState {
        db: pool,
        engine,
        gateway,
        config,
        auth,
    };

    // Build application router
    let app = Router::new()
        .route("/health", get(health_check))
        // Showtime routes
        .route("/api/showtimes/:id/seats", get(routes::showtimes::get_showtime_seats))
        // Booking routes
        .route("/api/bookings/hold", post(routes::bookings::hold_seats))
        .route("/api/bookings/:id", get(routes::bookings::get_booking))
        .route("/api/bookings/:id", delete(routes::bookings::cancel_booking))
        .route("/api/bookings/:id/confirm", post(routes::bookings::confirm_booking))
        .route("/api/bookings/:id/extend", post(routes::bookings::extend_hold))
        // Payment routes
        .route("/api/payments", post(routes::payments::create_payment))
        .route("/api/payments/:id", get(routes::payments::get_payment))
        .route("/api/payments/webhook/:provider", post(routes::payments::webhook))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("✓ Server listening on {}", addr);
    tracing::info!("📡 API ready at http://{}:{}/api", addr.ip(), port);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
