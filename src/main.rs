use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use clap::Parser;
use tokio::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rategate::config::{Args, RateLimitConfig};
use rategate::handlers;
use rategate::middleware::rate_limit;
use rategate::state::AppState;
use rategate::sweeper::spawn_sweeper;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rategate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // parse cli arguments
    let args = Args::parse();

    // the default limit is CLI-tunable; presets are fixed. Both fail fast
    // here rather than per request
    let default_limit = RateLimitConfig::new(args.points, args.duration, args.block_duration);
    for config in [
        &default_limit,
        &RateLimitConfig::login(),
        &RateLimitConfig::password_reset(),
        &RateLimitConfig::api_access(),
    ] {
        if let Err(err) = config.validate() {
            error!(%err, "invalid rate limit configuration");
            std::process::exit(1);
        }
    }
    if args.sweep_interval == 0 {
        error!("sweep interval must be at least 1 second");
        std::process::exit(1);
    }

    // creating shared state
    let state = Arc::new(AppState::new());

    // spawn the background sweeper
    let _sweeper = spawn_sweeper(state.clone(), Duration::from_secs(args.sweep_interval));

    // each route group mounts the middleware with its own preset
    let login_routes = Router::new()
        .route("/api/v1/auth/login", post(handlers::login_handler))
        .route_layer(from_fn_with_state(
            (state.clone(), RateLimitConfig::login()),
            rate_limit,
        ));
    let password_reset_routes = Router::new()
        .route(
            "/api/v1/auth/password-reset",
            post(handlers::password_reset_handler),
        )
        .route_layer(from_fn_with_state(
            (state.clone(), RateLimitConfig::password_reset()),
            rate_limit,
        ));
    let api_routes = Router::new()
        .route("/api/v1/status", get(handlers::status_handler))
        .route_layer(from_fn_with_state(
            (state.clone(), RateLimitConfig::api_access()),
            rate_limit,
        ));
    let default_routes = Router::new()
        .route("/api/v1/ping", get(handlers::ping_handler))
        .route_layer(from_fn_with_state(
            (state.clone(), default_limit.clone()),
            rate_limit,
        ));

    // health and metrics stay unthrottled
    let app = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .merge(login_routes)
        .merge(password_reset_routes)
        .merge(api_routes)
        .merge(default_routes);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    info!(port = args.port, "rategate listening");
    info!(
        points = default_limit.points,
        duration = default_limit.duration_secs,
        block = default_limit.block_duration_secs,
        sweep_interval = args.sweep_interval,
        "default limit"
    );
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
