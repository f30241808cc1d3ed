use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use color_eyre::eyre::{Context, eyre};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    database::Database,
    http_server::{
        http_routes::{self, games, genres},
        state::AppState,
    },
};

pub struct HttpServerConfig {
    pub port: u16,
    pub database: Arc<Database>,
    pub allowed_origins: Vec<String>,
}

/// The `/api` resource routes, without CORS.
pub fn router(app_state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/games", get(games::index).post(games::store))
        .route(
            "/games/{game}",
            get(games::show)
                .put(games::update)
                .patch(games::update)
                .delete(games::destroy),
        )
        .route("/games/{game}/add-genres", post(games::add_genres))
        .route("/genres", get(genres::index).post(genres::store))
        .route(
            "/genres/{genre}",
            get(genres::show)
                .put(genres::update)
                .patch(genres::update)
                .delete(genres::destroy),
        )
        .route("/genres/{genre}/add-games", post(genres::add_games));

    Router::new()
        .nest("/api", api)
        .fallback(http_routes::fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

fn cors_layer(allowed_origins: &[String]) -> color_eyre::Result<CorsLayer> {
    if allowed_origins.is_empty() {
        if cfg!(debug_assertions) {
            return Ok(CorsLayer::permissive());
        }
        // Same-origin only
        return Ok(CorsLayer::new());
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .wrap_err_with(|| eyre!("Invalid CORS origin: {}", origin))
        })
        .collect::<color_eyre::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

pub async fn start(config: HttpServerConfig) -> color_eyre::Result<()> {
    let app_state = Arc::new(AppState::new(config.database));

    let app = router(app_state).layer(ServiceBuilder::new().layer(cors_layer(&config.allowed_origins)?));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| eyre!("Failed to bind to port {}", config.port))?;

    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Failed to start HTTP server")?;

    Ok(())
}
