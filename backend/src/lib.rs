use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod garden;
pub mod handlers;
pub mod models;
pub mod services;

use auth::rate_limit::RateLimitState;
use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimitState,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let rate_limiter = RateLimitState::new(
            config.auth_rate_limit_max,
            config.auth_rate_limit_window_secs,
        );
        Self {
            db,
            config: Arc::new(config),
            rate_limiter,
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = std::iter::once(&config.frontend_url)
        .chain(config.cors_extra_origins.iter())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

/// The full application router. Serve it with
/// `into_make_service_with_connect_info::<SocketAddr>()`: the auth rate
/// limiter keys on the client address.
pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_auth,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(auth_routes);

    let protected_routes = Router::new()
        .route("/api/me", get(handlers::auth::me))
        .route("/api/auth/logout", post(handlers::auth::logout))
        // Garden
        .route("/api/garden", get(handlers::garden::get_garden))
        .route("/api/garden/mood", post(handlers::garden::log_mood))
        .route("/api/garden/water", post(handlers::garden::water_garden))
        .route(
            "/api/garden/achievements",
            get(handlers::garden::list_achievements),
        )
        // Journal entries
        .route("/api/entries", get(handlers::entries::list_entries))
        .route("/api/entries", post(handlers::entries::create_text_entry))
        .route(
            "/api/entries/voice",
            post(handlers::entries::create_voice_entry)
                .layer(DefaultBodyLimit::max(state.config.max_audio_bytes)),
        )
        .route("/api/entries/mood-stats", get(handlers::entries::mood_stats))
        .route("/api/entries/:id", get(handlers::entries::get_entry))
        .route("/api/entries/:id", delete(handlers::entries::delete_entry))
        .route(
            "/api/entries/:id/audio",
            get(handlers::entries::get_entry_audio),
        )
        // Todos
        .route("/api/todos", get(handlers::todos::list_todos))
        .route("/api/todos", post(handlers::todos::create_todo))
        .route("/api/todos/stats", get(handlers::todos::todo_stats))
        .route("/api/todos/:id", put(handlers::todos::update_todo))
        .route("/api/todos/:id", delete(handlers::todos::delete_todo))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors_layer(&state.config))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
