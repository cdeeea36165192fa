use anyhow::Context;
use std::net::SocketAddr;

use serenote_api::{config::Config, db, router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "serenote_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env()?;

    let db = db::create_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    db::MIGRATOR
        .run(&db)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let addr = config.listen_addr();
    let state = AppState::new(db, config);
    state.rate_limiter.spawn_cleanup_worker();

    let app = router(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    // Client addresses feed the auth rate limiter.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
