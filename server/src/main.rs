//! moundmusic API server.
//!
//! Run from repo root: `cargo run -p moundmusic-server`
//! Without `DATABASE_URL` the catalog lives in memory and is lost on exit.

use moundmusic::{
    app, apply_migrations, config::DEFAULT_LOG_FILTER, ensure_database_exists, init_tracing,
    AppState, PgStore, Settings,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing(DEFAULT_LOG_FILTER);

    let settings = Settings::from_env()?;
    let state = match settings.database_url.as_deref() {
        Some(database_url) => {
            ensure_database_exists(database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .connect(database_url)
                .await?;
            apply_migrations(&pool).await?;
            tracing::info!("using PostgreSQL store");
            AppState::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store");
            AppState::in_memory()
        }
    };

    let router = app(state, settings.body_limit);
    let listener = TcpListener::bind(settings.listen_addr).await?;
    tracing::info!("moundmusic listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
