use anyhow::Context;
use dotenv::dotenv;
use services::{AppServices, Clock};
use storage::repository::Storage;
use storage::sqlite::{SqliteRepository, ensure_database_file};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::state::AppState;

/// Accept both bare file paths ("learning_app.db") and full sqlx URLs.
fn normalize_database_url(raw: &str) -> String {
    if raw.starts_with("sqlite:") {
        raw.to_string()
    } else {
        format!("sqlite:{raw}")
    }
}

fn database_url() -> String {
    let raw = std::env::var("DATABASE_URL").unwrap_or_else(|_| "learning_app.db".into());
    normalize_database_url(&raw)
}

fn port() -> anyhow::Result<u16> {
    match std::env::var("PORT") {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("invalid PORT value: {raw}")),
        Err(_) => Ok(8080),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=debug,api=debug,services=debug,tower_http=debug",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv().ok();

    let db_url = database_url();
    ensure_database_file(&db_url).context("failed to create the database file")?;

    let repo = SqliteRepository::connect(&db_url)
        .await
        .with_context(|| format!("failed to open {db_url}"))?;
    repo.migrate().await.context("failed to run migrations")?;

    // Keep a pool handle so the health endpoint can ping the database.
    let pool = repo.pool().clone();
    let storage = Storage::from_sqlite(repo);
    let services = AppServices::with_storage(&storage, Clock::default());
    let state = AppState::new(services).with_db(pool);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port()?));
    info!("listening on {addr} (database: {db_url})");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;
    axum::serve(listener, api::app(state))
        .await
        .context("failed to serve application")?;

    Ok(())
}
