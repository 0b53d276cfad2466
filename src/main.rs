mod bootstrap;
mod config;
mod database;
mod error;
mod models;
mod routes;
mod store;

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::routes::AppState;
use crate::store::{OrderStore, PgOrderStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::from_env();

    let client = bootstrap::run(&config).await?;
    let store: Arc<dyn OrderStore> = Arc::new(PgOrderStore::new(client));
    bootstrap::seed_sample_orders(store.as_ref()).await;

    let app = routes::router(AppState { store });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.listen_port)).await?;
    info!(
        "backend server running on http://0.0.0.0:{}",
        config.listen_port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
