use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use anime_recommender::{
    catalog::load_catalog,
    config::Config,
    routes::{create_router, AppState},
    services::CsvFeedbackStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("anime_recommender=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let catalog = load_catalog(&config.catalog_path)
        .with_context(|| format!("Failed to load catalog from {}", config.catalog_path))?;
    let feedback_store = Arc::new(CsvFeedbackStore::new(&config.feedback_path));
    let addr = config.bind_addr();

    let state = Arc::new(AppState::new(catalog, feedback_store, config));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
