use anyhow::{Context, Result};
use sahayak::config::Config;
use sahayak::openai::{OpenAiBatchTranslator, OpenAiClient};
use sahayak::profile::{InMemoryProfileStore, PgProfileStore, ProfileStore};
use sahayak::server::{self, AppState};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sahayak=info".parse()?),
        )
        .init();

    info!("Starting Sahayak translation service");

    let config = Config::from_env()?;

    let client = OpenAiClient::from_config(&config).context("Failed to build OpenAI client")?;
    let translator = OpenAiBatchTranslator::new(client, config.translate_max_batch);
    info!(
        "Using model {} (max {} strings per batch)",
        config.openai_model, config.translate_max_batch
    );

    let profiles: Arc<dyn ProfileStore> = match &config.database_url {
        Some(url) => {
            let store = PgProfileStore::connect(url)
                .await
                .context("Failed to connect to profile database")?;
            info!("Profile store: PostgreSQL");
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set, profiles are kept in memory and lost on restart");
            Arc::new(InMemoryProfileStore::new())
        }
    };

    if config.api_key.is_none() {
        warn!("API_KEY not set, /api endpoints are unauthenticated");
    }

    let state = AppState::new(
        Arc::new(translator),
        profiles,
        config.api_key.clone(),
        config.translate_max_batch,
    );

    server::serve(state, config.port).await
}
