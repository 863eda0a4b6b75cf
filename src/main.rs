use chrono::Utc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use journal_digest::backoff::TokioSleep;
use journal_digest::config::Config;
use journal_digest::pipeline::Pipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "journal_digest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::var("DIGEST_CONFIG").unwrap_or_else(|_| "digest.toml".to_string());
    let config = Config::load(&config_path)?;
    info!(
        "Loaded {} feeds and {} journals from {}",
        config.feeds.len(),
        config.scholar.journals.len(),
        config_path
    );

    let output = config.output.clone();
    let pipeline = Pipeline::new(config, TokioSleep)?;
    let digest = pipeline.run(Utc::now()).await?;

    digest.write_to(&output)?;
    info!("Wrote {} articles to {}", digest.articles.len(), output);

    Ok(())
}
