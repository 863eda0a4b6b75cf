use chrono::{DateTime, Datelike, Utc};
use tracing::{info, warn};

use crate::backoff::Sleep;
use crate::config::Config;
use crate::fetcher::{build_client, Fetcher};
use crate::filter::Criteria;
use crate::mirror::MirrorSelector;
use crate::models::ArticleRecord;
use crate::render::{format_timestamp, Digest};
use crate::scholar::ScholarClient;

/// One fetch → filter → render pass over every configured source.
pub struct Pipeline<S> {
    config: Config,
    mirrors: MirrorSelector,
    fetcher: Fetcher<S>,
    scholar: ScholarClient<S>,
}

impl<S: Sleep + Clone> Pipeline<S> {
    pub fn new(config: Config, sleeper: S) -> anyhow::Result<Self> {
        let client = build_client(&config.network)?;

        let mirrors = MirrorSelector::new(client.clone(), config.network.probe_timeout());
        let fetcher = Fetcher::new(client.clone(), &config.network, sleeper.clone());
        let scholar = ScholarClient::new(client, config.scholar.clone(), sleeper);

        Ok(Self {
            config,
            mirrors,
            fetcher,
            scholar,
        })
    }

    /// Gather API results, then the filtered feed items when a mirror is up.
    pub async fn collect(&self, now: DateTime<Utc>) -> Vec<ArticleRecord> {
        let mirror = self.mirrors.select(&self.config.mirrors).await;

        let mut articles = self
            .scholar
            .collect(&self.config.scholar.journals, now.year())
            .await;

        let Some(mirror) = mirror else {
            warn!(
                "Skipping {} feed sources: no mirror available",
                self.config.feeds.len()
            );
            return articles;
        };

        let criteria = Criteria {
            keywords: &self.config.keywords,
            window_days: self.config.window_days,
            now,
        };
        info!(
            "Fetching {} feeds from {} (window: {} days)",
            self.config.feeds.len(),
            mirror,
            self.config.window_days
        );

        for source in &self.config.feeds {
            match self.fetcher.collect_feed(source, &mirror, &criteria).await {
                Ok(found) => articles.extend(found),
                Err(e) => warn!("Skipping feed '{}': {}", source.name, e),
            }
        }

        articles
    }

    /// Collect everything and stamp the result with the local update time.
    pub async fn run(&self, now: DateTime<Utc>) -> anyhow::Result<Digest> {
        let articles = self.collect(now).await;
        let updated_at = format_timestamp(now, self.config.utc_offset_hours)?;
        info!("Collected {} articles", articles.len());

        Ok(Digest {
            articles,
            updated_at,
        })
    }
}
