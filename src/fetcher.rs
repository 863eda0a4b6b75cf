use std::time::Duration;

use feed_rs::model::Entry;
use feed_rs::parser;
use reqwest::Client;
use tracing::{error, info, warn};

use crate::backoff::{jittered_delay, Sleep};
use crate::config::{FeedSource, NetworkConfig};
use crate::filter::Criteria;
use crate::models::{first_present, truncate_summary, ArticleRecord, Origin, NO_LINK, NO_TITLE};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("giving up on {url} after {attempts} attempts: {last_error}")]
    Exhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },
    #[error("failed to parse feed: {0}")]
    Feed(#[from] parser::ParseFeedError),
}

/// Build the HTTP client shared by every component of a run.
pub fn build_client(network: &NetworkConfig) -> anyhow::Result<Client> {
    if network.accept_invalid_certs {
        warn!("TLS certificate validation is disabled");
    }
    let client = Client::builder()
        .user_agent(network.user_agent.as_str())
        .danger_accept_invalid_certs(network.accept_invalid_certs)
        .build()?;
    Ok(client)
}

/// Downloads feed documents with a bounded number of attempts.
pub struct Fetcher<S> {
    client: Client,
    sleeper: S,
    timeout: Duration,
    attempts: u32,
    backoff_min_secs: f64,
    backoff_max_secs: f64,
}

impl<S: Sleep> Fetcher<S> {
    pub fn new(client: Client, network: &NetworkConfig, sleeper: S) -> Self {
        Self {
            client,
            sleeper,
            timeout: network.fetch_timeout(),
            attempts: network.fetch_attempts,
            backoff_min_secs: network.fetch_backoff_min_secs,
            backoff_max_secs: network.fetch_backoff_max_secs,
        }
    }

    /// Download `url`, retrying transport errors and non-2xx responses.
    ///
    /// Waits a random interval between attempts. Returns
    /// [`FetchError::Exhausted`] once every attempt has failed.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut last_error = String::new();

        for attempt in 1..=self.attempts {
            match self.try_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!(
                        "[Attempt {}/{}] download of {} failed: {}",
                        attempt, self.attempts, url, e
                    );
                    last_error = e.to_string();
                }
            }

            if attempt < self.attempts {
                let delay = jittered_delay(
                    self.backoff_min_secs,
                    self.backoff_max_secs,
                    &mut rand::rng(),
                );
                self.sleeper.sleep(delay).await;
            }
        }

        error!("Unable to download {}", url);
        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts: self.attempts,
            last_error,
        })
    }

    async fn try_fetch(&self, url: &str) -> Result<Vec<u8>, reqwest::Error> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Fetch one feed from `mirror` and keep the entries `criteria` accepts.
    pub async fn collect_feed(
        &self,
        source: &FeedSource,
        mirror: &str,
        criteria: &Criteria<'_>,
    ) -> Result<Vec<ArticleRecord>, FetchError> {
        let url = format!("{}{}", mirror.trim_end_matches('/'), source.path);
        info!("Fetching feed: {} ({})", source.name, url);

        let body = self.fetch(&url).await?;
        let articles = parse_feed(&body, &source.name, criteria)?;

        info!("Kept {} relevant items for feed '{}'", articles.len(), source.name);
        Ok(articles)
    }
}

/// Parse a feed document and map the accepted entries to records.
pub fn parse_feed(
    body: &[u8],
    source_name: &str,
    criteria: &Criteria<'_>,
) -> Result<Vec<ArticleRecord>, FetchError> {
    let parsed = parser::parse(body)?;

    if parsed.entries.is_empty() {
        warn!("Feed '{}' has no entries", source_name);
        return Ok(Vec::new());
    }

    let articles = parsed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let published = entry.published;
            let article = entry_to_article(source_name, entry);
            criteria
                .accepts(published, &article.title, &article.summary)
                .then(|| ArticleRecord {
                    summary: truncate_summary(&article.summary),
                    ..article
                })
        })
        .collect();

    Ok(articles)
}

/// Map a feed entry to a record with the full, untruncated summary.
pub fn entry_to_article(source_name: &str, entry: Entry) -> ArticleRecord {
    let title = first_present([entry.title.map(|t| t.content)], NO_TITLE);
    let summary = first_present(
        [
            entry.summary.map(|t| t.content),
            entry.content.and_then(|c| c.body),
        ],
        "",
    );
    let link = first_present([entry.links.into_iter().next().map(|l| l.href)], NO_LINK);
    let date = entry
        .published
        .or(entry.updated)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    ArticleRecord {
        source: source_name.to_string(),
        title,
        link,
        date,
        summary,
        origin: Origin::Feed,
    }
}
