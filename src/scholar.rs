//! Semantic Scholar paper search, paced for the unauthenticated quota.
//!
//! Every request is preceded by a fixed cooldown. A 429 answer backs off
//! linearly and retries up to the attempt limit; any other failure abandons
//! the journal at once. No failure here ever stops the run.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{info, warn};

use crate::backoff::{rate_limit_delay, Sleep};
use crate::config::{ScholarConfig, ScholarJournal};
use crate::models::{
    first_present, truncate_summary, ArticleRecord, Origin, NO_ABSTRACT, NO_LINK, NO_TITLE,
    UNDATED,
};

const PAPER_FIELDS: &str = "title,url,abstract,publicationDate,year,paperId";
const PAPER_PAGE_BASE: &str = "https://www.semanticscholar.org/paper/";

#[derive(Debug, thiserror::Error)]
pub enum ScholarError {
    #[error("still rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Option<Vec<Paper>>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub paper_id: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub publication_date: Option<String>,
    pub year: Option<i32>,
}

pub struct ScholarClient<S> {
    client: Client,
    config: ScholarConfig,
    sleeper: S,
}

impl<S: Sleep> ScholarClient<S> {
    pub fn new(client: Client, config: ScholarConfig, sleeper: S) -> Self {
        Self {
            client,
            config,
            sleeper,
        }
    }

    /// Query parameters for one journal, restricted to the last two years.
    pub fn query_params(&self, journal: &ScholarJournal, current_year: i32) -> Vec<(&'static str, String)> {
        let query = format!(
            "journal:\"{}\" {}",
            journal.query_name, self.config.query_keywords
        );
        vec![
            ("query", query.trim_end().to_string()),
            ("year", format!("{}-{}", current_year - 1, current_year)),
            ("fields", PAPER_FIELDS.to_string()),
            ("limit", self.config.page_size.to_string()),
            ("sort", "publicationDate:desc".to_string()),
        ]
    }

    /// Search one journal.
    pub async fn search(
        &self,
        journal: &ScholarJournal,
        current_year: i32,
    ) -> Result<Vec<ArticleRecord>, ScholarError> {
        let params = self.query_params(journal, current_year);
        let cooldown = Duration::from_secs(self.config.cooldown_secs);
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let max_attempts = self.config.max_attempts;

        for attempt in 1..=max_attempts {
            self.sleeper.sleep(cooldown).await;

            let response = self
                .client
                .get(&self.config.endpoint)
                .query(&params)
                .timeout(timeout)
                .send()
                .await?;

            match response.status() {
                StatusCode::OK => {
                    let body = response.bytes().await?;
                    let parsed: SearchResponse = serde_json::from_slice(&body)?;
                    return Ok(parsed
                        .data
                        .unwrap_or_default()
                        .into_iter()
                        .map(|paper| paper_to_article(&journal.name, paper))
                        .collect());
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    if attempt < max_attempts {
                        let delay = rate_limit_delay(self.config.rate_limit_backoff_secs, attempt);
                        warn!(
                            "Rate limited on '{}', waiting {}s before retrying ({}/{})",
                            journal.name,
                            delay.as_secs(),
                            attempt,
                            max_attempts
                        );
                        self.sleeper.sleep(delay).await;
                    }
                }
                status => return Err(ScholarError::Status(status)),
            }
        }

        Err(ScholarError::RateLimited {
            attempts: max_attempts,
        })
    }

    /// Search every journal in order, skipping the ones that fail.
    pub async fn collect(&self, journals: &[ScholarJournal], current_year: i32) -> Vec<ArticleRecord> {
        let mut articles = Vec::new();
        info!("Searching {} journals via the paper-search API", journals.len());

        for (i, journal) in journals.iter().enumerate() {
            info!("[{}/{}] Searching: {}", i + 1, journals.len(), journal.name);
            match self.search(journal, current_year).await {
                Ok(found) => {
                    info!("Found {} papers in '{}'", found.len(), journal.name);
                    articles.extend(found);
                }
                Err(e) => warn!("Skipping journal '{}': {}", journal.name, e),
            }
        }

        articles
    }
}

/// Map a search result to a record, filling gaps with fixed fallbacks.
pub fn paper_to_article(source_name: &str, paper: Paper) -> ArticleRecord {
    let generated_link = paper
        .paper_id
        .filter(|id| !id.trim().is_empty())
        .map(|id| format!("{}{}", PAPER_PAGE_BASE, id));

    ArticleRecord {
        source: source_name.to_string(),
        title: first_present([paper.title], NO_TITLE),
        link: first_present([paper.url, generated_link], NO_LINK),
        date: first_present(
            [paper.publication_date, paper.year.map(|y| y.to_string())],
            UNDATED,
        ),
        summary: truncate_summary(&first_present([paper.abstract_text], NO_ABSTRACT)),
        origin: Origin::Scholar,
    }
}
