//! Recency and keyword predicates for feed items.
//!
//! Paper-search results never pass through here; the upstream query already
//! restricts them by journal and keyword.

use chrono::{DateTime, Utc};

/// The recency window and keyword list applied to one run's feed items.
#[derive(Debug, Clone, Copy)]
pub struct Criteria<'a> {
    pub keywords: &'a [String],
    pub window_days: i64,
    pub now: DateTime<Utc>,
}

impl Criteria<'_> {
    pub fn accepts(&self, published: Option<DateTime<Utc>>, title: &str, summary: &str) -> bool {
        is_recent(published, self.window_days, self.now) && is_relevant(title, summary, self.keywords)
    }
}

/// True when the item is undated or at most `window_days` whole days old.
pub fn is_recent(published: Option<DateTime<Utc>>, window_days: i64, now: DateTime<Utc>) -> bool {
    match published {
        Some(published) => (now - published).num_days() <= window_days,
        None => true,
    }
}

/// True when any keyword occurs, case-insensitively, in `title` or `summary`.
///
/// Keywords are plain substrings, so "agc" also matches inside longer words.
pub fn is_relevant(title: &str, summary: &str, keywords: &[String]) -> bool {
    let content = format!("{} {}", title, summary).to_lowercase();
    keywords
        .iter()
        .any(|keyword| content.contains(&keyword.to_lowercase()))
}
