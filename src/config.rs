use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Feed items older than this many days are dropped
    #[serde(default = "default_window_days")]
    pub window_days: i64,
    /// Where the rendered digest is written
    #[serde(default = "default_output")]
    pub output: String,
    /// Offset used for the "updated at" timestamp
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
    pub keywords: Vec<String>,
    pub mirrors: Vec<String>,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub feeds: Vec<FeedSource>,
    #[serde(default)]
    pub scholar: ScholarConfig,
}

fn default_window_days() -> i64 {
    30
}

fn default_output() -> String {
    "index.html".to_string()
}

fn default_utc_offset_hours() -> i32 {
    8
}

/// A feed route served by every RSSHub mirror.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FeedSource {
    pub name: String,
    pub path: String,
}

/// A journal looked up through the paper-search API.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScholarJournal {
    pub name: String,
    pub query_name: String,
}

/// Upper bound for either end of the download backoff range.
pub const MAX_FETCH_BACKOFF_SECS: f64 = 300.0;

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    /// Skip TLS certificate validation; some mirrors serve broken chains
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Sent with every request; some mirrors turn away bot-looking clients
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_fetch_attempts")]
    pub fetch_attempts: u32,
    #[serde(default = "default_fetch_backoff_min_secs")]
    pub fetch_backoff_min_secs: f64,
    #[serde(default = "default_fetch_backoff_max_secs")]
    pub fetch_backoff_max_secs: f64,
}

fn default_user_agent() -> String {
    "JournalDigest/1.0 (RSS Digest)".to_string()
}

fn default_probe_timeout_secs() -> u64 {
    15
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_fetch_attempts() -> u32 {
    3
}

fn default_fetch_backoff_min_secs() -> f64 {
    3.0
}

fn default_fetch_backoff_max_secs() -> f64 {
    5.0
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            accept_invalid_certs: false,
            user_agent: default_user_agent(),
            probe_timeout_secs: default_probe_timeout_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            fetch_attempts: default_fetch_attempts(),
            fetch_backoff_min_secs: default_fetch_backoff_min_secs(),
            fetch_backoff_max_secs: default_fetch_backoff_max_secs(),
        }
    }
}

impl NetworkConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScholarConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Disjunctive keyword expression appended to every journal query
    #[serde(default)]
    pub query_keywords: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Wait before every request, the first one included
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_rate_limit_backoff_secs")]
    pub rate_limit_backoff_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub journals: Vec<ScholarJournal>,
}

fn default_endpoint() -> String {
    "https://api.semanticscholar.org/graph/v1/paper/search".to_string()
}

fn default_page_size() -> u32 {
    5
}

fn default_cooldown_secs() -> u64 {
    3
}

fn default_max_attempts() -> u32 {
    3
}

fn default_rate_limit_backoff_secs() -> u64 {
    30
}

fn default_timeout_secs() -> u64 {
    20
}

impl Default for ScholarConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            query_keywords: String::new(),
            page_size: default_page_size(),
            cooldown_secs: default_cooldown_secs(),
            max_attempts: default_max_attempts(),
            rate_limit_backoff_secs: default_rate_limit_backoff_secs(),
            timeout_secs: default_timeout_secs(),
            journals: Vec::new(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.window_days < 0 {
            anyhow::bail!("window_days must not be negative");
        }
        if !(-23..=23).contains(&self.utc_offset_hours) {
            anyhow::bail!("utc_offset_hours must be within -23..=23");
        }
        if self.network.fetch_attempts == 0 || self.scholar.max_attempts == 0 {
            anyhow::bail!("attempt limits must be at least 1");
        }
        let (min, max) = (
            self.network.fetch_backoff_min_secs,
            self.network.fetch_backoff_max_secs,
        );
        if !(0.0..=MAX_FETCH_BACKOFF_SECS).contains(&min)
            || !(0.0..=MAX_FETCH_BACKOFF_SECS).contains(&max)
        {
            anyhow::bail!(
                "fetch backoff bounds must be within 0..={} seconds",
                MAX_FETCH_BACKOFF_SECS
            );
        }
        if min > max {
            anyhow::bail!("fetch backoff range is empty");
        }
        if let Some(feed) = self.feeds.iter().find(|f| f.name.is_empty()) {
            anyhow::bail!("feed with path '{}' has an empty name", feed.path);
        }
        if let Some(journal) = self.scholar.journals.iter().find(|j| j.name.is_empty()) {
            anyhow::bail!("journal '{}' has an empty name", journal.query_name);
        }
        Ok(())
    }
}
