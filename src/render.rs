use std::path::Path;

use askama::Template;
use chrono::{DateTime, FixedOffset, Utc};

use crate::models::ArticleRecord;

/// Everything the HTML page needs from one run.
#[derive(Debug, Clone, Template)]
#[template(path = "digest.html")]
pub struct Digest {
    pub articles: Vec<ArticleRecord>,
    pub updated_at: String,
}

impl Digest {
    pub fn to_html(&self) -> anyhow::Result<String> {
        Ok(self.render()?)
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        std::fs::write(path, self.to_html()?)?;
        Ok(())
    }
}

/// Format `now` in the given UTC offset as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(now: DateTime<Utc>, utc_offset_hours: i32) -> anyhow::Result<String> {
    let offset = FixedOffset::east_opt(utc_offset_hours * 3600)
        .ok_or_else(|| anyhow::anyhow!("invalid UTC offset: {} hours", utc_offset_hours))?;
    Ok(now
        .with_timezone(&offset)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Origin;
    use chrono::TimeZone;
    use tempfile::NamedTempFile;

    fn article(title: &str, origin: Origin) -> ArticleRecord {
        ArticleRecord {
            source: "IEEE TPWRS".to_string(),
            title: title.to_string(),
            link: "https://example.com/a".to_string(),
            date: "2026-10-17".to_string(),
            summary: "Summary text".to_string(),
            origin,
        }
    }

    #[test]
    fn test_timestamp_in_offset() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 20, 30, 5).unwrap();
        assert_eq!(format_timestamp(now, 8).unwrap(), "2026-10-20 04:30:05");
        assert_eq!(format_timestamp(now, 0).unwrap(), "2026-10-19 20:30:05");
        assert_eq!(format_timestamp(now, -5).unwrap(), "2026-10-19 15:30:05");
    }

    #[test]
    fn test_timestamp_rejects_bad_offset() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
        assert!(format_timestamp(now, 24).is_err());
    }

    #[test]
    fn test_empty_digest_renders_placeholder() {
        let digest = Digest {
            articles: Vec::new(),
            updated_at: "2026-10-19 12:00:00".to_string(),
        };
        let html = digest.to_html().unwrap();

        assert!(html.contains("No Updates Found"));
        assert!(html.contains("2026-10-19 12:00:00"));
    }

    #[test]
    fn test_articles_rendered() {
        let digest = Digest {
            articles: vec![
                article("Primary Frequency Control Study", Origin::Feed),
                article("Inertia estimation", Origin::Scholar),
            ],
            updated_at: "now".to_string(),
        };
        let html = digest.to_html().unwrap();

        assert!(!html.contains("No Updates Found"));
        assert!(html.contains("Primary Frequency Control Study"));
        assert!(html.contains("Inertia estimation"));
        assert!(html.contains("tag-scholar\""));
        assert_eq!(html.matches("class=\"badge-source\"").count(), 2);
    }

    #[test]
    fn test_content_is_escaped() {
        let digest = Digest {
            articles: vec![article("<script>alert(1)</script>", Origin::Feed)],
            updated_at: "now".to_string(),
        };
        let html = digest.to_html().unwrap();

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_write_to_file() {
        let digest = Digest {
            articles: vec![article("Frequency", Origin::Feed)],
            updated_at: "now".to_string(),
        };
        let file = NamedTempFile::new().unwrap();

        digest.write_to(file.path()).unwrap();

        let written = std::fs::read_to_string(file.path()).unwrap();
        assert!(written.contains("Frequency"));
    }
}
