/// Summaries longer than this many characters are cut.
pub const SUMMARY_LIMIT: usize = 200;
pub const TRUNCATION_MARKER: &str = "...";

pub const NO_TITLE: &str = "No Title";
pub const NO_ABSTRACT: &str = "No abstract available.";
pub const NO_LINK: &str = "#";
pub const UNDATED: &str = "Recent";

/// Which kind of source produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// RSSHub feed, filtered locally
    Feed,
    /// Paper-search API, filtered by the upstream query
    Scholar,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub source: String,
    pub title: String,
    pub link: String,
    pub date: String,
    pub summary: String,
    pub origin: Origin,
}

impl ArticleRecord {
    /// CSS class for the card in the rendered digest.
    pub fn card_class(&self) -> &'static str {
        match self.origin {
            Origin::Feed => "article-card",
            Origin::Scholar => "article-card tag-scholar",
        }
    }
}

/// Cut `text` to [`SUMMARY_LIMIT`] characters and append the marker.
/// Text at or under the limit is returned unchanged.
pub fn truncate_summary(text: &str) -> String {
    match text.char_indices().nth(SUMMARY_LIMIT) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Return the first candidate that is present and not blank, else `sentinel`.
///
/// Candidates are evaluated in order, so callers list their fallbacks from
/// most to least preferred.
pub fn first_present<I>(candidates: I, sentinel: &str) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| sentinel.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod truncate_summary_tests {
        use super::*;

        #[test]
        fn test_short_text_unchanged() {
            assert_eq!(truncate_summary("A short abstract."), "A short abstract.");
        }

        #[test]
        fn test_empty_text_unchanged() {
            assert_eq!(truncate_summary(""), "");
        }

        #[test]
        fn test_exactly_at_limit_unchanged() {
            let text = "a".repeat(SUMMARY_LIMIT);
            assert_eq!(truncate_summary(&text), text);
        }

        #[test]
        fn test_one_over_limit_is_cut() {
            let text = "a".repeat(SUMMARY_LIMIT + 1);
            let result = truncate_summary(&text);
            assert_eq!(result.chars().count(), 203);
            assert_eq!(result, format!("{}...", "a".repeat(SUMMARY_LIMIT)));
        }

        #[test]
        fn test_long_text_is_exactly_203_chars() {
            for len in [201, 250, 1000] {
                let text = "x".repeat(len);
                assert_eq!(truncate_summary(&text).chars().count(), 203);
            }
        }

        #[test]
        fn test_counts_characters_not_bytes() {
            // Three bytes per character in UTF-8
            let text = "频".repeat(SUMMARY_LIMIT + 10);
            let result = truncate_summary(&text);
            assert_eq!(result.chars().count(), 203);
            assert!(result.starts_with("频频"));
            assert!(result.ends_with(TRUNCATION_MARKER));

            let fits = "频".repeat(SUMMARY_LIMIT);
            assert_eq!(truncate_summary(&fits), fits);
        }
    }

    mod first_present_tests {
        use super::*;

        #[test]
        fn test_first_candidate_wins() {
            let result = first_present(
                [Some("2024-05-01".to_string()), Some("2024".to_string())],
                UNDATED,
            );
            assert_eq!(result, "2024-05-01");
        }

        #[test]
        fn test_falls_through_missing_and_blank() {
            let result = first_present(
                [None, Some("   ".to_string()), Some("2024".to_string())],
                UNDATED,
            );
            assert_eq!(result, "2024");
        }

        #[test]
        fn test_sentinel_when_nothing_present() {
            let result = first_present([None, Some(String::new())], UNDATED);
            assert_eq!(result, "Recent");
        }

        #[test]
        fn test_no_candidates() {
            let result = first_present(Vec::<Option<String>>::new(), NO_TITLE);
            assert_eq!(result, "No Title");
        }
    }

    #[test]
    fn test_card_class_by_origin() {
        let mut record = ArticleRecord {
            source: "IEEE TSG".to_string(),
            title: "t".to_string(),
            link: NO_LINK.to_string(),
            date: String::new(),
            summary: String::new(),
            origin: Origin::Feed,
        };
        assert_eq!(record.card_class(), "article-card");

        record.origin = Origin::Scholar;
        assert!(record.card_class().contains("tag-scholar"));
    }
}
