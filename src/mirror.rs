use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::{error, info, warn};

/// Picks the first RSSHub mirror that answers at all.
pub struct MirrorSelector {
    client: Client,
    timeout: Duration,
}

impl MirrorSelector {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Probe `candidates` in order and return the first one that responds.
    ///
    /// Any HTTP status counts as reachable; only transport failures move on
    /// to the next candidate. Probing stops at the first success. Returns
    /// `None` when every candidate fails.
    pub async fn select(&self, candidates: &[String]) -> Option<String> {
        info!(
            "Looking for a reachable mirror among {} candidates (timeout {:?})",
            candidates.len(),
            self.timeout
        );

        for candidate in candidates {
            let start = Instant::now();
            match self
                .client
                .get(candidate.as_str())
                .timeout(self.timeout)
                .send()
                .await
            {
                Ok(response) => {
                    info!(
                        "Connected to mirror {} (status {}, {:.2}s)",
                        candidate,
                        response.status(),
                        start.elapsed().as_secs_f64()
                    );
                    return Some(candidate.clone());
                }
                Err(e) => {
                    warn!("Mirror {} unreachable: {}", candidate, describe(&e));
                }
            }
        }

        error!("No mirror reachable, feed sources will be skipped");
        None
    }
}

/// Short reason for a failed probe.
fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // Privileged port with no listener, refuses immediately
    const DEAD: &str = "http://127.0.0.1:1";

    fn selector() -> MirrorSelector {
        MirrorSelector::new(Client::new(), Duration::from_secs(2))
    }

    async fn live_mirror(status: u16, expected_probes: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .expect(expected_probes)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_first_reachable_wins() {
        let first = live_mirror(200, 1).await;
        let second = live_mirror(200, 0).await;

        let result = selector().select(&[first.uri(), second.uri()]).await;
        assert_eq!(result, Some(first.uri()));
    }

    #[tokio::test]
    async fn test_skips_dead_and_short_circuits() {
        let second = live_mirror(200, 1).await;
        let third = live_mirror(200, 0).await;

        let candidates = vec![DEAD.to_string(), second.uri(), third.uri()];
        let result = selector().select(&candidates).await;

        assert_eq!(result, Some(second.uri()));
        // `third` verifies on drop that it was never probed
    }

    #[tokio::test]
    async fn test_error_status_still_counts_as_reachable() {
        let broken = live_mirror(503, 1).await;

        let result = selector().select(&[broken.uri()]).await;
        assert_eq!(result, Some(broken.uri()));
    }

    #[tokio::test]
    async fn test_none_when_all_fail() {
        let candidates = vec![DEAD.to_string(), "http://127.0.0.1:2".to_string()];
        assert_eq!(selector().select(&candidates).await, None);
    }

    #[tokio::test]
    async fn test_empty_candidate_list() {
        assert_eq!(selector().select(&[]).await, None);
    }

    #[tokio::test]
    async fn test_slow_mirror_times_out() {
        let slow = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&slow)
            .await;
        let fast = live_mirror(200, 1).await;

        let selector = MirrorSelector::new(Client::new(), Duration::from_millis(200));
        let result = selector.select(&[slow.uri(), fast.uri()]).await;

        assert_eq!(result, Some(fast.uri()));
    }
}
