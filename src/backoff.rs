//! Wait-time policies and the sleep seam used by every retry loop.
//!
//! The policies are plain functions from attempt number to [`Duration`]; the
//! loops that act on them take a [`Sleep`] implementation so tests can record
//! the requested waits instead of serving them.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Something that can wait for a duration.
pub trait Sleep {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Real waits on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleep;

impl Sleep for TokioSleep {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Uniformly random wait in `[min_secs, max_secs]`, used between download attempts.
///
/// A degenerate or non-finite range yields `min_secs`; a bound that is not a
/// valid duration yields zero.
pub fn jittered_delay<R: Rng>(min_secs: f64, max_secs: f64, rng: &mut R) -> Duration {
    let secs = if max_secs > min_secs && (max_secs - min_secs).is_finite() {
        rng.random_range(min_secs..=max_secs)
    } else {
        min_secs
    };
    Duration::try_from_secs_f64(secs).unwrap_or_default()
}

/// Linear backoff after a rate-limit response: `base × attempt`.
///
/// `attempt` is 1-based, giving 30s, 60s, 90s... for a 30s base.
pub fn rate_limit_delay(base_secs: u64, attempt: u32) -> Duration {
    Duration::from_secs(base_secs.saturating_mul(u64::from(attempt)))
}
