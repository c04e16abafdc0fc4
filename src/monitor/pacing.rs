//! Request pacing: pre-request jitter and retry backoff
//!
//! Both waits go through a [`Sleeper`] so tests can record them instead of
//! actually suspending.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Something that can suspend the current run for a duration
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Samples the pre-request delay uniformly from `[min_secs, max_secs]`
///
/// Bounds are validated at config load; `min_secs == max_secs` returns that
/// exact value. Values too large for a `Duration` saturate at `Duration::MAX`.
pub fn sample_delay<R: Rng>(rng: &mut R, min_secs: f64, max_secs: f64) -> Duration {
    let secs = if max_secs > min_secs {
        rng.gen_range(min_secs..=max_secs)
    } else {
        min_secs
    };
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

/// Backoff to wait after failed attempt `attempt` (1-based)
///
/// The wait is `factor^(attempt - 1)` seconds, saturating at `Duration::MAX`.
pub fn backoff_delay(factor: f64, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
    let secs = factor.powi(exponent);
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
