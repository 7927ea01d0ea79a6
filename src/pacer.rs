//! Request pacing.
//!
//! Every outbound request is preceded by a [`Pacer::wait`]. The production
//! pacer sleeps for a random duration inside a fixed window; it does not react
//! to latency or errors.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::trace;

pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(1500);

#[async_trait]
pub trait Pacer: Send + Sync {
    async fn wait(&self);
}

/// Sleeps a uniformly random duration in `[min, max)` before each request.
#[derive(Debug, Clone)]
pub struct JitterPacer {
    min: Duration,
    max: Duration,
}

impl JitterPacer {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// Draws the next delay. A window with `max <= min` always yields `min`.
    pub fn next_delay(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let secs = rand::thread_rng().gen_range(self.min.as_secs_f64()..self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

impl Default for JitterPacer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DELAY, DEFAULT_MAX_DELAY)
    }
}

#[async_trait]
impl Pacer for JitterPacer {
    async fn wait(&self) {
        let delay = self.next_delay();
        trace!(delay_ms = delay.as_millis() as u64, "Pacing");
        tokio::time::sleep(delay).await;
    }
}

/// Never waits. Used by tests and for runs against a local mirror.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantPacer;

#[async_trait]
impl Pacer for InstantPacer {
    async fn wait(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_bounds() {
        let pacer = JitterPacer::default();
        for _ in 0..1000 {
            let delay = pacer.next_delay();
            assert!(delay >= DEFAULT_MIN_DELAY, "{delay:?} below window");
            assert!(delay < DEFAULT_MAX_DELAY, "{delay:?} above window");
        }
    }

    #[test]
    fn test_degenerate_window_returns_min() {
        let pacer = JitterPacer::new(Duration::from_millis(20), Duration::from_millis(10));
        assert_eq!(pacer.next_delay(), Duration::from_millis(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_sleeps_inside_window() {
        let pacer = JitterPacer::default();
        let start = tokio::time::Instant::now();
        pacer.wait().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= DEFAULT_MIN_DELAY);
        assert!(elapsed < DEFAULT_MAX_DELAY + Duration::from_millis(5));
    }

    #[tokio::test]
    async fn test_instant_pacer_does_not_sleep() {
        let start = std::time::Instant::now();
        InstantPacer.wait().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
