//! Executor and scheduler traits used by the step runner.

use async_trait::async_trait;
use rand::Rng;
use sf_protocol::{AgentName, Operation, OperationOutcome, TimingConfig};
use std::time::Duration;

/// Performs the work behind one operation of an agent run.
///
/// The step runner calls `execute` once per operation, strictly in list
/// order, and never concurrently.
#[async_trait]
pub trait OperationExecutor: Send + Sync {
    async fn execute(&self, agent: AgentName, operation: &Operation) -> OperationOutcome;
}

/// Source of suspension for simulated work.
///
/// Production code sleeps on the tokio timer; tests substitute a scheduler
/// that returns immediately.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Never waits; only yields so other tasks get to run.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantScheduler;

#[async_trait]
impl Scheduler for InstantScheduler {
    async fn sleep(&self, _duration: Duration) {
        tokio::task::yield_now().await;
    }
}

/// Bounded uniform distribution of simulated operation durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayPolicy {
    min: Duration,
    max: Duration,
}

impl DelayPolicy {
    /// Durations drawn from `[min, max)`. A degenerate range always yields `min`.
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub fn fixed(duration: Duration) -> Self {
        Self::new(duration, duration)
    }

    pub fn from_timing(timing: &TimingConfig) -> Self {
        Self::new(
            Duration::from_millis(timing.min_operation_ms),
            Duration::from_millis(timing.max_operation_ms),
        )
    }

    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..self.max)
    }
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self::from_timing(&TimingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_policy_stays_in_bounds() {
        let policy = DelayPolicy::new(Duration::from_millis(1000), Duration::from_millis(3000));
        for _ in 0..200 {
            let d = policy.sample();
            assert!(d >= Duration::from_millis(1000));
            assert!(d < Duration::from_millis(3000));
        }
    }

    #[test]
    fn test_delay_policy_degenerate_range() {
        let policy = DelayPolicy::fixed(Duration::from_millis(7));
        assert_eq!(policy.sample(), Duration::from_millis(7));

        let inverted = DelayPolicy::new(Duration::from_millis(9), Duration::from_millis(3));
        assert_eq!(inverted.sample(), Duration::from_millis(9));
    }

    #[test]
    fn test_default_policy_matches_default_timing() {
        assert_eq!(
            DelayPolicy::default(),
            DelayPolicy::new(Duration::from_millis(1000), Duration::from_millis(3000))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_sleeps_on_paused_clock() {
        let start = tokio::time::Instant::now();
        TokioScheduler.sleep(Duration::from_secs(5)).await;
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_instant_scheduler_does_not_advance_clock() {
        let start = tokio::time::Instant::now();
        InstantScheduler.sleep(Duration::from_secs(5)).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
