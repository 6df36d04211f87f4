//! Bounded polling for content that appears asynchronously.
//!
//! Pages hydrate on their own schedule and never announce completion, so
//! the only option is to look again after a wait until either the wanted
//! state shows up or the time budget runs out. [`poll_until`] implements
//! that loop once; each call site supplies a [`Probe`].

use std::time::Duration;

use async_trait::async_trait;

use crate::app::Result;

/// How a poll loop ended. Both variants carry the last observed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The probe reported the value ready
    Found(T),
    /// The budget ran out first
    TimedOut(T),
}

impl<T> PollOutcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, PollOutcome::Found(_))
    }

    /// The last observed value, whichever way the loop ended
    pub fn into_inner(self) -> T {
        match self {
            PollOutcome::Found(v) | PollOutcome::TimedOut(v) => v,
        }
    }

    pub fn as_inner(&self) -> &T {
        match self {
            PollOutcome::Found(v) | PollOutcome::TimedOut(v) => v,
        }
    }
}

/// Wait interval and total budget of one poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub interval: Duration,
    pub budget: Duration,
}

/// Something a poll loop can repeatedly look at.
#[async_trait]
pub trait Probe: Send {
    type Output: Send;

    /// Runs before each wait interval
    async fn nudge(&mut self) -> Result<()> {
        Ok(())
    }

    /// Take one observation
    async fn observe(&mut self) -> Result<Self::Output>;

    /// Whether the observation satisfies the stop condition
    fn is_ready(&self, observed: &Self::Output) -> bool;
}

/// Poll `probe` until it is ready or the budget is spent.
///
/// Every iteration nudges, sleeps one interval, charges the interval to the
/// budget and observes. The loop always runs at least once and stops on the
/// first ready observation or once the remaining budget reaches zero.
/// Probe errors abort the loop.
pub async fn poll_until<P: Probe>(
    probe: &mut P,
    schedule: PollSchedule,
) -> Result<PollOutcome<P::Output>> {
    let mut remaining = schedule.budget;

    loop {
        probe.nudge().await?;
        tokio::time::sleep(schedule.interval).await;
        remaining = remaining.saturating_sub(schedule.interval);

        let observed = probe.observe().await?;
        if probe.is_ready(&observed) {
            return Ok(PollOutcome::Found(observed));
        }
        if remaining.is_zero() || schedule.interval.is_zero() {
            return Ok(PollOutcome::TimedOut(observed));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::HarvestError;
    use tokio::time::Instant;

    /// Becomes ready on the `ready_at`-th observation (never if None).
    struct Counter {
        nudges: usize,
        observations: usize,
        ready_at: Option<usize>,
        fail_at: Option<usize>,
    }

    impl Counter {
        fn new(ready_at: Option<usize>) -> Self {
            Self {
                nudges: 0,
                observations: 0,
                ready_at,
                fail_at: None,
            }
        }
    }

    #[async_trait]
    impl Probe for Counter {
        type Output = usize;

        async fn nudge(&mut self) -> Result<()> {
            self.nudges += 1;
            Ok(())
        }

        async fn observe(&mut self) -> Result<usize> {
            self.observations += 1;
            if self.fail_at == Some(self.observations) {
                return Err(HarvestError::Session("page crashed".into()));
            }
            Ok(self.observations)
        }

        fn is_ready(&self, observed: &usize) -> bool {
            self.ready_at.is_some_and(|n| *observed >= n)
        }
    }

    fn schedule(interval_ms: u64, budget_ms: u64) -> PollSchedule {
        PollSchedule {
            interval: Duration::from_millis(interval_ms),
            budget: Duration::from_millis(budget_ms),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_first_observation() {
        let mut probe = Counter::new(Some(1));
        let start = Instant::now();

        let outcome = poll_until(&mut probe, schedule(1_000, 60_000)).await.unwrap();

        assert_eq!(outcome, PollOutcome::Found(1));
        assert_eq!(probe.nudges, 1);
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_after_budget() {
        let mut probe = Counter::new(None);
        let start = Instant::now();

        let outcome = poll_until(&mut probe, schedule(1_000, 60_000)).await.unwrap();

        assert_eq!(outcome, PollOutcome::TimedOut(60));
        assert_eq!(probe.observations, 60);
        assert_eq!(start.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_not_multiple_of_interval() {
        let mut probe = Counter::new(None);
        let start = Instant::now();

        let outcome = poll_until(&mut probe, schedule(7_000, 60_000)).await.unwrap();

        // 9 waits of 7s: the ninth crosses the 60s budget
        assert_eq!(outcome.into_inner(), 9);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(60));
        assert!(elapsed <= Duration::from_secs(67));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_midway() {
        let mut probe = Counter::new(Some(4));
        let outcome = poll_until(&mut probe, schedule(500, 60_000)).await.unwrap();
        assert!(outcome.is_found());
        assert_eq!(*outcome.as_inner(), 4);
        assert_eq!(probe.nudges, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget_still_observes_once() {
        let mut probe = Counter::new(None);
        let outcome = poll_until(&mut probe, schedule(1_000, 0)).await.unwrap();
        assert_eq!(outcome, PollOutcome::TimedOut(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_error_aborts() {
        let mut probe = Counter::new(None);
        probe.fail_at = Some(2);
        let result = poll_until(&mut probe, schedule(1_000, 60_000)).await;
        assert!(matches!(result, Err(HarvestError::Session(_))));
        assert_eq!(probe.observations, 2);
    }
}
