//! Timed pacing and condition polling

use std::time::Duration;

use pagepilot_policy_center::ExecutorPolicy;
use tokio::time::{sleep, timeout};
use tracing::debug;

/// Delays used between steps of multi-step actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub batch_delay: Duration,
    pub type_delay: Duration,
    pub drag_step_delay: Duration,
    pub wait_poll: Duration,
    pub wait_timeout: Duration,
}

impl From<&ExecutorPolicy> for Pacing {
    fn from(policy: &ExecutorPolicy) -> Self {
        Self {
            batch_delay: Duration::from_millis(policy.batch_delay_ms),
            type_delay: Duration::from_millis(policy.type_delay_ms),
            drag_step_delay: Duration::from_millis(policy.drag_step_delay_ms),
            wait_poll: Duration::from_millis(policy.wait_poll_ms.max(1)),
            wait_timeout: Duration::from_millis(policy.wait_timeout_ms),
        }
    }
}

/// Sleep unless the delay is zero.
pub async fn pause(delay: Duration) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
}

/// Re-evaluate `check` every `interval` until it holds or `limit` elapses.
/// The check runs once immediately. Returns whether the condition was met.
pub async fn poll_until<F>(interval: Duration, limit: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool + Send,
{
    let polling = async {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            if check() {
                debug!(attempts, "wait condition met");
                return;
            }
            sleep(interval).await;
        }
    };
    timeout(limit, polling).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn polling_stops_when_condition_holds() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let met = poll_until(Duration::from_millis(100), Duration::from_secs(5), move || {
            counter.fetch_add(1, Ordering::SeqCst) >= 2
        })
        .await;
        assert!(met);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_times_out() {
        let start = tokio::time::Instant::now();
        let met = poll_until(Duration::from_millis(100), Duration::from_millis(550), || false).await;
        assert!(!met);
        assert!(start.elapsed() >= Duration::from_millis(550));
    }

    #[test]
    fn pacing_follows_policy() {
        let policy = pagepilot_policy_center::default_policy();
        let pacing = Pacing::from(&policy.executor);
        assert_eq!(pacing.batch_delay, Duration::from_millis(100));
        assert_eq!(pacing.wait_poll, Duration::from_millis(100));
        assert_eq!(pacing.wait_timeout, Duration::from_millis(5000));
    }
}
