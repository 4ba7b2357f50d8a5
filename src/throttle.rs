use std::{collections::VecDeque, time::Duration};

use tokio::{
    sync::Mutex,
    time::{sleep, Instant},
};

/// Rolling-window rate limiter: at most `calls` acquisitions per `period`.
///
/// Each [`Client`](crate::Client) owns one. The quota only holds for a single
/// sequential caller; driving one client from several tasks at once is not supported.
#[derive(Debug)]
pub(crate) struct Throttle {
    calls: usize,
    period: Duration,
    history: Mutex<VecDeque<Instant>>,
}

impl Throttle {
    pub(crate) fn new(calls: u32, period: Duration) -> Self {
        let calls = usize::try_from(calls.max(1)).unwrap_or(usize::MAX);
        Self {
            calls,
            period,
            history: Mutex::new(VecDeque::with_capacity(calls.min(64))),
        }
    }

    /// Waits until one more call fits into the window, then records it.
    pub(crate) async fn acquire(&self) {
        let mut history = self.history.lock().await;
        loop {
            let now = Instant::now();
            while history
                .front()
                .map_or(false, |&at| now.duration_since(at) >= self.period)
            {
                history.pop_front();
            }

            let oldest = match history.front() {
                Some(&oldest) if history.len() >= self.calls => oldest,
                _ => {
                    history.push_back(now);
                    return;
                }
            };

            let wait = self.period.saturating_sub(now.duration_since(oldest));
            log::debug!("rate limit reached, sleeping for {wait:?}");
            sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // timer granularity is one millisecond
    fn assert_between(elapsed: Duration, expected: Duration) {
        assert!(elapsed >= expected, "{elapsed:?} < {expected:?}");
        assert!(elapsed < expected + Duration::from_millis(20), "{elapsed:?} >> {expected:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn first_calls_within_quota_do_not_wait() {
        let throttle = Throttle::new(3, Duration::from_secs(1));
        let start = Instant::now();
        for _ in 0..3 {
            throttle.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn call_over_quota_waits_for_the_window() {
        let throttle = Throttle::new(2, Duration::from_secs(1));
        let start = Instant::now();
        throttle.acquire().await;
        throttle.acquire().await;
        throttle.acquire().await;
        assert_between(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn window_rolls_instead_of_resetting() {
        let throttle = Throttle::new(2, Duration::from_secs(1));
        let start = Instant::now();
        throttle.acquire().await;
        sleep(Duration::from_millis(600)).await;
        throttle.acquire().await;

        // the first slot frees at t=1s, the second at t=1.6s
        throttle.acquire().await;
        assert_between(start.elapsed(), Duration::from_secs(1));
        throttle.acquire().await;
        assert_between(start.elapsed(), Duration::from_millis(1600));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_quota_is_clamped_to_one() {
        let throttle = Throttle::new(0, Duration::from_millis(750));
        let start = Instant::now();
        throttle.acquire().await;
        throttle.acquire().await;
        assert_between(start.elapsed(), Duration::from_millis(750));
    }
}
