use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Minimum spacing between consecutive requests from one locator.
///
/// Callers queue on the mutex, so concurrent lookups through the same
/// locator are released one window apart.
#[derive(Debug)]
pub struct RequestThrottle {
    min_gap: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    #[must_use]
    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_request: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn min_gap(&self) -> Duration {
        self.min_gap
    }

    /// Waits until at least `min_gap` has passed since the previous slot was handed out.
    pub async fn wait_for_slot(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_gap {
                let wait = self.min_gap.saturating_sub(elapsed);
                tracing::trace!(wait_ms = wait.as_millis(), "throttling provider request");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_request_is_not_delayed() {
        let throttle = RequestThrottle::new(Duration::from_millis(300));
        let start = Instant::now();
        throttle.wait_for_slot().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn back_to_back_requests_are_spaced_by_window() {
        let throttle = RequestThrottle::new(Duration::from_millis(300));
        let start = Instant::now();
        throttle.wait_for_slot().await;
        throttle.wait_for_slot().await;
        throttle.wait_for_slot().await;
        assert!(start.elapsed() >= Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn only_remaining_window_is_waited() {
        let throttle = RequestThrottle::new(Duration::from_millis(300));
        throttle.wait_for_slot().await;
        tokio::time::sleep(Duration::from_millis(200)).await;

        let before = Instant::now();
        throttle.wait_for_slot().await;
        let waited = before.elapsed();
        assert!(waited >= Duration::from_millis(100));
        assert!(waited < Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn throttles_are_independent_per_instance() {
        let a = Arc::new(RequestThrottle::new(Duration::from_millis(300)));
        let b = Arc::new(RequestThrottle::new(Duration::from_millis(300)));
        a.wait_for_slot().await;
        let start = Instant::now();
        b.wait_for_slot().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
