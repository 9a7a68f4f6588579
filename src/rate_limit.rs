use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

// Rate limit window - one for the whole process, not per IP/key
#[derive(Debug)]
pub struct RateWindow {
    pub count: u32,
    pub window_start: Instant,
}

/// Global fixed-window counter.
///
/// Every call counts, including the one that gets rejected, and nothing is
/// rolled back. Bursts of up to twice the limit are possible across a window
/// boundary.
#[derive(Debug)]
pub struct RateLimiter {
    window: Mutex<RateWindow>,
    max_requests: u32,
    period: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, period: Duration) -> Self {
        Self::new_at(max_requests, period, Instant::now())
    }

    /// Limiter whose first window opens at `start`.
    pub fn new_at(max_requests: u32, period: Duration, start: Instant) -> Self {
        Self {
            window: Mutex::new(RateWindow {
                count: 0,
                window_start: start,
            }),
            max_requests,
            period,
        }
    }

    pub fn admit(&self) -> bool {
        self.admit_at(Instant::now())
    }

    pub fn admit_at(&self, now: Instant) -> bool {
        // a panic elsewhere cannot leave the counter half-updated
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);

        // window expired..? Reset it
        if now.saturating_duration_since(window.window_start) > self.period {
            window.count = 0;
            window.window_start = now;
        }

        window.count = window.count.saturating_add(1);
        window.count <= self.max_requests
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn admits_up_to_max_within_window() {
        let now = Instant::now();
        let limiter = RateLimiter::new_at(8, Duration::from_secs(60), now);

        for n in 1..=8 {
            assert!(limiter.admit_at(now), "request {} should be admitted", n);
        }
        assert!(!limiter.admit_at(now));
        assert!(!limiter.admit_at(now + Duration::from_secs(59)));
    }

    #[test]
    fn rejected_calls_still_count() {
        let now = Instant::now();
        let limiter = RateLimiter::new_at(1, Duration::from_secs(60), now);

        assert!(limiter.admit_at(now));
        assert!(!limiter.admit_at(now));
        assert!(!limiter.admit_at(now));
        assert_eq!(limiter.window.lock().unwrap().count, 3);
    }

    #[test]
    fn resets_after_window_expires() {
        let start = Instant::now();
        let limiter = RateLimiter::new_at(2, Duration::from_secs(60), start);

        assert!(limiter.admit_at(start));
        assert!(limiter.admit_at(start));
        assert!(!limiter.admit_at(start));

        // exactly one period is still the same window
        assert!(!limiter.admit_at(start + Duration::from_secs(60)));

        let later = start + Duration::from_secs(60) + Duration::from_nanos(1);
        assert!(limiter.admit_at(later));
        assert!(limiter.admit_at(later));
        assert!(!limiter.admit_at(later));
        assert_eq!(limiter.window.lock().unwrap().window_start, later);
    }

    #[test]
    fn window_start_does_not_move_backwards() {
        let start = Instant::now();
        let limiter = RateLimiter::new_at(1, Duration::from_secs(60), start);
        let later = start + Duration::from_secs(120);

        assert!(limiter.admit_at(later));
        // an earlier timestamp from a slow caller must not reopen the window
        assert!(!limiter.admit_at(later - Duration::from_secs(90)));
        assert_eq!(limiter.window.lock().unwrap().window_start, later);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_counter() {
        let limiter = Arc::new(RateLimiter::new(8, Duration::from_secs(60)));
        let admitted = Arc::new(AtomicU32::new(0));

        let mut tasks = Vec::new();
        for _ in 0..50 {
            let limiter = Arc::clone(&limiter);
            let admitted = Arc::clone(&admitted);
            tasks.push(tokio::spawn(async move {
                if limiter.admit() {
                    admitted.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), 8);
    }
}
