//! Per-connection rate limiting for WebSocket commands.
//!
//! Each connection carries two sliding windows: a short burst window and a
//! longer sustained window. A command is admitted only if both have room.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// One sliding window of recent admissions
#[derive(Debug)]
struct SlidingWindow {
    timestamps: VecDeque<Instant>,
    max_requests: usize,
    window: Duration,
}

impl SlidingWindow {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_requests),
            max_requests,
            window,
        }
    }

    fn evict(&mut self, now: Instant) {
        while let Some(ts) = self.timestamps.front() {
            if now.duration_since(*ts) > self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    fn is_full(&self) -> bool {
        self.timestamps.len() >= self.max_requests
    }

    /// Time until the oldest admission leaves the window
    fn retry_after(&self, now: Instant) -> Duration {
        self.timestamps
            .front()
            .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
            .unwrap_or_default()
    }
}

/// A command refused by the limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttled {
    pub retry_after: Duration,
}

/// Burst and sustained limits for one connection
#[derive(Debug)]
pub struct RateLimiter {
    burst: SlidingWindow,
    sustained: SlidingWindow,
}

impl RateLimiter {
    /// Create a rate limiter
    ///
    /// # Arguments
    ///
    /// * `burst` - Maximum commands and window for short spikes
    /// * `sustained` - Maximum commands and window over the longer term
    ///
    /// # Example
    ///
    /// ```
    /// use ph_server::api::rate_limiter::RateLimiter;
    /// use std::time::Duration;
    ///
    /// let limiter = RateLimiter::new((5, Duration::from_secs(1)), (50, Duration::from_secs(60)));
    /// ```
    pub fn new(burst: (usize, Duration), sustained: (usize, Duration)) -> Self {
        Self {
            burst: SlidingWindow::new(burst.0, burst.1),
            sustained: SlidingWindow::new(sustained.0, sustained.1),
        }
    }

    /// Limits applied to every WebSocket connection: 10 commands per second
    /// and 100 per minute
    pub fn per_connection() -> Self {
        Self::new((10, Duration::from_secs(1)), (100, Duration::from_secs(60)))
    }

    /// Admit or refuse one command
    ///
    /// A refused command doesn't count against either window.
    ///
    /// # Example
    ///
    /// ```
    /// # use ph_server::api::rate_limiter::RateLimiter;
    /// # use std::time::Duration;
    /// let mut limiter = RateLimiter::new((3, Duration::from_secs(1)), (100, Duration::from_secs(60)));
    ///
    /// for _ in 0..3 {
    ///     assert!(limiter.check().is_ok());
    /// }
    /// assert!(limiter.check().is_err());
    /// ```
    pub fn check(&mut self) -> Result<(), Throttled> {
        let now = Instant::now();
        self.burst.evict(now);
        self.sustained.evict(now);

        let retry_after = [&self.burst, &self.sustained]
            .into_iter()
            .filter(|window| window.is_full())
            .map(|window| window.retry_after(now))
            .max();
        if let Some(retry_after) = retry_after {
            return Err(Throttled { retry_after });
        }

        self.burst.timestamps.push_back(now);
        self.sustained.timestamps.push_back(now);
        Ok(())
    }

    /// Commands admitted in the current sustained window
    pub fn current_count(&self) -> usize {
        self.sustained.timestamps.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_connection()
    }
}
