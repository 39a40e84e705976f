// Politeness limiter and retry for page fetches.
//
// Every fetch goes through `RateLimiter::acquire`, which spaces requests by a
// minimum delay and caps how many may start inside a sliding window. The
// limiter is shared across concurrent fetches, so state sits behind a Mutex
// and no guard is ever held across an await.
//
// `with_retry` re-runs a fetch when the server answers 429 or 503, backing
// off exponentially with jitter.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, warn};

/// Maximum number of retries on a throttling response.
const MAX_RETRIES: u32 = 3;

/// First backoff delay; doubles on each retry.
const BASE_BACKOFF: Duration = Duration::from_millis(500);

/// Ceiling for a single backoff delay.
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// A non-success HTTP status, kept typed so retry logic can inspect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStatusError {
    pub status: u16,
    pub url: String,
}

impl fmt::Display for HttpStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} returned HTTP {}", self.url, self.status)
    }
}

impl std::error::Error for HttpStatusError {}

struct Window {
    started: VecDeque<Instant>,
    last: Option<Instant>,
}

/// Sliding-window limiter with a minimum gap between requests.
pub struct RateLimiter {
    window: Mutex<Window>,
    max_requests: usize,
    period: Duration,
    min_delay: Duration,
}

impl RateLimiter {
    /// Allow `max_requests` per `period`, at least `min_delay` apart.
    pub fn new(max_requests: usize, period: Duration, min_delay: Duration) -> Self {
        Self {
            window: Mutex::new(Window {
                started: VecDeque::new(),
                last: None,
            }),
            max_requests: max_requests.max(1),
            period,
            min_delay,
        }
    }

    /// Only enforce spacing between requests.
    pub fn with_min_delay(min_delay: Duration) -> Self {
        Self::new(usize::MAX, Duration::from_secs(1), min_delay)
    }

    fn lock(&self) -> MutexGuard<'_, Window> {
        self.window.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Wait until a request may start, then record it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let now = Instant::now();
                let mut window = self.lock();

                while let Some(&oldest) = window.started.front() {
                    if now.duration_since(oldest) >= self.period {
                        window.started.pop_front();
                    } else {
                        break;
                    }
                }

                let spacing = window
                    .last
                    .map(|last| self.min_delay.saturating_sub(now.duration_since(last)))
                    .unwrap_or(Duration::ZERO);

                let crowding = if window.started.len() >= self.max_requests {
                    window
                        .started
                        .front()
                        .map(|&oldest| (oldest + self.period).saturating_duration_since(now))
                        .unwrap_or(Duration::ZERO)
                } else {
                    Duration::ZERO
                };

                let wait = spacing.max(crowding);
                if wait.is_zero() {
                    window.started.push_back(now);
                    window.last = Some(now);
                }
                wait
            };

            if wait.is_zero() {
                return;
            }
            debug!(delay_ms = wait.as_millis() as u64, "Rate limit: waiting");
            tokio::time::sleep(wait).await;
        }
    }

    /// Requests recorded inside the current window.
    pub fn in_flight_window(&self) -> usize {
        self.lock().started.len()
    }
}

fn is_throttled(err: &anyhow::Error) -> bool {
    err.downcast_ref::<HttpStatusError>()
        .map(|e| e.status == 429 || e.status == 503)
        .unwrap_or(false)
}

fn backoff_for(attempt: u32) -> Duration {
    let backoff = BASE_BACKOFF
        .saturating_mul(1u32 << attempt.min(16))
        .min(MAX_BACKOFF);

    // 0.75x to 1.25x, seeded from the clock's sub-second nanos
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    let jitter = 0.75 + (nanos % 500) as f64 / 1000.0;
    Duration::from_secs_f64(backoff.as_secs_f64() * jitter)
}

/// Run `operation` under the limiter, retrying throttled responses.
///
/// Errors other than 429/503 are returned immediately.
pub async fn with_retry<F, Fut, T>(limiter: &RateLimiter, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        limiter.acquire().await;

        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if is_throttled(&err) && attempt < MAX_RETRIES => {
                attempt += 1;
                let delay = backoff_for(attempt);
                warn!(
                    attempt,
                    max_retries = MAX_RETRIES,
                    backoff_ms = delay.as_millis() as u64,
                    "Throttled, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_acquire_under_limit_is_immediate() {
        let limiter = RateLimiter::new(10, Duration::from_secs(60), Duration::ZERO);
        let start = Instant::now();
        for _ in 0..10 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
        assert_eq!(limiter.in_flight_window(), 10);
    }

    #[tokio::test]
    async fn test_min_delay_spaces_requests() {
        let limiter = RateLimiter::with_min_delay(Duration::from_millis(40));
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_retry_on_429_then_success() {
        let limiter = RateLimiter::with_min_delay(Duration::ZERO);
        let calls = Arc::new(AtomicU32::new(0));

        let result = with_retry(&limiter, || {
            let calls = Arc::clone(&calls);
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(anyhow::Error::new(HttpStatusError {
                        status: 429,
                        url: "http://x".into(),
                    }))
                } else {
                    Ok("page")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "page");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_retry_on_404() {
        let limiter = RateLimiter::with_min_delay(Duration::ZERO);
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<()> = with_retry(&limiter, || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(anyhow::Error::new(HttpStatusError {
                    status: 404,
                    url: "http://x".into(),
                }))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
