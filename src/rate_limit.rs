use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;
use tracing::trace;

use crate::error::AppError;

/// Process-wide request budget: one permit per `interval`, shared by every
/// thread holding the same `Pacer`.
pub struct Pacer {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    clock: DefaultClock,
    interval: Duration,
    requests: AtomicU64,
}

impl Pacer {
    pub fn new(interval: Duration) -> Result<Self, AppError> {
        let quota = Quota::with_period(interval).ok_or_else(|| {
            AppError::ConfigError("request interval must be greater than zero".to_string())
        })?;

        Ok(Pacer {
            limiter: RateLimiter::direct(quota),
            clock: DefaultClock::default(),
            interval,
            requests: AtomicU64::new(0),
        })
    }

    /// Blocks the calling thread until the shared budget allows one more request.
    pub fn wait(&self) {
        loop {
            match self.limiter.check() {
                Ok(()) => break,
                Err(not_until) => {
                    let wait = not_until.wait_time_from(self.clock.now());
                    trace!(?wait, "pacing outbound request");
                    thread::sleep(wait.max(Duration::from_millis(1)));
                }
            }
        }
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests_made(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn display_status(&self) {
        println!("\n📊 API Usage");
        println!("   Requests this run: {}", self.requests_made());
        println!("   Pacing: 1 request / {}ms\n", self.interval.as_millis());
    }
}
