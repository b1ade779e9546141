use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Global token bucket with a burst of one permit, shared by every worker.
///
/// Each reservation moves the next free slot forward by `units / rate` seconds.
/// Reservations are never cancelled, the caller always sleeps out the delay.
#[derive(Debug)]
pub struct RateLimiter {
    requests_per_second: f64,
    next_free: Mutex<Instant>,
}

impl RateLimiter {
    /// Returns `None` for an unlimited rate (0).
    pub fn new(requests_per_second: u64) -> Option<Self> {
        if requests_per_second == 0 {
            return None;
        }
        Some(Self {
            requests_per_second: requests_per_second as f64,
            next_free: Mutex::new(Instant::now()),
        })
    }

    /// Reserves `units` permits and returns how long the caller has to wait before using them.
    pub async fn reserve(&self, units: u64) -> Duration {
        let now = Instant::now();
        let mut next_free = self.next_free.lock().await;
        let start = (*next_free).max(now);
        *next_free = start + Duration::from_secs_f64(units as f64 / self.requests_per_second);
        start - now
    }

    pub async fn wait(&self, units: u64) {
        let delay = self.reserve(units).await;
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

/// Reservation of a shared limiter for one backend dispatch, scaled by the items a record carries.
#[derive(Debug, Clone, Default)]
pub struct Throttle {
    limiter: Option<Arc<RateLimiter>>,
    units: u64,
}

impl Throttle {
    pub fn new(limiter: Option<Arc<RateLimiter>>, units: u64) -> Self {
        Self { limiter, units }
    }

    pub fn unlimited() -> Self {
        Self::default()
    }

    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.wait(self.units).await;
        }
    }
}
