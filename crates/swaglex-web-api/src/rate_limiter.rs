use dashmap::DashMap;
use std::{
    collections::VecDeque,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("Rate limit exceeded: {limit} requests per window, retry after {retry_after_secs}s")]
    LimitExceeded { limit: usize, retry_after_secs: u64 },
}

/// Source of "now" for the limiter, in milliseconds.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now_millis(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        current_timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_millis: u64) -> Self {
        Self {
            now: AtomicU64::new(start_millis),
        }
    }

    pub fn set(&self, millis: u64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_ms: u64,
    /// Sweep idle clients after this many admitted requests. 0 disables it.
    pub sweep_every: u64,
    pub cleanup_interval_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_ms: 15 * 60 * 1000,
            sweep_every: 100,
            cleanup_interval_seconds: 60,
        }
    }
}

/// An admitted request and what is left of the client's budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub used: usize,
    pub remaining: usize,
}

/// Per-client sliding-window limiter.
///
/// Each client keeps the instants of its admitted requests inside the
/// trailing window. Rejected requests are not recorded.
pub struct RateLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    history: DashMap<String, VecDeque<u64>>,
    admitted: AtomicU64,
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("tracked_clients", &self.history.len())
            .finish()
    }
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        let config = RateLimitConfig {
            max_requests: config.max_requests.max(1),
            window_ms: config.window_ms.max(1),
            ..config
        };

        Self {
            config,
            clock,
            history: DashMap::new(),
            admitted: AtomicU64::new(0),
        }
    }

    /// Admits or rejects a request from `identifier` at the clock's current time.
    pub fn check(&self, identifier: &str) -> Result<Admission, RateLimitError> {
        self.admit(identifier, self.clock.now_millis())
    }

    pub fn admit(&self, identifier: &str, now: u64) -> Result<Admission, RateLimitError> {
        let window = self.config.window_ms;
        let limit = self.config.max_requests;

        // The entry guard holds a shard lock; it must be released before sweeping.
        let outcome = {
            let mut instants = self.history.entry(identifier.to_string()).or_default();
            prune(&mut instants, now, window);

            match instants.front() {
                Some(&earliest) if instants.len() >= limit => Err(RateLimitError::LimitExceeded {
                    limit,
                    retry_after_secs: (earliest + window).saturating_sub(now).div_ceil(1000),
                }),
                _ => {
                    instants.push_back(now);
                    Ok(Admission {
                        used: instants.len(),
                        remaining: limit - instants.len(),
                    })
                }
            }
        };

        if outcome.is_ok() && self.config.sweep_every > 0 {
            let admitted = self.admitted.fetch_add(1, Ordering::Relaxed) + 1;
            if admitted % self.config.sweep_every == 0 {
                let removed = self.sweep(now);
                debug!("Periodic sweep after {} admits removed {} clients", admitted, removed);
            }
        }

        outcome
    }

    /// Drops expired instants for every client and forgets clients with none
    /// left. Returns how many clients were removed.
    pub fn sweep(&self, now: u64) -> usize {
        let before = self.history.len();
        let window = self.config.window_ms;
        self.history.retain(|_, instants| {
            prune(instants, now, window);
            !instants.is_empty()
        });
        before.saturating_sub(self.history.len())
    }

    pub fn sweep_expired(&self) -> usize {
        self.sweep(self.clock.now_millis())
    }

    /// Requests from `identifier` still inside the window at `now`.
    pub fn usage(&self, identifier: &str, now: u64) -> usize {
        self.history.get(identifier).map_or(0, |instants| {
            instants
                .iter()
                .filter(|&&t| t + self.config.window_ms > now)
                .count()
        })
    }

    pub fn reset(&self, identifier: &str) {
        self.history.remove(identifier);
    }

    pub fn tracked_clients(&self) -> usize {
        self.history.len()
    }

    pub fn max_requests(&self) -> usize {
        self.config.max_requests
    }

    pub fn window_ms(&self) -> u64 {
        self.config.window_ms
    }

    pub fn window_seconds(&self) -> u64 {
        self.config.window_ms.div_ceil(1000)
    }
}

/// Removes instants at or before `now - window`. Instants are pushed in
/// arrival order, so expired ones are always at the front.
fn prune(instants: &mut VecDeque<u64>, now: u64, window: u64) {
    while instants.front().is_some_and(|&t| t + window <= now) {
        instants.pop_front();
    }
}

pub fn current_timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
