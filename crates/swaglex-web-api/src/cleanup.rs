use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time::interval};
use tracing::{debug, info, warn};

use crate::rate_limiter::RateLimiter;

/// Background task that periodically forgets idle rate-limit clients.
pub struct CleanupService {
    rate_limiter: Arc<RateLimiter>,
    cleanup_interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl CleanupService {
    pub fn new(rate_limiter: Arc<RateLimiter>, cleanup_interval_seconds: u64) -> Self {
        Self {
            rate_limiter,
            cleanup_interval: Duration::from_secs(cleanup_interval_seconds.max(1)),
            handle: None,
        }
    }

    pub fn start(&mut self) {
        if self.handle.is_some() {
            warn!("Cleanup service is already running");
            return;
        }

        let rate_limiter = Arc::clone(&self.rate_limiter);
        let interval_duration = self.cleanup_interval;

        let handle = tokio::spawn(async move {
            info!(
                "Starting cleanup service with interval: {:?}",
                interval_duration
            );

            let mut cleanup_interval = interval(interval_duration);

            loop {
                cleanup_interval.tick().await;

                let removed = rate_limiter.sweep_expired();
                if removed > 0 {
                    info!("Removed {} idle rate limit clients", removed);
                } else {
                    debug!(
                        "No idle rate limit clients to remove ({} tracked)",
                        rate_limiter.tracked_clients()
                    );
                }
            }
        });

        self.handle = Some(handle);
        info!("Cleanup service started successfully");
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Cleanup service stopped");
        } else {
            debug!("Cleanup service is not running");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for CleanupService {
    fn drop(&mut self) {
        self.stop();
    }
}
