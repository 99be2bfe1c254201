use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::planes::control::operation::AdminOperations;

/// Periodically purges expired entries until cancelled.
#[derive(Clone)]
pub struct CleanupScheduler {
    admin: Arc<dyn AdminOperations>,
    interval: Duration,
}

impl CleanupScheduler {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

    pub fn new(admin: Arc<dyn AdminOperations>, interval: Duration) -> Self {
        Self { admin, interval }
    }

    /// One cleanup pass. Failures are logged, never propagated.
    pub async fn run_once(&self) -> usize {
        match self.admin.clean_expired().await {
            Ok(response) => {
                if response.cleaned_count > 0 {
                    tracing::info!(
                        "Scheduled cleanup removed {} expired entries",
                        response.cleaned_count
                    );
                }
                response.cleaned_count
            }
            Err(e) => {
                tracing::error!("Scheduled cleanup failed: {}", e);
                0
            }
        }
    }

    /// First pass runs one interval after start.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!("Cache cleanup scheduled every {:?}", self.interval);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::info!("Cache cleanup scheduler stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        self.run_once().await;
                    }
                }
            }
        })
    }
}

impl std::fmt::Debug for CleanupScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupScheduler")
            .field("interval", &self.interval)
            .finish()
    }
}
