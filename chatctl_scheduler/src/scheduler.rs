use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::{JobError, MaintenanceJob, SessionProvider};

/// Timing of the maintenance loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Sleep between two runs.
    pub interval: Duration,
    /// Run once right after start instead of waiting a full interval first.
    pub run_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
            run_on_startup: false,
        }
    }
}

/// Counters shared between the loop and its handle.
#[derive(Debug, Default)]
struct Counters {
    attempts: AtomicU64,
    failures: AtomicU64,
}

/// Snapshot of what the loop has done so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerStats {
    /// Runs started, successful or not.
    pub attempts: u64,
    /// Runs that ended in a [`JobError`].
    pub failures: u64,
}

/// Handle to the running loop, kept by whoever owns the process lifecycle.
#[derive(Debug)]
pub struct SchedulerHandle {
    task: JoinHandle<()>,
    counters: Arc<Counters>,
}

impl SchedulerHandle {
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            attempts: self.counters.attempts.load(Ordering::SeqCst),
            failures: self.counters.failures.load(Ordering::SeqCst),
        }
    }

    /// `true` only after [`abort`](Self::abort); the loop itself never returns.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop at its next suspension point.
    pub fn abort(&self) {
        self.task.abort();
    }
}

/// Re-runs a [`MaintenanceJob`] every [`SchedulerConfig::interval`].
///
/// [`start`](Self::start) consumes the scheduler, so a given instance can be
/// started once. Keep a single instance per process.
pub struct PeriodicScheduler<P, J> {
    provider: P,
    job: J,
    config: SchedulerConfig,
}

impl<P, J> PeriodicScheduler<P, J>
where
    P: SessionProvider + 'static,
    J: MaintenanceJob<P::Session> + 'static,
{
    pub const fn new(provider: P, job: J, config: SchedulerConfig) -> Self {
        Self {
            provider,
            job,
            config,
        }
    }

    /// Spawn the loop on the current tokio runtime.
    #[must_use]
    pub fn start(self) -> SchedulerHandle {
        let counters = Arc::new(Counters::default());
        let task = tokio::spawn(self.run_forever(Arc::clone(&counters)));
        SchedulerHandle { task, counters }
    }

    /// One acquire/run/release cycle. The session never outlives this call.
    pub async fn run_once(&self) -> Result<(), JobError> {
        let session = self.provider.acquire().await.map_err(JobError::Acquire)?;

        let outcome = self.job.run(&session).await;
        let released = self.provider.release(session, outcome.is_ok()).await;

        match (outcome, released) {
            (Ok(()), Ok(())) => Ok(()),
            (Ok(()), Err(e)) => Err(JobError::Release(e)),
            (Err(source), released) => {
                if let Err(e) = released {
                    warn!(job = self.job.name(), "Failed to release session after job error: {e:#}");
                }
                Err(JobError::Job {
                    job: self.job.name().to_string(),
                    source,
                })
            }
        }
    }

    async fn run_forever(self, counters: Arc<Counters>) {
        info!(
            job = self.job.name(),
            "Periodic scheduler started, interval {}s",
            self.config.interval.as_secs()
        );

        if self.config.run_on_startup {
            info!(job = self.job.name(), "Running job at startup");
            self.tick(&counters).await;
        }

        loop {
            sleep(self.config.interval).await;
            self.tick(&counters).await;
        }
    }

    async fn tick(&self, counters: &Counters) {
        let attempt = counters.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(job = self.job.name(), "Starting run {attempt}");

        match self.run_once().await {
            Ok(()) => info!(job = self.job.name(), "Run {attempt} completed"),
            Err(e) => {
                counters.failures.fetch_add(1, Ordering::SeqCst);
                error!(
                    job = self.job.name(),
                    error = ?e,
                    "Run {attempt} failed: {e}"
                );
            }
        }
    }
}
