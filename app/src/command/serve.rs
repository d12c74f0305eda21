use crate::command::CommandStrategy;
use chatctl_config::Config;
use chatctl_maintenance::{DatabaseSessionProvider, SessionRetentionJob, ensure_schema};
use chatctl_scheduler::{PeriodicScheduler, SchedulerConfig};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Connect to the database, retrying until it answers.
///
/// Delays grow 1s, 2s, then stay at 3s.
async fn connect_with_retry(database_url: &str) -> anyhow::Result<DatabaseSessionProvider> {
    const MAX_DELAY: Duration = Duration::from_secs(3);
    const INITIAL_DELAY: Duration = Duration::from_secs(1);

    let mut attempt = 0u32;
    let mut delay = INITIAL_DELAY;

    loop {
        attempt += 1;
        match DatabaseSessionProvider::connect(database_url).await {
            Ok(provider) => {
                info!("Database connected on attempt {attempt}");
                return Ok(provider);
            }
            Err(e) => {
                warn!(
                    "Failed to connect to database (attempt {attempt}): {e}. Retrying in {}s...",
                    delay.as_secs()
                );
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

/// Input for the serve command.
#[derive(Debug, Clone, Copy)]
pub struct ServeInput {
    /// Run the maintenance job once at startup regardless of config
    pub run_now: bool,
}

/// Hosts the periodic maintenance loop for the lifetime of the process.
#[derive(Debug, Clone, Copy)]
pub struct ServeStrategy;

impl CommandStrategy for ServeStrategy {
    type Input = ServeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load_or_default()?;

        let provider = connect_with_retry(&config.database.url).await?;
        ensure_schema(provider.connection()).await?;

        let job = SessionRetentionJob::with_max_idle_days(config.retention.max_idle_days);
        let scheduler_config = SchedulerConfig {
            interval: config.scheduler.interval(),
            run_on_startup: config.scheduler.run_on_startup || input.run_now,
        };
        let handle = PeriodicScheduler::new(provider, job, scheduler_config).start();

        info!("chatctl is running. Press Ctrl+C to stop.");
        tokio::signal::ctrl_c().await?;

        handle.abort();
        let stats = handle.stats();
        info!(
            "Shutting down after {} maintenance runs ({} failed)",
            stats.attempts, stats.failures
        );
        Ok(())
    }
}
