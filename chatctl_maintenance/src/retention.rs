use async_trait::async_trait;
use chatctl_entities::sessions;
use chatctl_scheduler::MaintenanceJob;
use chrono::{Duration, NaiveDateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter};
use tracing::info;

/// Deletes conversation sessions that have been idle longer than `max_idle`.
#[derive(Debug, Clone)]
pub struct SessionRetentionJob {
    max_idle: Duration,
}

impl SessionRetentionJob {
    #[must_use]
    pub const fn new(max_idle: Duration) -> Self {
        Self { max_idle }
    }

    #[must_use]
    pub fn with_max_idle_days(days: u32) -> Self {
        Self::new(Duration::days(i64::from(days)))
    }

    /// Sessions last updated strictly before this instant are pruned.
    #[must_use]
    pub fn cutoff(&self, now: NaiveDateTime) -> NaiveDateTime {
        now - self.max_idle
    }
}

#[async_trait]
impl MaintenanceJob<DatabaseTransaction> for SessionRetentionJob {
    fn name(&self) -> &str {
        "session_retention"
    }

    async fn run(&self, session: &DatabaseTransaction) -> anyhow::Result<()> {
        let cutoff = self.cutoff(Utc::now().naive_utc());
        info!("Pruning sessions idle since before {cutoff}");

        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::UpdatedAt.lt(cutoff))
            .exec(session)
            .await?;

        info!("Pruned {} idle sessions", result.rows_affected);
        Ok(())
    }
}
