use async_trait::async_trait;

/// Hands out a scoped resource (typically a data-store session) for exactly
/// one job invocation.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    type Session: Send + Sync;

    async fn acquire(&self) -> anyhow::Result<Self::Session>;

    /// Give the session back once the job returned.
    ///
    /// `succeeded` tells transactional providers whether to commit or roll
    /// back. The default simply drops the session.
    async fn release(&self, session: Self::Session, succeeded: bool) -> anyhow::Result<()> {
        let _ = succeeded;
        drop(session);
        Ok(())
    }
}

/// Work re-run by the scheduler on every tick.
#[async_trait]
pub trait MaintenanceJob<S>: Send + Sync
where
    S: Send + Sync,
{
    /// Name used in logs.
    fn name(&self) -> &str;

    async fn run(&self, session: &S) -> anyhow::Result<()>;
}
