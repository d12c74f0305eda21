use thiserror::Error;

/// Failure of a single scheduled run. Never escapes the scheduler loop.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("failed to acquire session: {0:#}")]
    Acquire(#[source] anyhow::Error),

    #[error("job {job} failed: {source:#}")]
    Job {
        job: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to release session: {0:#}")]
    Release(#[source] anyhow::Error),
}
