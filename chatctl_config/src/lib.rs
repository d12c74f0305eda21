//! JSON configuration for the `chatctl` service.

mod schema;

pub use schema::{
    Config, DatabaseConfig, LoggingConfig, RetentionConfig, SchedulerSettings, StatusConfig,
};
