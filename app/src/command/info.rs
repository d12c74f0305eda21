use chatctl_config::Config;
use chatctl_maintenance::DatabaseSessionProvider;
use tracing::info;

/// Strategy for displaying configuration information.
///
/// Prints every config section, with database credentials masked, and
/// reports whether the database is reachable.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load_or_default()?;

        println!("=== chatctl Configuration ===\n");

        println!("Config File:");
        let path = Config::config_path()?;
        if path.exists() {
            println!("  Path: {}", path.display());
        } else {
            println!("  Path: {} (not found, using defaults)", path.display());
        }
        println!();

        println!("Database:");
        let db_url = &config.database.url;
        println!("  URL: {}", mask_database_url(db_url));

        info!("Testing database connection");
        match DatabaseSessionProvider::connect(db_url).await {
            Ok(_) => {
                println!("  Status: Connected");
            }
            Err(e) => {
                println!("  Status: Connection failed");
                println!("  Error: {e}");
            }
        }
        println!();

        println!("Scheduler:");
        println!("  Interval: {}s", config.scheduler.interval().as_secs());
        println!("  Run On Startup: {}", config.scheduler.run_on_startup);
        println!();

        println!("Retention:");
        println!("  Max Idle Days: {}", config.retention.max_idle_days);
        println!();

        println!("Status Channel:");
        println!("  Capacity: {}", config.status.channel_capacity);
        println!();

        println!("Logging:");
        println!("  Level: {}", config.logging.level);

        Ok(())
    }
}

fn mask_database_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };

    let Some((credentials, after_at)) = rest.split_once('@') else {
        return url.to_string();
    };

    let Some((username, _password)) = credentials.split_once(':') else {
        return url.to_string();
    };

    format!("{scheme}://{username}:***@{after_at}")
}
