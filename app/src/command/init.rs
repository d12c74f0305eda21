use chatctl_config::Config;

/// Strategy for initializing the configuration.
///
/// Writes the default configuration file to `~/chatctl/config.json`.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let path = Config::create_config()?;
        println!("Config file created at: {}", path.display());
        println!("Edit it to point `database.url` at your session store, then run `chatctl serve`.");
        Ok(())
    }
}
