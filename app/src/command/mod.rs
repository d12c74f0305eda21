//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`.

use chatctl_config::Config;
use chatctl_core::{BroadcastPublisher, ConversationControl, StatusEmitter, StopFlagRegistry};
use std::sync::Arc;

mod info;
mod init;
mod serve;
mod simulate;
mod version;

pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use serve::{ServeInput, ServeStrategy};
pub use simulate::{SimulateInput, SimulateStrategy};
pub use version::VersionStrategy;

/// Build the process-wide control plane: one registry, one status channel.
fn build_control(config: &Config) -> (ConversationControl, BroadcastPublisher) {
    let publisher = BroadcastPublisher::new(config.status.channel_capacity);
    let control = ConversationControl::new(
        Arc::new(StopFlagRegistry::new()),
        StatusEmitter::new(Arc::new(publisher.clone())),
    );
    (control, publisher)
}

/// Contract shared by all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}
