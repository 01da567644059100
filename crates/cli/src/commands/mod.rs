//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_relay;
pub use validate::run_validate;

use contracts::RelayBlueprint;
use tracing::info;

use crate::cli::ConfigSource;
use crate::error::{CliError, Result};

impl ConfigSource {
    /// Human-readable origin of the configuration
    pub fn describe(&self) -> String {
        match &self.config {
            Some(path) => path.display().to_string(),
            None => "environment".to_string(),
        }
    }

    /// Load and validate the blueprint
    pub fn load(&self) -> Result<RelayBlueprint> {
        match &self.config {
            Some(path) => {
                info!(config = %path.display(), "Loading configuration file");
                if !path.exists() {
                    return Err(CliError::config_not_found(path.display().to_string()));
                }
                Ok(config_loader::ConfigLoader::load_from_path(path)?)
            }
            None => {
                info!("Loading configuration from environment");
                Ok(config_loader::ConfigLoader::load_from_env()?)
            }
        }
    }
}
