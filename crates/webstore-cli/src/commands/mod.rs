pub mod completion;
pub mod plan;
pub mod upload;

use anyhow::{Context, Result};
use std::path::Path;
use webstore_core::config::ConfigReader;
use webstore_core::{CredentialStore, Plan};

/// Load configuration and credentials, then validate them into a plan.
///
/// Any configuration problem surfaces here, before a single request is made.
pub fn load_plan(config: &Path, credentials: Option<&Path>, extension: Option<&str>) -> Result<Plan> {
    let cfg = ConfigReader::from_file(config)
        .with_context(|| format!("Failed to load configuration from {}", config.display()))?;

    let store = match credentials {
        Some(path) => CredentialStore::at(path),
        None => CredentialStore::discover(),
    };
    if let Some(path) = store.path() {
        tracing::debug!("Using credentials file {}", path.display());
    }

    Ok(Plan::build(&cfg, &store, extension)?)
}
