use super::Config;
use crate::Result;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "webstore.json";

pub struct ConfigReader;

impl ConfigReader {
    /// Read and parse a configuration file from the given path
    pub fn from_file(path: &Path) -> Result<Config> {
        tracing::debug!("Reading configuration from: {}", path.display());

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)?;

        tracing::debug!(
            "Loaded {} account(s) and {} extension(s)",
            config.accounts.len(),
            config.extensions.len()
        );

        Ok(config)
    }

    /// Parse a configuration from a JSON string
    pub fn from_str(content: &str) -> Result<Config> {
        Ok(serde_json::from_str(content)?)
    }
}
