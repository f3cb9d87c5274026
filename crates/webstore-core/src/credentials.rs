//! Private OAuth client credentials kept outside the main configuration.
//!
//! The store is a JSON object keyed by account name:
//!
//! ```json
//! { "default": { "client_id": "...", "client_secret": "..." } }
//! ```
//!
//! Every problem reading it is reported and treated as "no credentials";
//! the caller decides whether the account is still usable.

use crate::Result;
use serde::Deserialize;
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name searched for in the working directory, then the home directory
pub const CREDENTIALS_FILE: &str = ".webstoreUploadCredentials";

/// Client id and secret for a single account
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClientCredentials {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
}

/// Lazily loaded credentials file
#[derive(Debug)]
pub struct CredentialStore {
    path: Option<PathBuf>,
    records: OnceCell<BTreeMap<String, ClientCredentials>>,
}

impl CredentialStore {
    /// Use an explicit credentials file
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            records: OnceCell::new(),
        }
    }

    /// Use the first credentials file found in the default locations
    pub fn discover() -> Self {
        let path = Self::default_paths().into_iter().find(|p| p.is_file());
        Self {
            path,
            records: OnceCell::new(),
        }
    }

    /// A store with no backing file
    pub fn empty() -> Self {
        Self {
            path: None,
            records: OnceCell::new(),
        }
    }

    /// Candidate credential files, in lookup order
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CREDENTIALS_FILE)];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(CREDENTIALS_FILE));
        }
        paths
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Look up credentials for an account, reading the file on first use.
    ///
    /// Returns `None` when the file or the entry is missing. A partially
    /// filled entry is returned as-is after a warning.
    pub fn lookup(&self, account_name: &str) -> Option<&ClientCredentials> {
        let records = self.records.get_or_init(|| self.read());

        let Some(record) = records.get(account_name) else {
            if self.path.is_some() {
                tracing::warn!(
                    "No credentials found for account '{}' in credentials file",
                    account_name
                );
            }
            return None;
        };

        if record.client_id.as_deref().is_none_or(str::is_empty) {
            tracing::warn!("Credentials for account '{}' have no client_id", account_name);
        } else if record.client_secret.as_deref().is_none_or(str::is_empty) {
            tracing::warn!(
                "Credentials for account '{}' have no client_secret",
                account_name
            );
        }

        Some(record)
    }

    fn read(&self) -> BTreeMap<String, ClientCredentials> {
        let Some(path) = self.path.as_deref() else {
            tracing::debug!("No credentials file available");
            return BTreeMap::new();
        };

        match Self::load(path) {
            Ok(records) => {
                tracing::debug!(
                    "Loaded credentials for {} account(s) from {}",
                    records.len(),
                    path.display()
                );
                records
            }
            Err(e) => {
                tracing::warn!("Ignoring credentials file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        }
    }

    fn load(path: &Path) -> Result<BTreeMap<String, ClientCredentials>> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
