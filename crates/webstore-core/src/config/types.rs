use super::Endpoints;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Account used when an extension does not name one
pub const DEFAULT_ACCOUNT: &str = "default";

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub accounts: BTreeMap<String, AccountConfig>,
    #[serde(default)]
    pub extensions: BTreeMap<String, ExtensionConfig>,
    #[serde(default)]
    pub endpoints: Endpoints,
}

/// Per-account settings as written in the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Use the copy-paste flow instead of the loopback listener
    #[serde(default)]
    pub cli_auth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Default publish behavior for every extension on this account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish: Option<bool>,
}

/// Per-extension settings as written in the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    #[serde(rename = "appID", default)]
    pub app_id: String,
    /// Package file, or a directory holding `*.zip` packages
    #[serde(default)]
    pub zip: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish: Option<bool>,
    #[serde(rename = "publishTarget", default, skip_serializing_if = "Option::is_none")]
    pub publish_target: Option<String>,
}

impl ExtensionConfig {
    pub fn account_name(&self) -> &str {
        self.account.as_deref().unwrap_or(DEFAULT_ACCOUNT)
    }
}

/// An account whose client credentials have been resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: Option<String>,
    pub cli_auth: bool,
    pub publish: Option<bool>,
}

/// A validated extension upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    pub name: String,
    pub app_id: String,
    pub package: PathBuf,
    pub account: String,
    pub publish: Option<bool>,
    pub publish_target: Option<String>,
}

impl UploadJob {
    /// Job-level `publish` wins over the account default; neither set means no publish
    pub fn should_publish(&self, account_default: Option<bool>) -> bool {
        self.publish.or(account_default).unwrap_or(false)
    }
}
