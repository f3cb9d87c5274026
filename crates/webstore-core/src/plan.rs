//! Turns configuration into an ordered upload plan.
//!
//! A plan lists one token step per distinct account, followed by the upload
//! jobs. Executing the token steps before any job is what guarantees every
//! job sees a ready access token.

use crate::config::{Account, AccountConfig, Config, Endpoints, UploadJob};
use crate::credentials::CredentialStore;
use crate::{Error, Result};
use std::fmt;

/// How an account obtains its access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStrategy {
    /// Exchange the configured refresh token, no user interaction
    Refresh,
    /// Loopback listener plus browser redirect
    Browser,
    /// Print the consent URL and read the code from stdin
    CopyPaste,
}

impl TokenStrategy {
    /// A configured refresh token always wins over the interactive flows
    pub fn for_account(account: &Account) -> Self {
        if account.refresh_token.is_some() {
            TokenStrategy::Refresh
        } else if account.cli_auth {
            TokenStrategy::CopyPaste
        } else {
            TokenStrategy::Browser
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStrategy::Refresh => "refresh",
            TokenStrategy::Browser => "browser",
            TokenStrategy::CopyPaste => "copy-paste",
        }
    }

    pub fn is_interactive(&self) -> bool {
        !matches!(self, TokenStrategy::Refresh)
    }
}

impl fmt::Display for TokenStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token acquisition for one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStep {
    pub account: Account,
    pub strategy: TokenStrategy,
}

/// Ordered work for a single run
#[derive(Debug, Clone)]
pub struct Plan {
    pub token_steps: Vec<TokenStep>,
    pub jobs: Vec<UploadJob>,
    pub endpoints: Endpoints,
}

impl Plan {
    /// Validate configuration and build the plan.
    ///
    /// `only` restricts the run to a single extension. Accounts are resolved
    /// only if a selected extension uses them, so an unused account with
    /// missing credentials does not block the run.
    pub fn build(config: &Config, credentials: &CredentialStore, only: Option<&str>) -> Result<Self> {
        if config.accounts.is_empty() {
            return Err(Error::Config("no accounts configured".to_string()));
        }
        if config.extensions.is_empty() {
            return Err(Error::Config("no extensions configured".to_string()));
        }

        let selected: Vec<_> = match only {
            Some(name) => {
                let ext = config
                    .extensions
                    .get(name)
                    .ok_or_else(|| Error::Config(format!("unknown extension '{}'", name)))?;
                vec![(name, ext)]
            }
            None => config
                .extensions
                .iter()
                .map(|(name, ext)| (name.as_str(), ext))
                .collect(),
        };

        let mut jobs = Vec::with_capacity(selected.len());
        let mut token_steps: Vec<TokenStep> = Vec::new();

        for (name, ext) in selected {
            if ext.app_id.trim().is_empty() {
                return Err(Error::Config(format!("extension '{}' is missing appID", name)));
            }
            if ext.zip.as_os_str().is_empty() {
                return Err(Error::Config(format!("extension '{}' is missing zip", name)));
            }

            let account_name = ext.account_name();
            let account_config = config.accounts.get(account_name).ok_or_else(|| {
                Error::Config(format!(
                    "extension '{}' uses unknown account '{}'",
                    name, account_name
                ))
            })?;

            if !token_steps.iter().any(|s| s.account.name == account_name) {
                let account = resolve_account(account_name, account_config, credentials)?;
                let strategy = TokenStrategy::for_account(&account);
                tracing::debug!("Account '{}' will use {} auth", account.name, strategy);
                token_steps.push(TokenStep { account, strategy });
            }

            jobs.push(UploadJob {
                name: name.to_string(),
                app_id: ext.app_id.trim().to_string(),
                package: ext.zip.clone(),
                account: account_name.to_string(),
                publish: ext.publish,
                publish_target: ext.publish_target.clone().filter(|t| !t.is_empty()),
            });
        }

        Ok(Self {
            token_steps,
            jobs,
            endpoints: config.endpoints.clone(),
        })
    }

    /// Jobs that depend on the given account
    pub fn jobs_for<'a>(&'a self, account: &'a str) -> impl Iterator<Item = &'a UploadJob> + 'a {
        self.jobs.iter().filter(move |job| job.account == account)
    }
}

/// Fill missing client credentials from the credentials store
fn resolve_account(
    name: &str,
    config: &AccountConfig,
    credentials: &CredentialStore,
) -> Result<Account> {
    let mut client_id = non_empty(config.client_id.as_deref());
    let mut client_secret = non_empty(config.client_secret.as_deref());

    if client_id.is_none() || client_secret.is_none() {
        if let Some(stored) = credentials.lookup(name) {
            client_id = client_id.or_else(|| non_empty(stored.client_id.as_deref()));
            client_secret = client_secret.or_else(|| non_empty(stored.client_secret.as_deref()));
        }
    }

    let client_id = client_id
        .ok_or_else(|| Error::Config(format!("account '{}' has no client_id", name)))?;
    let client_secret = client_secret
        .ok_or_else(|| Error::Config(format!("account '{}' has no client_secret", name)))?;

    Ok(Account {
        name: name.to_string(),
        client_id,
        client_secret,
        refresh_token: non_empty(config.refresh_token.as_deref()),
        cli_auth: config.cli_auth,
        publish: config.publish,
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
