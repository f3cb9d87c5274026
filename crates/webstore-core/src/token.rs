use crate::config::Account;
use std::fmt;

/// Bearer token for upload and publish calls.
///
/// Every acquisition strategy produces the same type; nothing downstream can
/// tell a refreshed token from a freshly authorized one.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// An account that finished authorization for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedAccount {
    pub name: String,
    pub token: AccessToken,
    pub publish: Option<bool>,
}

impl AuthorizedAccount {
    pub fn new(account: &Account, token: AccessToken) -> Self {
        Self {
            name: account.name.clone(),
            token,
            publish: account.publish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_does_not_leak_token() {
        let token = AccessToken::new("ya29.secret");
        assert!(!format!("{:?}", token).contains("secret"));
        assert_eq!(token.bearer(), "Bearer ya29.secret");
    }
}
