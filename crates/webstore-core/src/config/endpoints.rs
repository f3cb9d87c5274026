use serde::{Deserialize, Serialize};

/// Remote endpoints used for authorization, upload and publish.
///
/// Every field defaults to the production Google URL, so a configuration file
/// only needs an `endpoints` section when pointing at a different server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Browser-facing OAuth consent page
    pub auth_url: String,
    /// OAuth token exchange endpoint
    pub token_url: String,
    /// Base URL for item uploads; the app id is appended
    pub upload_url: String,
    /// Base URL for item publishing; `/{app id}/publish` is appended
    pub publish_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth_url: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token_url: "https://accounts.google.com/o/oauth2/token".to_string(),
            upload_url: "https://www.googleapis.com/upload/chromewebstore/v1.1/items".to_string(),
            publish_url: "https://www.googleapis.com/chromewebstore/v1.1/items".to_string(),
        }
    }
}

impl Endpoints {
    /// Build endpoints where every URL hangs off a single base (used for stub servers)
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            auth_url: format!("{}/o/oauth2/auth", base),
            token_url: format!("{}/o/oauth2/token", base),
            upload_url: format!("{}/upload/chromewebstore/v1.1/items", base),
            publish_url: format!("{}/chromewebstore/v1.1/items", base),
        }
    }

    pub fn item_upload_url(&self, app_id: &str) -> String {
        format!("{}/{}", self.upload_url.trim_end_matches('/'), app_id)
    }

    pub fn item_publish_url(&self, app_id: &str) -> String {
        format!("{}/{}/publish", self.publish_url.trim_end_matches('/'), app_id)
    }
}
