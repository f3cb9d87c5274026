use crate::{Result, UploadError};
use serde_json::Value;

/// Upload state reported for an accepted package
const UPLOAD_SUCCESS: &str = "SUCCESS";

/// Result of the publish step; never fails the job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Publishing was not requested for this job
    Skipped,
    Published,
    /// The store refused or the request failed; the message is for display only
    Warning(String),
}

impl PublishOutcome {
    pub fn is_warning(&self) -> bool {
        matches!(self, PublishOutcome::Warning(_))
    }
}

/// Interpret an upload response body
pub fn parse_upload_response(body: &str) -> Result<()> {
    let value: Value =
        serde_json::from_str(body).map_err(|_| UploadError::InvalidResponse(body.to_string()))?;

    if value.get("uploadState").and_then(Value::as_str) == Some(UPLOAD_SUCCESS) {
        return Ok(());
    }

    Err(UploadError::Rejected(
        provider_message(&value).unwrap_or_else(|| body.to_string()),
    ))
}

/// Interpret a publish response body
pub fn parse_publish_response(body: &str) -> PublishOutcome {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return PublishOutcome::Warning(body.to_string());
    };

    match value.get("error") {
        Some(error) if !error.is_null() => PublishOutcome::Warning(
            provider_message(&value).unwrap_or_else(|| body.to_string()),
        ),
        _ => PublishOutcome::Published,
    }
}

/// Pull a human readable message out of a Google API error body
fn provider_message(value: &Value) -> Option<String> {
    if let Some(message) = value.pointer("/error/message").and_then(Value::as_str) {
        return Some(message.to_string());
    }

    // Upload failures may only carry item-level errors
    let details: Vec<&str> = value
        .get("itemError")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(|e| e.get("error_detail").and_then(Value::as_str))
        .collect();

    if details.is_empty() {
        None
    } else {
        Some(details.join("; "))
    }
}
