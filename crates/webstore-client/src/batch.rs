//! Settle-all execution of upload jobs.
//!
//! Every job runs to completion regardless of its siblings; the batch verdict
//! is folded from the individual reports only after all of them are in.

use crate::client::WebstoreClient;
use crate::response::PublishOutcome;
use crate::UploadError;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::path::PathBuf;
use webstore_core::{AuthorizedAccount, UploadJob};

/// Outcome of token acquisition for an account; the error is already rendered
pub type AccountAuth = std::result::Result<AuthorizedAccount, String>;

/// What a successful job did
#[derive(Debug)]
pub struct JobSuccess {
    pub package: PathBuf,
    pub publish: PublishOutcome,
}

/// Result of a single upload job
#[derive(Debug)]
pub struct JobReport {
    pub name: String,
    pub app_id: String,
    pub result: std::result::Result<JobSuccess, UploadError>,
}

impl JobReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Combined outcome of every job in a run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub jobs: Vec<JobReport>,
}

impl BatchReport {
    /// True only if every job uploaded; publish warnings do not count
    pub fn is_success(&self) -> bool {
        self.jobs.iter().all(JobReport::is_success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobReport> {
        self.jobs.iter().filter(|j| !j.is_success())
    }

    pub fn succeeded(&self) -> usize {
        self.jobs.iter().filter(|j| j.is_success()).count()
    }
}

/// Run every job concurrently and wait for all of them to settle.
///
/// Jobs whose account failed authorization are reported as failed without
/// any request being made.
pub async fn run_batch(
    client: &WebstoreClient,
    jobs: &[UploadJob],
    accounts: &BTreeMap<String, AccountAuth>,
) -> BatchReport {
    let runs = jobs.iter().map(|job| async move {
        let result = match accounts.get(&job.account) {
            Some(Ok(account)) => run_job(client, job, account).await,
            Some(Err(reason)) => Err(UploadError::Unauthorized {
                account: job.account.clone(),
                reason: reason.clone(),
            }),
            None => Err(UploadError::Unauthorized {
                account: job.account.clone(),
                reason: "no token acquired".to_string(),
            }),
        };

        if let Err(e) = &result {
            tracing::error!("Upload failed ({}): {}", job.name, e);
        }

        JobReport {
            name: job.name.clone(),
            app_id: job.app_id.clone(),
            result,
        }
    });

    BatchReport {
        jobs: join_all(runs).await,
    }
}

async fn run_job(
    client: &WebstoreClient,
    job: &UploadJob,
    account: &AuthorizedAccount,
) -> std::result::Result<JobSuccess, UploadError> {
    let package = client.upload(job, &account.token).await?;

    let publish = if job.should_publish(account.publish) {
        client.publish(job, &account.token).await
    } else {
        PublishOutcome::Skipped
    };

    Ok(JobSuccess { package, publish })
}
