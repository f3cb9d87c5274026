use anyhow::{Result, bail};
use console::style;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use webstore_auth::{DEFAULT_CALLBACK_PORT, TokenAcquirer};
use webstore_client::{AccountAuth, BatchReport, PublishOutcome, WebstoreClient, run_batch};
use webstore_core::{AuthorizedAccount, Plan};

/// Options for a single `upload` run
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub config: PathBuf,
    pub credentials: Option<PathBuf>,
    pub extension: Option<String>,
    pub dry_run: bool,
    pub port: u16,
    /// Seconds to wait for the browser redirect; `None` waits forever
    pub auth_timeout: Option<u64>,
    pub open_browser: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            config: PathBuf::from(webstore_core::config::DEFAULT_CONFIG_FILE),
            credentials: None,
            extension: None,
            dry_run: false,
            port: DEFAULT_CALLBACK_PORT,
            auth_timeout: Some(300),
            open_browser: true,
        }
    }
}

pub fn execute(options: &UploadOptions) -> Result<()> {
    let plan = super::load_plan(
        &options.config,
        options.credentials.as_deref(),
        options.extension.as_deref(),
    )?;

    if options.dry_run {
        return super::plan::execute(&plan);
    }

    let acquirer = TokenAcquirer::new(&plan.endpoints)
        .with_port(options.port)
        .with_timeout(options.auth_timeout.map(Duration::from_secs))
        .with_browser(options.open_browser);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(run(&plan, &acquirer));

    // Do not hang on a stray connection task after the report is in
    runtime.shutdown_timeout(Duration::from_millis(100));

    let report = result?;
    print_summary(&report);

    if !report.is_success() {
        bail!("Error while uploading");
    }

    Ok(())
}

/// Authorize every account in the plan, then upload every job.
///
/// Ctrl+C at any point drops the whole run: listeners, prompts and
/// in-flight uploads.
pub async fn run(plan: &Plan, acquirer: &TokenAcquirer) -> Result<BatchReport> {
    tokio::select! {
        report = run_plan(plan, acquirer) => Ok(report),
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, stopping");
            bail!("Upload interrupted")
        }
    }
}

async fn run_plan(plan: &Plan, acquirer: &TokenAcquirer) -> BatchReport {
    let accounts = authorize_accounts(plan, acquirer).await;
    let client = WebstoreClient::new(plan.endpoints.clone());

    run_batch(&client, &plan.jobs, &accounts).await
}

/// Acquire tokens one account at a time; a failed account only fails its own jobs
pub async fn authorize_accounts(
    plan: &Plan,
    acquirer: &TokenAcquirer,
) -> BTreeMap<String, AccountAuth> {
    let mut accounts = BTreeMap::new();

    for step in &plan.token_steps {
        let name = &step.account.name;
        tracing::info!("Authorizing account '{}' ({})", name, step.strategy);

        let auth = match acquirer.acquire(step).await {
            Ok(token) => {
                tracing::info!("Authorization done ({})", name);
                Ok(AuthorizedAccount::new(&step.account, token))
            }
            Err(e) => {
                tracing::error!("Authorization failed ({}): {}", name, e);
                Err(e.to_string())
            }
        };

        accounts.insert(name.clone(), auth);
    }

    accounts
}

fn print_summary(report: &BatchReport) {
    println!();
    println!("================");
    println!();

    for job in &report.jobs {
        match &job.result {
            Ok(success) => {
                let publish = match &success.publish {
                    PublishOutcome::Skipped => String::new(),
                    PublishOutcome::Published => ", published".to_string(),
                    PublishOutcome::Warning(msg) => {
                        format!(", {} {}", style("publish warning:").yellow(), msg)
                    }
                };
                println!(
                    "{} {} ({}): uploaded {}{}",
                    style("✅").green(),
                    job.name,
                    job.app_id,
                    success.package.display(),
                    publish
                );
            }
            Err(e) => println!(
                "{} {} ({}): {}",
                style("❌").red(),
                job.name,
                job.app_id,
                e
            ),
        }
    }

    println!();
    println!(
        "Uploaded {}/{} extension(s)",
        report.succeeded(),
        report.jobs.len()
    );
}
