use anyhow::{Result, bail};
use console::style;
use std::path::PathBuf;
use webstore_core::{Plan, resolve_package};

/// Dry-run view of a single job
#[derive(Debug)]
pub struct JobPreview {
    pub name: String,
    pub app_id: String,
    pub account: String,
    pub package: Result<PathBuf, String>,
    pub publish: bool,
    pub publish_target: Option<String>,
}

/// Resolve packages and publish decisions without touching the network
pub fn preview(plan: &Plan) -> Vec<JobPreview> {
    plan.jobs
        .iter()
        .map(|job| {
            let account_publish = plan
                .token_steps
                .iter()
                .find(|s| s.account.name == job.account)
                .and_then(|s| s.account.publish);

            JobPreview {
                name: job.name.clone(),
                app_id: job.app_id.clone(),
                account: job.account.clone(),
                package: resolve_package(&job.package).map_err(|e| e.to_string()),
                publish: job.should_publish(account_publish),
                publish_target: job.publish_target.clone(),
            }
        })
        .collect()
}

/// Print the plan; fails if any package cannot be resolved
pub fn execute(plan: &Plan) -> Result<()> {
    println!();
    println!("{}", style("Accounts").bold().cyan());
    for step in &plan.token_steps {
        let jobs = plan.jobs_for(&step.account.name).count();
        println!(
            "  {:<20} {:<12} {} extension(s)",
            step.account.name,
            step.strategy.to_string(),
            jobs
        );
    }

    println!();
    println!("{}", style("Extensions").bold().cyan());

    let previews = preview(plan);
    let mut unresolved = 0;

    for job in &previews {
        let publish = match (job.publish, &job.publish_target) {
            (false, _) => "no publish".to_string(),
            (true, None) => "publish".to_string(),
            (true, Some(target)) => format!("publish to {}", target),
        };

        match &job.package {
            Ok(path) => println!(
                "  {} {} ({}) via '{}': {} [{}]",
                style("✓").green(),
                job.name,
                job.app_id,
                job.account,
                path.display(),
                publish
            ),
            Err(e) => {
                unresolved += 1;
                println!(
                    "  {} {} ({}) via '{}': {}",
                    style("✗").red(),
                    job.name,
                    job.app_id,
                    job.account,
                    e
                );
            }
        }
    }
    println!();

    if unresolved > 0 {
        bail!("{} package(s) could not be resolved", unresolved);
    }

    Ok(())
}
