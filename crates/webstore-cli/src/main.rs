use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use commands::upload::UploadOptions;
use webstore_auth::DEFAULT_CALLBACK_PORT;
use webstore_core::config::DEFAULT_CONFIG_FILE;

mod commands;

#[derive(Parser)]
#[command(name = "webstore")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Upload and publish browser extensions to the Chrome Web Store",
    long_about = "Webstore authorizes your Google accounts over OAuth2, uploads the configured \
                  extension packages and optionally publishes them, all driven by a JSON \
                  configuration file."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, env = "WEBSTORE_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Path to the private credentials file
    #[arg(long, global = true, env = "WEBSTORE_CREDENTIALS")]
    credentials: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload one extension, or every configured extension
    Upload {
        /// Extension name from the configuration (all when omitted)
        #[arg(value_name = "EXTENSION")]
        extension: Option<String>,

        /// Show what would be uploaded without any network call
        #[arg(long)]
        dry_run: bool,

        /// Local port for the OAuth redirect listener
        #[arg(long, default_value_t = DEFAULT_CALLBACK_PORT)]
        port: u16,

        /// Seconds to wait for browser authorization (0 waits forever)
        #[arg(long, value_name = "SECS", default_value_t = 300)]
        auth_timeout: u64,

        /// Print the authorization URL instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Validate configuration and show the upload plan
    Plan {
        /// Extension name from the configuration (all when omitted)
        #[arg(value_name = "EXTENSION")]
        extension: Option<String>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Execute the command
    match cli.command {
        Commands::Upload {
            extension,
            dry_run,
            port,
            auth_timeout,
            no_browser,
        } => commands::upload::execute(&UploadOptions {
            config: cli.config,
            credentials: cli.credentials,
            extension,
            dry_run,
            port,
            auth_timeout: (auth_timeout > 0).then_some(auth_timeout),
            open_browser: !no_browser,
        }),
        Commands::Plan { extension } => {
            let plan = commands::load_plan(
                &cli.config,
                cli.credentials.as_deref(),
                extension.as_deref(),
            )?;
            commands::plan::execute(&plan)
        }
        Commands::Completion { shell } => {
            commands::completion::execute(shell, &mut Cli::command(), &mut std::io::stdout())
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new(
            "webstore=debug,webstore_core=debug,webstore_auth=debug,webstore_client=debug",
        )
    } else {
        EnvFilter::new("webstore=info,webstore_core=info,webstore_auth=info,webstore_client=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
