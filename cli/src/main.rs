use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, MietteHandlerOpts, Result};

use mythx_cli::client::core::{Client, Environment};
use mythx_cli::client::models::OpenApiMode;
use mythx_cli::commands::core::{self as cmd, CheckInput, parse_uuid};
use mythx_cli::commands::session::{Context, StdinPrompter};
use mythx_cli::commands::top::top;
use mythx_cli::config::core::default_config_path;
use mythx_cli::config::settings::Settings;
use mythx_cli::utils::logging::{LogConfig, init_logging};

#[derive(Parser)]
#[command(
    name = "mythx",
    version,
    about = "Submit smart contracts to MythX and inspect the results"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Args)]
struct GlobalArgs {
    /// Use the MythX staging environment
    #[arg(long, global = true, env = "PYTHX_STAGING")]
    staging: bool,

    /// Path to user credentials JSON file
    #[arg(long, global = true, env = "PYTHX_CONFIG")]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, global = true, env = "PYTHX_DEBUG")]
    debug: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, env = "PYTHX_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Ethereum address to log in with when no credentials are stored
    #[arg(long, global = true, env = "PYTHX_USERNAME")]
    username: Option<String>,

    #[arg(long, global = true, env = "PYTHX_PASSWORD", hide = true, hide_env_values = true)]
    password: Option<String>,
}

impl GlobalArgs {
    fn into_settings(self) -> Settings {
        Settings {
            environment: Environment::from_staging_flag(self.staging),
            config_path: self.config.unwrap_or_else(default_config_path),
            username: self.username,
            password: self.password,
            log: LogConfig {
                debug: self.debug,
                file: self.log_file,
            },
        }
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Login to your MythX account
    Login,
    /// Log out of your MythX account
    Logout,
    /// Refresh your MythX API token
    Refresh,
    /// Get the OpenAPI spec in HTML or YAML format
    Openapi {
        /// Get the HTML OpenAPI spec
        #[arg(long, conflicts_with = "yaml")]
        html: bool,
        /// Get the YAML OpenAPI spec (default)
        #[arg(long)]
        yaml: bool,
    },
    /// Print version information of the API
    Version,
    /// Get the status of an analysis by its UUID
    Status {
        #[arg(value_parser = parse_uuid)]
        uuid: String,
    },
    /// Get a greppable overview of submitted analyses
    Ps {
        /// The number of most recent analysis jobs to display
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u16).range(1..=100))]
        number: u16,
    },
    /// Display the most recent analysis jobs and their status
    Top {
        /// Refresh interval in seconds
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },
    /// Submit a new analysis job based on source code, byte code, or both
    #[command(visible_aliases = &["c"])]
    Check {
        /// Analysis job creation byte code
        #[arg(short, long)]
        bytecode: Option<String>,
        /// Analysis job Solidity source code
        #[arg(short, long)]
        source: Option<String>,
        /// Path to file containing creation bytecode
        #[arg(long, visible_alias = "bf")]
        bytecode_file: Option<PathBuf>,
        /// Path to file containing Solidity source code
        #[arg(long, visible_alias = "sf")]
        source_file: Option<PathBuf>,
    },
    /// Check the detected issues of a finished analysis job
    Report {
        #[arg(value_parser = parse_uuid)]
        uuid: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    miette::set_hook(Box::new(|_| {
        Box::new(
            MietteHandlerOpts::new()
                .color(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let settings = cli.global.into_settings();
    let _log_guard = init_logging(&settings.log)?;
    tracing::debug!(
        environment = ?settings.environment,
        config = %settings.config_path.display(),
        "starting"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;
    runtime.block_on(run(cli.cmd, &settings))
}

async fn run(command: Cmd, settings: &Settings) -> Result<()> {
    let client = Client::new(settings.environment)?;
    let ctx = Context {
        service: &client,
        settings,
        prompter: &StdinPrompter,
    };
    let mut stdout = std::io::stdout();
    let out = &mut stdout;

    match command {
        Cmd::Login => cmd::login(&ctx, out).await,
        Cmd::Logout => cmd::logout(&ctx, out).await,
        Cmd::Refresh => cmd::refresh(&ctx, out).await,
        Cmd::Openapi { html, yaml: _ } => {
            let mode = if html {
                OpenApiMode::Html
            } else {
                OpenApiMode::Yaml
            };
            cmd::openapi(&ctx, out, mode).await
        }
        Cmd::Version => cmd::version(&ctx, out).await,
        Cmd::Status { uuid } => cmd::status(&ctx, out, &uuid).await,
        Cmd::Ps { number } => cmd::ps(&ctx, out, usize::from(number)).await,
        Cmd::Top { interval } => {
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("could not listen for Ctrl-C: {e}");
                    std::future::pending::<()>().await;
                }
            };
            top(&ctx, out, Duration::from_secs(interval), shutdown).await
        }
        Cmd::Check {
            bytecode,
            source,
            bytecode_file,
            source_file,
        } => {
            let input = CheckInput {
                bytecode,
                source,
                bytecode_file,
                source_file,
            };
            cmd::check(&ctx, out, &input).await
        }
        Cmd::Report { uuid } => cmd::report(&ctx, out, &uuid).await,
    }
}
