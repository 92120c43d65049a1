//! Webshell headless host.
//!
//! Runs the host shell against config-backed platform services, reading host
//! events as JSON lines from stdin. See the `webshell` library for the core.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::BufReader;

use webshell::chrome::Theme;
use webshell::env::Environment;
use webshell::{headless, Config, RouteOutcome, Shell};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "webshell")]
#[command(version = VERSION)]
#[command(about = "Native host shell for a remote web app")]
struct Cli {
    /// Configuration directory (overrides WEBSHELL_CONFIG_DIR).
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the shell and handle host events from stdin.
    Run {
        /// Start in dark mode.
        #[arg(long)]
        dark: bool,
    },
    /// Print the effective configuration.
    Config {
        /// Also write it to config.json.
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let environment = Environment::current();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(environment.default_log_filter()),
    )
    .format_timestamp_secs()
    .init();

    let cli = Cli::parse();
    let config_dir = cli.config_dir.as_deref();
    let config = Config::load(config_dir)?;

    match cli.command {
        Commands::Run { dark } => run(config, Theme::from_dark(dark)).await,
        Commands::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                let path = config.save(config_dir)?;
                log::info!("Saved configuration to {}", path.display());
            }
            Ok(())
        }
    }
}

async fn run(config: Config, theme: Theme) -> Result<()> {
    log::info!("Webshell v{} starting ({})", VERSION, Environment::current());

    let (collaborators, navigations) = headless::collaborators(&config)?;
    let mut shell = Shell::new(config, collaborators, theme);
    let _permission = shell.launch();

    let outcomes = headless::run(
        &mut shell,
        BufReader::new(tokio::io::stdin()),
        navigations,
        |outcome| println!("{outcome:?}"),
    )
    .await?;

    let registered = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, RouteOutcome::Registration(_)))
        .count();
    log::info!(
        "Input closed after {} bridge message(s), {} registration flow(s)",
        outcomes.len(),
        registered
    );
    Ok(())
}
