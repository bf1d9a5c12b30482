use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use aether_infrastructure::{AetherPaths, ConfigService};

mod app;
mod commands;
mod logging;
mod output;
mod repl;

use app::App;
use commands::Command;

#[derive(Parser)]
#[command(name = "aether")]
#[command(about = "Aether - describe a UI component, get JSX and CSS back", long_about = None)]
#[command(version)]
struct Cli {
    /// Keep config, secrets, sessions and logs under DIR
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Mirror logs to the console
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<TopLevel>,
}

#[derive(Subcommand)]
enum TopLevel {
    #[command(flatten)]
    Session(Command),
    /// Interactive mode (default)
    Repl,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = AetherPaths::new(cli.data_dir.as_deref());
    let config = ConfigService::new(&paths)?.get_config();
    let logs_dir = paths
        .logs_dir()
        .map_err(|e| anyhow!("Failed to resolve log directory: {}", e))?;
    logging::init(&logs_dir, &config.app.log_level, cli.verbose)?;
    tracing::debug!("Starting aether with data dir {:?}", cli.data_dir);

    let app = App::build(&paths, &config).await?;

    let result = match cli.command.unwrap_or(TopLevel::Repl) {
        TopLevel::Repl => repl::run(&app).await,
        TopLevel::Session(command) => commands::execute(&app, command).await,
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
        output::print_error(e);
        std::process::exit(1);
    }
    Ok(())
}
