mod cli;
mod commands;
mod extract;
mod mcp;
mod page_range;
mod pdf;
mod telemetry;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use extract::Extractor;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.settings.log_json);

    let extractor = Extractor::new(cli.settings.extractor_config());

    match cli.command {
        Commands::Mcp => {
            mcp::run_server(extractor).await?;
        }
        Commands::ReadPages { path, pages, json } => {
            commands::read_pages::run(&extractor, &path, &pages, json)?;
        }
        Commands::Resolve { pages, max } => {
            commands::resolve::run(&pages, max)?;
        }
    }

    Ok(())
}
