use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chireader::app::AppContext;
use chireader::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries command output and the TUI, so logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::new(cli.config.as_deref())?;

    match cli.command {
        Commands::Latest { json } => {
            commands::latest(&ctx, json).await?;
        }
        Commands::Home { json } => {
            commands::home(&ctx, json).await?;
        }
        Commands::Novel { url, json } => {
            commands::novel(&ctx, &url, json).await?;
        }
        Commands::Chapter { url, json } => {
            commands::chapter(&ctx, &url, json).await?;
        }
        Commands::Read { url, novel } => {
            let start = ctx.library.chapter_id(&url)?;
            let novel = novel.map(|n| ctx.library.novel_id(&n)).transpose()?;
            chireader::tui::run(Arc::new(ctx), start, novel).await?;
        }
    }

    Ok(())
}
