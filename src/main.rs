use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vidharvest::app::AppContext;
use vidharvest::cli::{commands, Cli, Commands};
use vidharvest::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vidharvest=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Run => {
            commands::run(&ctx).await?;
        }
        Commands::List => {
            commands::list_items(&ctx).await?;
        }
        Commands::Resolve { ref id } => {
            commands::resolve_item(&ctx, id).await?;
        }
    }

    Ok(())
}
