use anyhow::Result;
use clap::Parser;

use dealhunter::application::{Cli, CommandExecutor};
use dealhunter::shared::config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();

    let config = ConfigLoader::load(cli.config.as_deref())?;
    let executor = CommandExecutor::new(config)?;
    executor.execute(cli.command).await?;

    Ok(())
}
