use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use efs_sync::{deploy::DeployCommand, init::init_tracing, local};
use efs_sync_config::RuntimeConfig;
use std::path::PathBuf;

/// Populate an EFS volume from a zip archive
#[derive(Parser)]
#[command(name = "efs-sync")]
#[command(version)]
#[command(about = "Populate an EFS volume from a zip archive", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download an archive and extract it under the mount base
    Sync(local::SyncArgs),
    /// Generate deployment templates
    #[command(subcommand)]
    Deploy(DeployCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Deploy(deploy) => deploy.run(),
        Command::Sync(ref args) => {
            let mut config = match &cli.config {
                Some(path) => RuntimeConfig::load_from_path(path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?,
                None => RuntimeConfig::load().context("Failed to load configuration")?,
            };
            if let Some(level) = &cli.log_level {
                config.logging.level = level.clone();
            }
            local::apply_cli_overrides(&mut config, args);
            config.validate()?;
            init_tracing(&config);

            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to build tokio runtime")?
                .block_on(local::run(&config, args))?;
            Ok(())
        }
    }
}
