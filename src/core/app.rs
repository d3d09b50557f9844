use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::MapConfig;
use crate::core::scenario::{self, Scenario};

#[derive(Parser)]
#[command(author, version, about = "Map view synchronization engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a scripted session against the in-memory renderer
    Replay {
        /// Scenario file (JSON)
        path: PathBuf,

        /// Configuration file instead of the user config
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,

        /// Print every recorded draw operation
        #[arg(long = "ops")]
        ops: bool,
    },
    /// Print the effective configuration as JSON
    Config {
        /// Write the effective configuration back to the user config file
        #[arg(long = "save")]
        save: bool,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Replay { path, config, ops } => {
            let config = match config {
                Some(path) => MapConfig::load_from(&path)?,
                None => MapConfig::load(),
            };
            let scenario = Scenario::load(&path)?;
            let mut report = scenario::run_scenario(scenario, config).await?;
            if !ops {
                report.ops.clear();
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Config { save } => {
            let config = MapConfig::load();
            if save {
                config.save();
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }
    Ok(())
}
