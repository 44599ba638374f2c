use clap::{Parser, Subcommand};
use lessonboard_core::WhiteboardConfig;
use lessonboard_core::storage::{FileStorage, SavedBoards};
use std::path::PathBuf;

mod replay;
mod script;

use replay::{Replay, ReplayOptions};
use script::Script;

#[derive(Parser, Debug)]
#[command(name = "lessonboard")]
#[command(version, about = "Classroom whiteboard: replay lesson scripts and export pages")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a lesson script and print a JSON summary
    Replay {
        /// Script file (JSON list of actions)
        script: PathBuf,

        /// Whiteboard config file (JSON)
        #[arg(long, short = 'c', value_name = "FILE")]
        config: Option<PathBuf>,

        /// Directory for exported page PNGs
        #[arg(long, short = 'o', value_name = "DIR")]
        out: Option<PathBuf>,

        /// Saved-boards directory
        #[arg(long, short = 's', value_name = "DIR")]
        store: Option<PathBuf>,
    },
    /// Validate a config file and print it with defaults filled in
    CheckConfig {
        config: PathBuf,
    },
    /// List saved boards
    Saved {
        /// Saved-boards directory (defaults to the user data directory)
        #[arg(long, short = 's', value_name = "DIR")]
        store: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<WhiteboardConfig> {
    match path {
        Some(path) => Ok(WhiteboardConfig::load(path)?),
        None => Ok(WhiteboardConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Replay {
            script,
            config,
            out,
            store,
        } => {
            let config = load_config(config.as_ref())?;
            let script = Script::load(&script)?;
            log::info!("Replaying {} actions", script.actions.len());

            let options = ReplayOptions {
                out_dir: out,
                store_dir: store,
            };
            let mut replay = Replay::new(config, options)?;
            replay.run(&script)?;
            println!("{}", serde_json::to_string_pretty(&replay.summary())?);
        }
        Command::CheckConfig { config } => {
            let config = WhiteboardConfig::load(&config)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Command::Saved { store } => {
            let storage = match store {
                Some(dir) => FileStorage::new(dir)?,
                None => FileStorage::default_location()?,
            };
            let boards = pollster::block_on(SavedBoards::new(storage).list())?;
            if boards.is_empty() {
                println!("No saved boards");
            }
            for board in boards {
                println!(
                    "{}  {}  {} ({} elements)",
                    board.id,
                    board.timestamp.format("%Y-%m-%d %H:%M"),
                    board.title,
                    board.elements.len()
                );
            }
        }
    }

    Ok(())
}
