use clap::{Parser, Subcommand};

use crate::services::DEFAULT_TOKEN_FILE;

#[derive(Parser)]
#[command(name = "stablecoin-digest")]
#[command(about = "Daily Google News stablecoin digest delivered by Gmail")]
#[command(version)]
pub struct Cli {
    /// Defaults to `run` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Fetch both feeds and email one digest per keyword
    Run {
        /// Dry run - print the digests instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Obtain a Gmail refresh token (interactive)
    Authorize {
        /// Where to write the token file
        #[arg(short, long, default_value = DEFAULT_TOKEN_FILE)]
        output: String,
    },
}

impl Cli {
    pub fn command(self) -> Commands {
        self.command.unwrap_or(Commands::Run { dry_run: false })
    }
}
