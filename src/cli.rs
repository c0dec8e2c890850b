use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "skiptrack",
    version,
    about = "Resolve skippable opening/ending/recap segments for a playback request"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read play params JSON from stdin (or a file), attach resolved skip
    /// segments, write the enriched params to stdout
    Resolve {
        /// Read params from a file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Manage the per-title segment offset (seconds)
    Offset {
        #[command(subcommand)]
        action: OffsetAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum OffsetAction {
    /// Print the stored offset for a card id (0 if none)
    Get { card_id: String },
    /// Store an offset for a card id; 0 removes the record
    Set { card_id: String, value: i64 },
    /// Print all stored offsets
    List,
}
