mod offsets;
mod params;
mod resolve;


use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::{Cli, Command, OffsetAction};
use crate::db::Database;
use crate::paths::database_file_path;

use self::params::PlayParams;
use self::resolve::{Endpoints, Provenance};

pub fn run(cli: Cli) -> Result<()> {
    let db = open_db()?;

    match cli.command {
        Command::Resolve { input } => run_resolve(&db, input.as_deref())?,
        Command::Offset { action } => run_offset(&db, action)?,
    }

    Ok(())
}

fn run_resolve(db: &Database, input: Option<&Path>) -> Result<()> {
    let raw = match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read params from {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read params from stdin")?;
            buffer
        }
    };
    let mut params: PlayParams =
        serde_json::from_str(&raw).context("play params are not valid JSON")?;

    let endpoints = Endpoints::from_env();
    if let Some(resolution) = resolve::run_pre_playback_hook(db, &endpoints, &mut params) {
        eprintln!(
            "Timecodes loaded: season {}, episode {} ({} segment(s) via {})",
            resolution.season,
            resolution.episode,
            resolution.segment_count,
            source_label(resolution.provenance)
        );
    }

    println!("{}", serde_json::to_string(&params)?);
    Ok(())
}

fn source_label(provenance: Provenance) -> &'static str {
    match provenance {
        Provenance::TimingService => "timing service",
        Provenance::CommunityDb => "community db",
    }
}

fn run_offset(db: &Database, action: OffsetAction) -> Result<()> {
    match action {
        OffsetAction::Get { card_id } => {
            println!("{}", offsets::get_offset(db, Some(&card_id)));
        }
        OffsetAction::Set { card_id, value } => {
            offsets::set_offset(db, &card_id, value)?;
            if value == 0 {
                println!("Offset for {card_id} removed.");
            } else {
                println!("Offset for {card_id} set to {value:+} sec.");
            }
        }
        OffsetAction::List => {
            let stored = offsets::load_offsets(db);
            if stored.is_empty() {
                println!("No offsets stored.");
            } else {
                for (card_id, value) in stored {
                    println!("{card_id:<20} {value:+}");
                }
            }
        }
    }
    Ok(())
}

fn open_db() -> Result<Database> {
    let db_path = database_file_path()?;
    let db = Database::open(&db_path)?;
    db.migrate()?;
    Ok(db)
}
