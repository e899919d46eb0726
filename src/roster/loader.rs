//! CSV reader for the player table.
//!
//! Expected header: `PLAYER NAME,TEAM,POS,BYE WEEK`. Row order is the
//! ranking (ADP) order and is preserved.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::player::{Player, Position};

#[derive(Debug, Deserialize)]
struct RawPlayer {
    #[serde(rename = "PLAYER NAME")]
    name: String,
    #[serde(rename = "TEAM", default)]
    team: String,
    #[serde(rename = "POS")]
    pos: String,
    #[serde(rename = "BYE WEEK", default)]
    bye: String,
}

/// Parses the bye-week column. "-" or blank (free agents) is week 0.
fn parse_bye(text: &str) -> Result<u32> {
    let text = text.trim();
    if text.is_empty() || text == "-" {
        return Ok(0);
    }
    text.parse::<u32>()
        .with_context(|| format!("Invalid bye week: {}", text))
}

fn to_player(raw: RawPlayer) -> Result<Player> {
    let pos: Position = raw
        .pos
        .trim()
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let bye = parse_bye(&raw.bye)?;
    let team = raw.team.trim().to_uppercase();
    let name = raw.name.trim();

    if pos == Position::DST {
        // Defenses are named after the franchise: the whole name is the "last" name
        return Ok(Player {
            first: String::new(),
            last: name.to_uppercase(),
            team,
            pos,
            bye,
            is_team_defense: true,
        });
    }

    let (first, last) = match name.split_once(' ') {
        Some((first, last)) => (first, last),
        None => ("", name),
    };
    Ok(Player {
        first: first.trim().to_uppercase(),
        last: last.trim().to_uppercase(),
        team,
        pos,
        bye,
        is_team_defense: false,
    })
}

/// Reads players from any CSV source. Malformed rows are skipped with a warning.
pub fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<Player>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut players = Vec::new();

    for (idx, result) in reader.deserialize::<RawPlayer>().enumerate() {
        let row = idx + 2; // 1-based, after header
        match result.map_err(anyhow::Error::from).and_then(to_player) {
            Ok(player) => players.push(player),
            Err(e) => log::warn!("Skipping malformed roster row {}: {}", row, e),
        }
    }

    Ok(players)
}

/// Loads the player table from a CSV file. An empty table is an error:
/// nothing could ever be matched against it.
pub fn load_players(path: &Path) -> Result<Vec<Player>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open roster file: {}", path.display()))?;
    let players = load_players_from_reader(file)
        .with_context(|| format!("Failed to read roster file: {}", path.display()))?;
    if players.is_empty() {
        bail!("Roster {} contains no players", path.display());
    }
    log::info!("Loaded {} players from {}", players.len(), path.display());
    Ok(players)
}
