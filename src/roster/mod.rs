//! The canonical player table matched against OCR output.
//!
//! This module provides:
//! - Player records with value identity
//! - Position codes and OCR cleanup
//! - Team name normalization
//! - CSV loading of the ranked roster

pub mod loader;
pub mod player;
pub mod teams;

pub use loader::{load_players, load_players_from_reader};
pub use player::{Player, PlayerId, Position};
pub use teams::{normalize_team, team_code};

use anyhow::{Result, bail};
use std::path::Path;

/// Read-only ranked player list. Index order is the ranking.
#[derive(Debug, Clone)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Builds a roster; fails when there are no players.
    pub fn new(players: Vec<Player>) -> Result<Self> {
        if players.is_empty() {
            bail!("Roster is empty");
        }
        Ok(Self { players })
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::new(load_players(path)?)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// 1-based rank of the player at `index`.
    pub fn rank_of(index: usize) -> u32 {
        index as u32 + 1
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Case-insensitive lookup by "First Last" (or team name for defenses).
    pub fn find_by_full_name(&self, name: &str) -> Option<&Player> {
        let wanted = name.trim().to_uppercase();
        self.players.iter().find(|p| p.full_name() == wanted)
    }
}
