use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fantasy position printed on a draft card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    K,
    DST,
}

impl Position {
    pub const ALL: [Position; 6] = [
        Position::QB,
        Position::RB,
        Position::WR,
        Position::TE,
        Position::K,
        Position::DST,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QB => "QB",
            Self::RB => "RB",
            Self::WR => "WR",
            Self::TE => "TE",
            Self::K => "K",
            Self::DST => "DST",
        }
    }

    /// Cleans noisy OCR text (case, punctuation, whitespace) into a position.
    ///
    /// Returns None when the letters left over are not an exact position code.
    pub fn from_ocr(text: &str) -> Option<Self> {
        let letters: String = text
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match letters.as_str() {
            "QB" => Some(Self::QB),
            "RB" => Some(Self::RB),
            "WR" => Some(Self::WR),
            "TE" => Some(Self::TE),
            "K" => Some(Self::K),
            "DST" | "DEF" => Some(Self::DST),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_ocr(s).ok_or_else(|| format!("unknown position: {}", s))
    }
}

/// Value identity of a roster entry, used by the used-player set.
///
/// Last name alone is not enough: distinct players share last names.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId {
    pub first: String,
    pub last: String,
    pub team: String,
    pub pos: Position,
    pub bye: u32,
}

/// One row of the canonical player table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub first: String,
    pub last: String,
    pub team: String,
    pub pos: Position,
    pub bye: u32,
    pub is_team_defense: bool,
}

impl Player {
    pub fn id(&self) -> PlayerId {
        PlayerId {
            first: self.first.clone(),
            last: self.last.clone(),
            team: self.team.clone(),
            pos: self.pos,
            bye: self.bye,
        }
    }

    /// "FIRST LAST", or just the team name for a defense.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first, self.last).trim().to_string()
    }
}
