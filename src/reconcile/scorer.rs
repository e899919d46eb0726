//! Multi-factor scoring of one cell's observations against the roster.

use serde::Serialize;

use super::assign::UsedPlayerSet;
use super::fuzzy::{normalize_name, token_set_ratio};
use crate::draft::draft_likelihood;
use crate::ocr::ExtractedFields;
use crate::roster::{Player, Position, Roster, normalize_team};

pub const LASTNAME_WEIGHT: f64 = 0.40;
pub const FIRSTNAME_WEIGHT: f64 = 0.15;
pub const TEAM_BONUS: f64 = 15.0;
pub const BYE_BONUS: f64 = 10.0;
pub const COLOR_POS_BONUS: f64 = 15.0;
pub const OCR_POS_BONUS: f64 = 10.0;
pub const DRAFT_WEIGHT: f64 = 0.20;
/// Reported scores are clamped to this ceiling.
pub const MAX_SCORE: f64 = 100.0;

/// Points earned by each factor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub lastname: f64,
    pub firstname: f64,
    pub team: f64,
    pub bye: f64,
    pub color_pos: f64,
    pub ocr_pos: f64,
    pub draft_likelihood: f64,
}

impl ScoreBreakdown {
    /// Unclamped sum of all factors.
    pub fn total(&self) -> f64 {
        self.lastname
            + self.firstname
            + self.team
            + self.bye
            + self.color_pos
            + self.ocr_pos
            + self.draft_likelihood
    }
}

/// One scored roster candidate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredMatch {
    /// Score clamped to 0–100
    pub score: f64,
    /// Unclamped sum; candidates are ordered by this
    #[serde(skip)]
    pub raw_score: f64,
    pub player: Player,
    /// Index into the roster
    #[serde(skip)]
    pub index: usize,
    /// 1-based roster rank
    pub rank: u32,
    pub breakdown: ScoreBreakdown,
    pub is_used: bool,
}

/// OCR observations prepared once per cell before scoring every candidate.
struct Observation {
    last: String,
    first: Option<String>,
    team: Option<String>,
    bye: Option<u32>,
    color_pos: Option<Position>,
    ocr_pos: Option<Position>,
}

impl Observation {
    fn new(fields: &ExtractedFields) -> Self {
        let first = fields.first_name.trim();
        Self {
            last: normalize_name(&fields.last_name),
            first: (first.chars().count() > 1).then(|| normalize_name(first)),
            team: normalize_team(&fields.team_text),
            bye: fields.bye.filter(|&b| b > 0),
            color_pos: fields.color_pos,
            ocr_pos: Position::from_ocr(&fields.pos_text),
        }
    }
}

/// Scores cells against a read-only roster.
pub struct Scorer<'a> {
    roster: &'a Roster,
}

impl<'a> Scorer<'a> {
    pub fn new(roster: &'a Roster) -> Self {
        Self { roster }
    }

    pub fn roster(&self) -> &'a Roster {
        self.roster
    }

    fn breakdown(&self, obs: &Observation, index: usize, player: &Player, pick: u32) -> ScoreBreakdown {
        let lastname = token_set_ratio(&obs.last, &normalize_name(&player.last)) * LASTNAME_WEIGHT;
        let firstname = obs
            .first
            .as_deref()
            .map(|first| token_set_ratio(first, &normalize_name(&player.first)) * FIRSTNAME_WEIGHT)
            .unwrap_or(0.0);
        let team = match &obs.team {
            Some(team) if team.eq_ignore_ascii_case(&player.team) => TEAM_BONUS,
            _ => 0.0,
        };
        let bye = if obs.bye == Some(player.bye) { BYE_BONUS } else { 0.0 };
        let color_pos = if obs.color_pos == Some(player.pos) { COLOR_POS_BONUS } else { 0.0 };
        let ocr_pos = if obs.ocr_pos == Some(player.pos) { OCR_POS_BONUS } else { 0.0 };
        let draft = draft_likelihood(Roster::rank_of(index), pick) * DRAFT_WEIGHT;

        ScoreBreakdown {
            lastname,
            firstname,
            team,
            bye,
            color_pos,
            ocr_pos,
            draft_likelihood: draft,
        }
    }

    /// Scores every eligible candidate, best first.
    ///
    /// When the cell carries a color position only players of that
    /// position are eligible. Used players are skipped unless
    /// `include_used` is set. Ties keep roster order. A cell whose last
    /// name normalizes to nothing has no candidates.
    pub fn rank_candidates(
        &self,
        fields: &ExtractedFields,
        pick: u32,
        used: &UsedPlayerSet,
        include_used: bool,
    ) -> Vec<ScoredMatch> {
        let obs = Observation::new(fields);
        if obs.last.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<ScoredMatch> = self
            .roster
            .players()
            .iter()
            .enumerate()
            .filter(|(_, p)| obs.color_pos.is_none_or(|pos| p.pos == pos))
            .filter_map(|(index, player)| {
                let is_used = used.contains(player);
                if is_used && !include_used {
                    return None;
                }
                let breakdown = self.breakdown(&obs, index, player, pick);
                let raw_score = breakdown.total();
                Some(ScoredMatch {
                    score: raw_score.clamp(0.0, MAX_SCORE),
                    raw_score,
                    player: player.clone(),
                    index,
                    rank: Roster::rank_of(index),
                    breakdown,
                    is_used,
                })
            })
            .collect();

        scored.sort_by(|a, b| b.raw_score.total_cmp(&a.raw_score));
        scored
    }

    /// Highest-scoring unused candidate, if any.
    pub fn best_match(
        &self,
        fields: &ExtractedFields,
        pick: u32,
        used: &UsedPlayerSet,
    ) -> Option<ScoredMatch> {
        self.rank_candidates(fields, pick, used, false)
            .into_iter()
            .next()
    }

    /// The `n` best candidates for manual correction.
    pub fn top_n(
        &self,
        fields: &ExtractedFields,
        pick: u32,
        used: &UsedPlayerSet,
        n: usize,
        include_used: bool,
    ) -> Vec<ScoredMatch> {
        let mut ranked = self.rank_candidates(fields, pick, used, include_used);
        ranked.truncate(n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::load_players_from_reader;

    fn roster() -> Roster {
        let csv = "PLAYER NAME,TEAM,POS,BYE WEEK
Josh Allen,BUF,QB,7
Justin Jefferson,MIN,WR,6
Keenan Allen,CHI,WR,7
Baltimore Ravens,BAL,DST,14
";
        Roster::new(load_players_from_reader(csv.as_bytes()).unwrap()).unwrap()
    }

    fn fields(last: &str) -> ExtractedFields {
        ExtractedFields {
            last_name: last.to_string(),
            ..ExtractedFields::default()
        }
    }

    #[test]
    fn test_breakdown_full_marks() {
        let roster = roster();
        let scorer = Scorer::new(&roster);
        let cell = ExtractedFields {
            pos_text: "QB".to_string(),
            bye: Some(7),
            last_name: "Allen".to_string(),
            first_name: "Josh".to_string(),
            team_text: "Bills".to_string(),
            color_pos: Some(Position::QB),
        };

        let best = scorer.best_match(&cell, 1, &UsedPlayerSet::new()).unwrap();
        assert_eq!(best.player.first, "JOSH");
        assert_eq!(best.rank, 1);
        let b = best.breakdown;
        assert!((b.lastname - 40.0).abs() < 1e-9);
        assert!((b.firstname - 15.0).abs() < 1e-9);
        assert_eq!(b.team, TEAM_BONUS);
        assert_eq!(b.bye, BYE_BONUS);
        assert_eq!(b.color_pos, COLOR_POS_BONUS);
        assert_eq!(b.ocr_pos, OCR_POS_BONUS);
        assert!((b.draft_likelihood - 20.0).abs() < 1e-9);
        // Raw sum exceeds the ceiling; the reported score does not
        assert!(best.raw_score > MAX_SCORE);
        assert_eq!(best.score, MAX_SCORE);
    }

    #[test]
    fn test_single_letter_first_name_ignored() {
        let roster = roster();
        let scorer = Scorer::new(&roster);
        let cell = ExtractedFields {
            first_name: "J".to_string(),
            ..fields("ALLEN")
        };
        let ranked = scorer.rank_candidates(&cell, 1, &UsedPlayerSet::new(), false);
        assert!(ranked.iter().all(|m| m.breakdown.firstname == 0.0));
    }

    #[test]
    fn test_zero_bye_is_no_evidence() {
        let roster = roster();
        let scorer = Scorer::new(&roster);
        let cell = ExtractedFields {
            bye: Some(0),
            ..fields("ALLEN")
        };
        let ranked = scorer.rank_candidates(&cell, 1, &UsedPlayerSet::new(), false);
        assert!(ranked.iter().all(|m| m.breakdown.bye == 0.0));
    }

    #[test]
    fn test_color_filter_is_strict() {
        let roster = roster();
        let scorer = Scorer::new(&roster);
        let cell = ExtractedFields {
            color_pos: Some(Position::RB),
            ..fields("JEFFERSON")
        };
        assert!(scorer.best_match(&cell, 2, &UsedPlayerSet::new()).is_none());

        let cell = ExtractedFields {
            color_pos: Some(Position::WR),
            ..fields("ALLEN")
        };
        let ranked = scorer.rank_candidates(&cell, 3, &UsedPlayerSet::new(), false);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|m| m.player.pos == Position::WR));
        assert_eq!(ranked[0].player.first, "KEENAN");
    }

    #[test]
    fn test_draft_prior_breaks_name_tie() {
        let roster = roster();
        let scorer = Scorer::new(&roster);
        // Same last name, no other evidence: the pick decides
        let early = scorer.best_match(&fields("ALLEN"), 1, &UsedPlayerSet::new()).unwrap();
        assert_eq!(early.player.first, "JOSH");
        let late = scorer.best_match(&fields("ALLEN"), 3, &UsedPlayerSet::new()).unwrap();
        assert_eq!(late.player.first, "KEENAN");
    }

    #[test]
    fn test_used_players_skipped_or_flagged() {
        let roster = roster();
        let scorer = Scorer::new(&roster);
        let mut used = UsedPlayerSet::new();
        used.insert(&roster.players()[0]);

        let best = scorer.best_match(&fields("ALLEN"), 1, &used).unwrap();
        assert_eq!(best.player.first, "KEENAN");

        let all = scorer.top_n(&fields("ALLEN"), 1, &used, 3, true);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].player.first, "JOSH");
        assert!(all[0].is_used);
        assert!(!all[1].is_used);
    }

    #[test]
    fn test_empty_last_name_has_no_candidates() {
        let roster = roster();
        let scorer = Scorer::new(&roster);
        let cell = ExtractedFields {
            first_name: "JOSH".to_string(),
            color_pos: Some(Position::QB),
            ..fields("  ")
        };
        assert!(scorer.best_match(&cell, 1, &UsedPlayerSet::new()).is_none());
        assert!(scorer.top_n(&cell, 1, &UsedPlayerSet::new(), 3, true).is_empty());
    }

    #[test]
    fn test_scores_stay_in_range() {
        let roster = roster();
        let scorer = Scorer::new(&roster);
        let cells = [
            fields("ZZZZ"),
            fields("RAVENS"),
            ExtractedFields {
                pos_text: "DST".to_string(),
                team_text: "BAL".to_string(),
                bye: Some(14),
                color_pos: Some(Position::DST),
                ..fields("BALTIMORE RAVENS")
            },
        ];
        for cell in &cells {
            for pick in [1, 5, 160] {
                for m in scorer.rank_candidates(cell, pick, &UsedPlayerSet::new(), true) {
                    assert!((0.0..=MAX_SCORE).contains(&m.score), "{:?}", m);
                }
            }
        }
    }
}
