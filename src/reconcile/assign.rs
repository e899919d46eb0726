//! Greedy board-wide assignment.
//!
//! Cells are reconciled one at a time in row-major order. An accepted
//! match consumes its roster entry, so earlier cells win contested
//! players. There is no backtracking.

use serde::Serialize;
use std::collections::HashSet;

use super::scorer::{ScoredMatch, Scorer};
use crate::draft::grid_to_draft_pick;
use crate::ocr::ExtractedFields;
use crate::roster::{Player, PlayerId, Position, normalize_team};

/// Roster identities already claimed during one board pass.
#[derive(Clone, Debug, Default)]
pub struct UsedPlayerSet {
    ids: HashSet<PlayerId>,
}

impl UsedPlayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, player: &Player) -> bool {
        self.ids.contains(&player.id())
    }

    /// Returns false if the player was already claimed.
    pub fn insert(&mut self, player: &Player) -> bool {
        self.ids.insert(player.id())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// The ways a cell's text is presented to the scorer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionVariant {
    Roi,
    WholeCell,
    /// Whole-cell reading with first and last name exchanged
    WholeCellSwapped,
}

impl ExtractionVariant {
    /// Evaluation order. Earlier variants win ties.
    pub const ALL: [ExtractionVariant; 3] = [
        ExtractionVariant::Roi,
        ExtractionVariant::WholeCell,
        ExtractionVariant::WholeCellSwapped,
    ];
}

/// Both strategy readings of one cell, color already attached.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CellObservation {
    pub row: u32,
    pub col: u32,
    pub roi: ExtractedFields,
    pub whole: ExtractedFields,
}

impl CellObservation {
    pub fn fields(&self, variant: ExtractionVariant) -> ExtractedFields {
        match variant {
            ExtractionVariant::Roi => self.roi.clone(),
            ExtractionVariant::WholeCell => self.whole.clone(),
            ExtractionVariant::WholeCellSwapped => self.whole.swapped(),
        }
    }
}

/// Best score reached by one variant (0 when it had no candidate).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct VariantScore {
    pub variant: ExtractionVariant,
    pub score: f64,
}

/// Reconciled output for one cell.
///
/// When `use_match` is false the name, team, position and bye fields carry
/// the raw OCR reading instead of a roster entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellResult {
    pub row: u32,
    pub col: u32,
    /// 1-based snake-draft pick, 0 for a cell outside the board
    pub pick: u32,
    pub first: String,
    pub last: String,
    pub team: Option<String>,
    pub pos: Option<Position>,
    pub bye: Option<u32>,
    pub is_team_defense: bool,
    pub match_score: f64,
    pub use_match: bool,
    /// Best roster candidate, accepted or not
    pub best_candidate: Option<ScoredMatch>,
    pub variant: ExtractionVariant,
    pub variant_scores: Vec<VariantScore>,
    /// Fields of the chosen variant
    pub raw: ExtractedFields,
    pub raw_roi: ExtractedFields,
    pub raw_whole: ExtractedFields,
    /// Top candidates, used ones included, for manual correction
    pub suggestions: Vec<ScoredMatch>,
}

impl CellResult {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first, self.last).trim().to_string()
    }

    /// Overwrites the cell with a roster entry.
    pub fn apply_player(&mut self, player: &Player, score: f64) {
        self.first = player.first.clone();
        self.last = player.last.clone();
        self.team = Some(player.team.clone());
        self.pos = Some(player.pos);
        self.bye = Some(player.bye);
        self.is_team_defense = player.is_team_defense;
        self.match_score = score;
        self.use_match = true;
    }
}

/// Acceptance thresholds for the assignment loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AssignmentRules {
    /// Minimum score to accept a match
    pub confidence_threshold: f64,
    /// Minimum last-name points for an accepted match to consume its player
    pub used_lastname_min: f64,
    /// Suggestions kept per cell
    pub top_candidates: usize,
}

impl Default for AssignmentRules {
    fn default() -> Self {
        Self {
            confidence_threshold: 45.0,
            used_lastname_min: 15.0,
            top_candidates: 3,
        }
    }
}

/// Owns the used-player set for one board pass.
pub struct Assigner<'a> {
    scorer: Scorer<'a>,
    rules: AssignmentRules,
    cols: u32,
    used: UsedPlayerSet,
}

impl<'a> Assigner<'a> {
    pub fn new(scorer: Scorer<'a>, rules: AssignmentRules, cols: u32) -> Self {
        Self {
            scorer,
            rules,
            cols,
            used: UsedPlayerSet::new(),
        }
    }

    pub fn used(&self) -> &UsedPlayerSet {
        &self.used
    }

    /// Reconciles one cell and, if accepted, claims its player.
    ///
    /// Must be called in traversal order: the result depends on every
    /// earlier acceptance.
    pub fn assign(&mut self, cell: &CellObservation) -> CellResult {
        let pick = grid_to_draft_pick(cell.row, cell.col, self.cols).unwrap_or_else(|| {
            log::warn!(
                "Cell ({}, {}) lies outside a {}-column board; no pick number",
                cell.row,
                cell.col,
                self.cols
            );
            0
        });

        let mut variant_scores = Vec::with_capacity(ExtractionVariant::ALL.len());
        let mut chosen: Option<(ExtractionVariant, Option<ScoredMatch>)> = None;
        // Compared unclamped: two variants can both reach the reported cap
        let mut chosen_raw = f64::NEG_INFINITY;
        for variant in ExtractionVariant::ALL {
            let best = self
                .scorer
                .best_match(&cell.fields(variant), pick, &self.used);
            let score = best.as_ref().map_or(0.0, |m| m.score);
            let raw = best.as_ref().map_or(0.0, |m| m.raw_score);
            variant_scores.push(VariantScore { variant, score });
            if raw > chosen_raw {
                chosen_raw = raw;
                chosen = Some((variant, best));
            }
        }
        let (variant, best) = chosen.unwrap_or((ExtractionVariant::Roi, None));
        let raw = cell.fields(variant);

        let suggestions = self.scorer.top_n(
            &raw,
            pick,
            &self.used,
            self.rules.top_candidates,
            true,
        );

        let match_score = best.as_ref().map_or(0.0, |m| m.score);
        let use_match = best.is_some() && match_score >= self.rules.confidence_threshold;

        let mut result = CellResult {
            row: cell.row,
            col: cell.col,
            pick,
            first: raw.first_name.clone(),
            last: raw.last_name.clone(),
            team: normalize_team(&raw.team_text),
            pos: raw.color_pos.or_else(|| Position::from_ocr(&raw.pos_text)),
            bye: raw.bye,
            is_team_defense: false,
            match_score,
            use_match: false,
            best_candidate: best.clone(),
            variant,
            variant_scores,
            raw,
            raw_roi: cell.roi.clone(),
            raw_whole: cell.whole.clone(),
            suggestions,
        };
        result.is_team_defense = result.pos == Some(Position::DST);

        match best {
            Some(m) if use_match => {
                result.apply_player(&m.player, match_score);
                if m.breakdown.lastname >= self.rules.used_lastname_min {
                    self.used.insert(&m.player);
                    log::debug!(
                        "Pick {} ({}, {}): {} claimed ({:.1})",
                        pick,
                        cell.row,
                        cell.col,
                        m.player.full_name(),
                        match_score
                    );
                } else {
                    log::debug!(
                        "Pick {}: {} accepted on weak name evidence; not claimed",
                        pick,
                        m.player.full_name()
                    );
                }
            }
            _ => {
                log::debug!(
                    "Pick {} ({}, {}): unresolved, best score {:.1}",
                    pick,
                    cell.row,
                    cell.col,
                    match_score
                );
            }
        }

        result
    }
}

/// Reconciles a whole board in the order given. Callers pass cells in
/// row-major, column-ascending order.
pub fn assign_board(
    scorer: Scorer<'_>,
    rules: AssignmentRules,
    cols: u32,
    cells: &[CellObservation],
) -> Vec<CellResult> {
    let mut assigner = Assigner::new(scorer, rules, cols);
    cells.iter().map(|cell| assigner.assign(cell)).collect()
}
