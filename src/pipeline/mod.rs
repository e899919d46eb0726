//! End-to-end board processing.
//!
//! This module provides:
//! - Board image loading
//! - Parallel cell extraction followed by sequential reconciliation
//! - The board report with manual-correction support
//! - JSON export and unresolved-cell crops

pub mod export;
pub mod worker;

pub use export::{REPORT_FILE_NAME, export_to_json, save_unresolved_cells, write_report};
pub use worker::{ExtractionContext, extract_cells, observe_cell};

use anyhow::{Context, Result, bail};
use image::RgbImage;
use serde::Serialize;
use std::path::Path;

use crate::color::ColorProfiles;
use crate::config::BoardConfig;
use crate::grid::partition;
use crate::ocr::OcrEngine;
use crate::reconcile::{AssignmentRules, CellObservation, CellResult, Scorer, assign_board};
use crate::roster::{Player, Roster};

/// Picks whose candidate breakdowns are logged at debug level.
const DETAILED_PICKS: u32 = 25;

/// Opens and decodes a board screenshot.
pub fn load_board(path: &Path) -> Result<RgbImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to open board image: {}", path.display()))?;
    Ok(image.to_rgb8())
}

/// Counts over one processed board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BoardSummary {
    pub total: usize,
    pub accepted: usize,
    pub unresolved: usize,
}

/// Reconciled board in row-major traversal order.
#[derive(Clone, Debug, Serialize)]
pub struct BoardReport {
    pub rows: u32,
    pub cols: u32,
    pub summary: BoardSummary,
    pub cells: Vec<CellResult>,
}

impl BoardReport {
    pub fn new(rows: u32, cols: u32, cells: Vec<CellResult>) -> Self {
        let mut report = Self {
            rows,
            cols,
            summary: BoardSummary::default(),
            cells,
        };
        report.refresh_summary();
        report
    }

    fn refresh_summary(&mut self) {
        let accepted = self.cells.iter().filter(|c| c.use_match).count();
        self.summary = BoardSummary {
            total: self.cells.len(),
            accepted,
            unresolved: self.cells.len() - accepted,
        };
    }

    /// Cells that did not reach the confidence threshold.
    pub fn unresolved(&self) -> impl Iterator<Item = &CellResult> {
        self.cells.iter().filter(|c| !c.use_match)
    }

    /// Replaces cell `index` with a manually chosen roster entry.
    pub fn apply_correction(&mut self, index: usize, player: &Player) -> Result<()> {
        let id = player.id();
        let duplicate = self
            .cells
            .iter()
            .enumerate()
            .find(|(i, c)| {
                *i != index
                    && c.use_match
                    && c.first == id.first
                    && c.last == id.last
                    && c.team.as_deref() == Some(id.team.as_str())
            })
            .map(|(_, c)| c.pick);

        let Some(cell) = self.cells.get_mut(index) else {
            bail!("Cell index {} out of range ({} cells)", index, self.cells.len());
        };
        if let Some(pick) = duplicate {
            log::warn!(
                "{} is already assigned to pick {}; correcting pick {} anyway",
                player.full_name(),
                pick,
                cell.pick
            );
        }
        cell.apply_player(player, 100.0);
        log::info!("Pick {} corrected to {}", cell.pick, player.full_name());
        self.refresh_summary();
        Ok(())
    }
}

fn log_candidates(cell: &CellResult) {
    if cell.pick > DETAILED_PICKS || !log::log_enabled!(log::Level::Debug) {
        return;
    }
    log::debug!(
        "Pick {} ({}, {}) via {:?}: '{}' / '{}'",
        cell.pick,
        cell.row,
        cell.col,
        cell.variant,
        cell.raw.first_name,
        cell.raw.last_name
    );
    for (i, m) in cell.suggestions.iter().enumerate() {
        let b = &m.breakdown;
        log::debug!(
            "  {}. {} [{}] {:.1} (last {:.1} first {:.1} team {:.0} bye {:.0} color {:.0} pos {:.0} draft {:.1}){}",
            i + 1,
            m.player.full_name(),
            m.player.pos,
            m.score,
            b.lastname,
            b.firstname,
            b.team,
            b.bye,
            b.color_pos,
            b.ocr_pos,
            b.draft_likelihood,
            if m.is_used { " used" } else { "" }
        );
    }
}

/// Runs the sequential assignment loop over already-extracted cells.
pub fn reconcile_observations(
    observations: &[CellObservation],
    roster: &Roster,
    config: &BoardConfig,
) -> BoardReport {
    let rules = AssignmentRules {
        confidence_threshold: config.confidence_threshold,
        used_lastname_min: config.used_lastname_min,
        top_candidates: config.top_candidates,
    };
    let cells = assign_board(Scorer::new(roster), rules, config.cols, observations);
    cells.iter().for_each(log_candidates);
    BoardReport::new(config.rows, config.cols, cells)
}

/// Partitions, extracts and reconciles a whole board.
pub fn process_board(
    board: &RgbImage,
    roster: &Roster,
    profiles: &ColorProfiles,
    engine: &dyn OcrEngine,
    config: &BoardConfig,
) -> Result<BoardReport> {
    if config.rows == 0 || config.cols == 0 {
        bail!("Board grid must have at least one row and column ({}x{})", config.rows, config.cols);
    }
    log::info!(
        "Processing {}x{} board ({}x{} px) against {} players",
        config.rows,
        config.cols,
        board.width(),
        board.height(),
        roster.len()
    );

    let regions = partition(board.width(), board.height(), config.rows, config.cols);
    let ctx = ExtractionContext {
        engine,
        profiles,
        config,
    };
    let observations = extract_cells(ctx, board, &regions, config.workers);
    let report = reconcile_observations(&observations, roster, config);

    log::info!(
        "Board done: {} of {} cells matched, {} need review",
        report.summary.accepted,
        report.summary.total,
        report.summary.unresolved
    );
    Ok(report)
}
