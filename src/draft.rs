//! Snake-draft pick numbering and the rank/pick likelihood prior.

/// Converts a grid position to a 1-based overall pick number.
///
/// Even rows run left to right, odd rows right to left. Returns None when
/// `col` is outside a `cols`-wide board (including `cols == 0`).
pub fn grid_to_draft_pick(row: u32, col: u32, cols: u32) -> Option<u32> {
    if col >= cols {
        return None;
    }
    let base_pick = row.checked_mul(cols)?.checked_add(1)?;
    if row % 2 == 0 {
        base_pick.checked_add(col)
    } else {
        base_pick.checked_add(cols - 1 - col)
    }
}

/// Converts a 1-based pick number back to its (row, col) grid position.
///
/// Returns None for pick 0 or a board with no columns.
pub fn draft_pick_to_grid(pick: u32, cols: u32) -> Option<(u32, u32)> {
    if pick == 0 || cols == 0 {
        return None;
    }
    let row = (pick - 1) / cols;
    let col_in_row = (pick - 1) % cols;
    if row % 2 == 0 {
        Some((row, col_in_row))
    } else {
        Some((row, cols - 1 - col_in_row))
    }
}

/// Spread of the prior at rank 0; grows by `SIGMA_PER_RANK` per rank.
const SIGMA_BASE: f64 = 2.0;
const SIGMA_PER_RANK: f64 = 0.1;

/// Likelihood (0–100) that the player ranked `player_rank` goes at `draft_pick`.
///
/// Gaussian centred on the rank with `sigma = 2.0 + 0.1 * rank`, so top
/// players must land close to their rank while late ones may drift.
pub fn draft_likelihood(player_rank: u32, draft_pick: u32) -> f64 {
    let rank = player_rank.max(1) as f64;
    let sigma = SIGMA_BASE + SIGMA_PER_RANK * rank;
    let z = (draft_pick as f64 - rank) / sigma;
    100.0 * (-0.5 * z * z).exp()
}
