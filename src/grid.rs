//! Splits a rectified board image into a rows × cols grid of cells.

use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Pixel rectangle of one grid cell. Rows and columns are 0-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRegion {
    pub row: u32,
    pub col: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CellRegion {
    /// True when the cell has no pixels (more rows/cols than image extent).
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Computes `count + 1` boundaries covering `[0, extent]`.
///
/// `boundary[i] = round(i * extent / count)` with halves going to even, and the first and last
/// boundaries pinned to 0 and `extent`.
pub fn boundaries(extent: u32, count: u32) -> Vec<u32> {
    if count == 0 {
        return vec![0, extent];
    }
    let mut bounds: Vec<u32> = (0..=count)
        .map(|i| (i as f64 * extent as f64 / count as f64).round_ties_even() as u32)
        .collect();
    bounds[0] = 0;
    bounds[count as usize] = extent;
    bounds
}

/// Partitions a `width` × `height` board into `rows` × `cols` cells in
/// row-major order (row ascending, then column ascending).
pub fn partition(width: u32, height: u32, rows: u32, cols: u32) -> Vec<CellRegion> {
    if rows == 0 || cols == 0 {
        return Vec::new();
    }
    let row_bounds = boundaries(height, rows);
    let col_bounds = boundaries(width, cols);

    let mut cells = Vec::with_capacity(rows as usize * cols as usize);
    for r in 0..rows as usize {
        let (y0, y1) = (row_bounds[r], row_bounds[r + 1]);
        for c in 0..cols as usize {
            let (x0, x1) = (col_bounds[c], col_bounds[c + 1]);
            cells.push(CellRegion {
                row: r as u32,
                col: c as u32,
                x: x0,
                y: y0,
                width: x1.saturating_sub(x0),
                height: y1.saturating_sub(y0),
            });
        }
    }
    cells
}

/// Copies a cell's pixels out of the board.
pub fn crop_cell(board: &RgbImage, cell: &CellRegion) -> RgbImage {
    image::imageops::crop_imm(board, cell.x, cell.y, cell.width, cell.height).to_image()
}
