//! Writing board results to the output directory.

use super::BoardReport;
use crate::grid::{crop_cell, partition};
use crate::paths;
use anyhow::{Context, Result};
use image::RgbImage;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the report inside the output directory.
pub const REPORT_FILE_NAME: &str = "board.json";

/// Export the report as pretty-printed JSON.
pub fn export_to_json(report: &BoardReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize board report to JSON")?;

    let mut file = File::create(output_path)
        .with_context(|| format!("Failed to create JSON file: {}", output_path.display()))?;

    file.write_all(json.as_bytes())
        .context("Failed to write JSON data")?;

    Ok(())
}

/// Writes `board.json` into `output_dir` and returns its path.
pub fn write_report(report: &BoardReport, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(REPORT_FILE_NAME);
    export_to_json(report, &path)?;
    log::info!("Report written to {}", path.display());
    Ok(path)
}

/// Saves the pixels of every unresolved cell as
/// `cells/cell_r{row}_c{col}.png` for manual review.
pub fn save_unresolved_cells(board: &RgbImage, report: &BoardReport, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = paths::cells_dir(output_dir);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create cells directory: {}", dir.display()))?;

    let regions = partition(board.width(), board.height(), report.rows, report.cols);
    let mut saved = Vec::new();
    for cell in report.unresolved() {
        let index = (cell.row * report.cols + cell.col) as usize;
        let Some(region) = regions.get(index).filter(|r| !r.is_empty()) else {
            continue;
        };
        let path = dir.join(format!("cell_r{}_c{}.png", cell.row, cell.col));
        crop_cell(board, region)
            .save(&path)
            .with_context(|| format!("Failed to save cell crop: {}", path.display()))?;
        saved.push(path);
    }

    log::info!("Saved {} unresolved cell crops to {}", saved.len(), dir.display());
    Ok(saved)
}
