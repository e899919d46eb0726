//! Parallel per-cell extraction.
//!
//! OCR and color classification read nothing but the cell's own pixels,
//! so cells are spread over scoped worker threads. Results come back over
//! a channel tagged with their cell index and are reassembled in
//! traversal order; reconciliation afterwards is strictly sequential.

use image::RgbImage;
use std::sync::mpsc;
use std::thread;

use crate::color::{ColorProfiles, classify_cell};
use crate::config::BoardConfig;
use crate::grid::{CellRegion, crop_cell};
use crate::ocr::{ExtractedFields, OcrEngine, read_cell_roi, read_cell_whole};
use crate::reconcile::CellObservation;

/// Read-only inputs shared by every extraction worker.
#[derive(Clone, Copy)]
pub struct ExtractionContext<'a> {
    pub engine: &'a dyn OcrEngine,
    pub profiles: &'a ColorProfiles,
    pub config: &'a BoardConfig,
}

/// Reads one cell with both strategies and attaches its color position.
///
/// A strategy whose OCR call fails yields empty fields; the cell is still
/// reconciled on whatever else was read.
pub fn observe_cell(ctx: ExtractionContext<'_>, board: &RgbImage, region: &CellRegion) -> CellObservation {
    let mut observation = CellObservation {
        row: region.row,
        col: region.col,
        ..CellObservation::default()
    };
    if region.is_empty() {
        log::debug!("Cell ({}, {}) is degenerate, skipping", region.row, region.col);
        return observation;
    }

    let cell = crop_cell(board, region);
    let color = classify_cell(&cell, ctx.profiles, ctx.config);

    let roi = read_cell_roi(ctx.engine, &cell, &ctx.config.roi, ctx.config.antimerge)
        .unwrap_or_else(|e| {
            log::warn!("ROI OCR failed for cell ({}, {}): {:#}", region.row, region.col, e);
            ExtractedFields::default()
        });
    let whole = read_cell_whole(ctx.engine, &cell, ctx.config.antimerge).unwrap_or_else(|e| {
        log::warn!("Whole-cell OCR failed for cell ({}, {}): {:#}", region.row, region.col, e);
        ExtractedFields::default()
    });

    observation.roi = roi.with_color(color);
    observation.whole = whole.with_color(color);
    observation
}

/// Extracts every cell on up to `workers` threads. Output order matches
/// `regions`.
pub fn extract_cells(
    ctx: ExtractionContext<'_>,
    board: &RgbImage,
    regions: &[CellRegion],
    workers: usize,
) -> Vec<CellObservation> {
    let workers = workers.clamp(1, regions.len().max(1));
    log::info!("Extracting {} cells on {} workers", regions.len(), workers);

    let (sender, receiver) = mpsc::channel::<(usize, CellObservation)>();
    thread::scope(|scope| {
        for worker in 0..workers {
            let sender = sender.clone();
            scope.spawn(move || {
                for (index, region) in regions.iter().enumerate().skip(worker).step_by(workers) {
                    let observation = observe_cell(ctx, board, region);
                    if sender.send((index, observation)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(sender);

    let mut slots: Vec<Option<CellObservation>> = vec![None; regions.len()];
    for (index, observation) in receiver {
        slots[index] = Some(observation);
    }

    slots
        .into_iter()
        .zip(regions)
        .map(|(slot, region)| {
            slot.unwrap_or_else(|| CellObservation {
                row: region.row,
                col: region.col,
                ..CellObservation::default()
            })
        })
        .collect()
}
