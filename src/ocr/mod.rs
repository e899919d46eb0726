pub mod engine;
pub mod extract;
pub mod preprocess;
pub mod setup;

pub use engine::{OcrEngine, OcrLine, OcrWord, PageSegMode, TesseractEngine};
pub use extract::{ExtractedFields, read_cell_roi, read_cell_whole};
pub use preprocess::neutral_otsu;
pub use setup::{TesseractPaths, locate_tesseract};

use anyhow::Result;

use crate::config::TesseractConfig;

/// Locates Tesseract and builds an engine for the configured language.
pub fn tesseract_engine(config: &TesseractConfig) -> Result<TesseractEngine> {
    let paths = locate_tesseract(config)?;
    Ok(TesseractEngine::new(paths, &config.language))
}
