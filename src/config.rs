//! Configuration types for board processing.
//!
//! Loads settings from a JSON file (explicit path or config.json next to the
//! executable). Every field has a default, so partial files are accepted.
//! The loaded value is passed by reference; there is no global instance.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A rectangle in relative coordinates (0.0 to 1.0).
/// Used for defining card sub-regions that scale with cell size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelativeRect {
    /// X position of top-left corner (0.0 = left edge, 1.0 = right edge)
    pub x: f32,
    /// Y position of top-left corner (0.0 = top edge, 1.0 = bottom edge)
    pub y: f32,
    /// Width as fraction of cell width
    pub width: f32,
    /// Height as fraction of cell height
    pub height: f32,
}

impl RelativeRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

impl Default for RelativeRect {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }
}

/// Sub-regions of a draft card read by the ROI strategy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiLayout {
    /// Position code, top-left corner
    pub pos: RelativeRect,
    /// "BYE n" label, top-right corner
    pub bye: RelativeRect,
    /// Last name, center band
    pub last_name: RelativeRect,
    /// Team abbreviation, bottom-left corner
    pub team: RelativeRect,
    /// First name, bottom-right corner
    pub first_name: RelativeRect,
}

impl Default for RoiLayout {
    fn default() -> Self {
        Self {
            pos: RelativeRect::new(0.0, 0.0, 0.35, 0.25),
            bye: RelativeRect::new(0.65, 0.0, 0.35, 0.25),
            last_name: RelativeRect::new(0.10, 0.30, 0.80, 0.40),
            team: RelativeRect::new(0.0, 0.75, 0.35, 0.25),
            first_name: RelativeRect::new(0.65, 0.75, 0.35, 0.25),
        }
    }
}

/// Where to find the Tesseract executable and its language data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesseractConfig {
    /// Explicit path to the executable; searched on PATH when unset
    pub executable: Option<PathBuf>,
    /// Passed as --tessdata-dir when set
    pub tessdata_dir: Option<PathBuf>,
    /// Language passed with -l
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "eng".to_string()
}

/// Complete board-processing configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Number of draft rounds (grid rows)
    pub rows: u32,
    /// Number of teams (grid columns)
    pub cols: u32,
    /// Minimum match score for a cell to use its roster match
    pub confidence_threshold: f64,
    /// Minimum last-name sub-score for an accepted match to consume its player
    pub used_lastname_min: f64,
    /// Color classifications at or below this confidence are discarded
    pub color_acceptance: f64,
    /// Pixels with saturation below this AND value above `white_value_min` are card background
    pub white_saturation_max: u8,
    pub white_value_min: u8,
    /// Cluster count for dominant-color extraction
    pub color_clusters: usize,
    /// Candidate suggestions kept per cell for manual correction
    pub top_candidates: usize,
    /// Extraction worker threads
    pub workers: usize,
    /// Extra erosion pass separating touching glyphs
    pub antimerge: bool,
    pub roi: RoiLayout,
    pub tesseract: TesseractConfig,
    pub log_level: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: 16,
            cols: 10,
            confidence_threshold: 45.0,
            used_lastname_min: 15.0,
            color_acceptance: 0.3,
            white_saturation_max: 40,
            white_value_min: 200,
            color_clusters: 2,
            top_candidates: 3,
            workers: 4,
            antimerge: false,
            roi: RoiLayout::default(),
            tesseract: TesseractConfig {
                language: default_language(),
                ..TesseractConfig::default()
            },
            log_level: "info".to_string(),
        }
    }
}

impl BoardConfig {
    /// Loads configuration from `path`, falling back to defaults when the
    /// file is missing or malformed. The fallback is logged.
    pub fn load(path: &Path) -> Self {
        log::info!("Looking for config at: {}", path.display());

        if !path.exists() {
            log::info!("{} not found. Using default config.", path.display());
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("Config loaded from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = BoardConfig::default();
        assert_eq!(config.rows, 16);
        assert_eq!(config.cols, 10);
        assert_eq!(config.confidence_threshold, 45.0);
        assert_eq!(config.tesseract.language, "eng");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "rows": 15, "cols": 12, "roi": { "pos": { "x": 0.0, "y": 0.0, "width": 0.3, "height": 0.2 } } }"#).unwrap();

        let config = BoardConfig::load(&path);
        assert_eq!(config.rows, 15);
        assert_eq!(config.cols, 12);
        assert_eq!(config.roi.pos.width, 0.3);
        // Untouched ROI entries and scalars keep their defaults
        assert_eq!(config.roi.bye, RoiLayout::default().bye);
        assert_eq!(config.used_lastname_min, 15.0);
        assert_eq!(config.tesseract.language, "eng");
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(BoardConfig::load(&path), BoardConfig::default());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempdir().unwrap();
        assert_eq!(
            BoardConfig::load(&dir.path().join("absent.json")),
            BoardConfig::default()
        );
    }
}
