//! Card color → position classification.
//!
//! Each draft card is printed on a position-specific background color.
//! The dominant non-white color of a cell is compared against calibrated
//! HSV boxes to recover the position independently of OCR.

pub mod hsv;
pub mod kmeans;
pub mod profile;

pub use hsv::{HsvColor, WhiteMask, dominant_nonwhite_hsv};
pub use profile::{ColorMatch, ColorProfile, ColorProfiles, HsvRange};

use image::RgbImage;

use crate::config::BoardConfig;
use crate::roster::Position;

/// Classifies one cell image by card color using the configured mask,
/// cluster count and acceptance threshold.
pub fn classify_cell(
    cell: &RgbImage,
    profiles: &ColorProfiles,
    config: &BoardConfig,
) -> Option<Position> {
    let mask = WhiteMask {
        saturation_max: config.white_saturation_max,
        value_min: config.white_value_min,
    };
    let color = dominant_nonwhite_hsv(cell, mask, config.color_clusters);
    let result = profiles.position_for(color, config.color_acceptance);
    log::debug!(
        "Cell color h={:.1} s={:.1} v={:.1} -> {:?}",
        color.h,
        color.s,
        color.v,
        result
    );
    result
}
