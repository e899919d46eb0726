//! Calibrated HSV boxes per position, and classification against them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::hsv::HsvColor;
use crate::roster::Position;

/// Full hue circle on the half-degree scale.
const HUE_CIRCLE: f64 = 180.0;

/// One HSV bounding box. When `lower.h > upper.h` the hue range wraps
/// through 0 (reds sit on both ends of the hue axis).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HsvRange {
    pub lower: [f32; 3],
    pub upper: [f32; 3],
}

impl HsvRange {
    pub const fn new(lower: [f32; 3], upper: [f32; 3]) -> Self {
        Self { lower, upper }
    }

    fn wraps(&self) -> bool {
        self.lower[0] > self.upper[0]
    }

    pub fn contains(&self, c: HsvColor) -> bool {
        let [lh, ls, lv] = self.lower;
        let [uh, us, uv] = self.upper;
        let hue_ok = if self.wraps() {
            c.h >= lh || c.h <= uh
        } else {
            lh <= c.h && c.h <= uh
        };
        hue_ok && ls <= c.s && c.s <= us && lv <= c.v && c.v <= uv
    }

    /// 1.0 at the box center, falling off with normalized distance.
    pub fn fit(&self, c: HsvColor) -> f64 {
        let [lh, ls, lv] = self.lower.map(f64::from);
        let [uh, us, uv] = self.upper.map(f64::from);
        let (h, s, v) = (c.h as f64, c.s as f64, c.v as f64);

        let h_center = if self.wraps() {
            ((lh + uh + HUE_CIRCLE) % (2.0 * HUE_CIRCLE)) / 2.0
        } else {
            (lh + uh) / 2.0
        };
        let s_center = (ls + us) / 2.0;
        let v_center = (lv + uv) / 2.0;

        let h_dist = (h - h_center)
            .abs()
            .min((h - h_center + HUE_CIRCLE).abs())
            .min((h - h_center - HUE_CIRCLE).abs());
        let h_norm = h_dist / (HUE_CIRCLE / 2.0);
        let s_norm = (s - s_center).abs() / 255.0;
        let v_norm = (v - v_center).abs() / 255.0;

        (1.0 - (h_norm + s_norm + v_norm) / 3.0).max(0.0)
    }
}

/// All boxes calibrated for one position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorProfile {
    pub position: Position,
    pub ranges: Vec<HsvRange>,
    /// Multiplier applied to every fit from this profile
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    1.0
}

/// Per-position (hue, saturation, value) tolerance around a picked sample.
fn sample_tolerance(position: Position) -> (f32, f32, f32) {
    match position {
        Position::QB => (20.0, 50.0, 50.0),
        Position::RB => (25.0, 60.0, 60.0),
        Position::WR => (15.0, 35.0, 35.0),
        Position::TE => (20.0, 45.0, 45.0),
        Position::K => (15.0, 30.0, 30.0),
        Position::DST => (15.0, 40.0, 40.0),
    }
}

impl ColorProfile {
    /// Builds a single-box profile around one sampled card color.
    pub fn from_sample(position: Position, sample: HsvColor) -> Self {
        let (ht, st, vt) = sample_tolerance(position);
        let range = HsvRange::new(
            [
                (sample.h - ht).max(0.0),
                (sample.s - st).max(0.0),
                (sample.v - vt).max(0.0),
            ],
            [
                (sample.h + ht).min(HUE_CIRCLE as f32),
                (sample.s + st).min(255.0),
                (sample.v + vt).min(255.0),
            ],
        );
        Self {
            position,
            ranges: vec![range],
            confidence: 1.0,
        }
    }
}

/// Result of classifying a color.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorMatch {
    pub position: Position,
    pub confidence: f64,
}

/// Ordered profile table. Order is registration order and breaks ties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorProfiles {
    profiles: Vec<ColorProfile>,
}

impl ColorProfiles {
    pub fn new(profiles: Vec<ColorProfile>) -> Self {
        Self { profiles }
    }

    /// Uncalibrated defaults: orange QB, brown RB, blue WR, red TE,
    /// grey K, green DST. Red straddles the hue seam and is split in two.
    pub fn builtin() -> Self {
        let profile = |position, ranges: &[([f32; 3], [f32; 3])]| ColorProfile {
            position,
            ranges: ranges
                .iter()
                .map(|&(lower, upper)| HsvRange::new(lower, upper))
                .collect(),
            confidence: 1.0,
        };
        Self::new(vec![
            profile(
                Position::QB,
                &[([10.0, 100.0, 100.0], [25.0, 255.0, 255.0]), ([0.0, 100.0, 100.0], [10.0, 255.0, 255.0])],
            ),
            profile(
                Position::RB,
                &[([0.0, 50.0, 50.0], [20.0, 255.0, 200.0]), ([10.0, 50.0, 50.0], [25.0, 255.0, 200.0])],
            ),
            profile(
                Position::WR,
                &[([100.0, 100.0, 100.0], [130.0, 255.0, 255.0]), ([110.0, 100.0, 100.0], [140.0, 255.0, 255.0])],
            ),
            profile(
                Position::TE,
                &[([0.0, 100.0, 100.0], [10.0, 255.0, 255.0]), ([170.0, 100.0, 100.0], [180.0, 255.0, 255.0])],
            ),
            profile(
                Position::K,
                &[([0.0, 0.0, 100.0], [180.0, 50.0, 200.0]), ([0.0, 0.0, 50.0], [180.0, 30.0, 150.0])],
            ),
            profile(
                Position::DST,
                &[([35.0, 100.0, 100.0], [85.0, 255.0, 255.0]), ([40.0, 100.0, 100.0], [80.0, 255.0, 255.0])],
            ),
        ])
    }

    /// Loads profiles from a JSON list.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read color profiles: {}", path.display()))?;
        let profiles: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse color profiles: {}", path.display()))?;
        log::info!(
            "Loaded {} color profiles from {}",
            profiles.profiles.len(),
            path.display()
        );
        Ok(profiles)
    }

    pub fn profiles(&self) -> &[ColorProfile] {
        &self.profiles
    }

    /// Best-fitting position among boxes that contain the color.
    pub fn classify(&self, color: HsvColor) -> Option<ColorMatch> {
        let mut best: Option<ColorMatch> = None;
        for profile in &self.profiles {
            for range in profile.ranges.iter().filter(|r| r.contains(color)) {
                let confidence = range.fit(color) * profile.confidence;
                if best.is_none_or(|b| confidence > b.confidence) {
                    best = Some(ColorMatch {
                        position: profile.position,
                        confidence,
                    });
                }
            }
        }
        best
    }

    /// Position whose confidence exceeds `acceptance`, otherwise unknown.
    pub fn position_for(&self, color: HsvColor, acceptance: f64) -> Option<Position> {
        self.classify(color)
            .filter(|m| m.confidence > acceptance)
            .map(|m| m.position)
    }
}
