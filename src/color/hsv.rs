use image::{Rgb, RgbImage};
use palette::{FromColor, Hsv, Srgb};
use serde::{Deserialize, Serialize};

use super::kmeans::dominant_center;

/// HSV color on the half-degree scale: hue 0–180, saturation and value 0–255.
///
/// This is the scale calibrated profiles are written in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HsvColor {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl HsvColor {
    pub const fn new(h: f32, s: f32, v: f32) -> Self {
        Self { h, s, v }
    }

    pub fn from_rgb(pixel: &Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        let hsv: Hsv = Hsv::from_color(Srgb::new(r, g, b).into_format::<f32>());
        Self {
            h: hsv.hue.into_positive_degrees() / 2.0,
            s: hsv.saturation * 255.0,
            v: hsv.value * 255.0,
        }
    }

    fn to_array(self) -> [f32; 3] {
        [self.h, self.s, self.v]
    }

    fn from_array(a: [f32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }
}

/// Thresholds separating card background (near-white) from card color.
#[derive(Clone, Copy, Debug)]
pub struct WhiteMask {
    /// Below this saturation...
    pub saturation_max: u8,
    /// ...and above this value, a pixel counts as background.
    pub value_min: u8,
}

impl WhiteMask {
    fn is_background(&self, c: &HsvColor) -> bool {
        c.s < self.saturation_max as f32 && c.v > self.value_min as f32
    }
}

impl Default for WhiteMask {
    fn default() -> Self {
        Self {
            saturation_max: 40,
            value_min: 200,
        }
    }
}

/// Dominant non-background color of a card.
///
/// Near-white pixels are masked out and the rest clustered into `k`
/// groups; the centroid of the largest group is returned. A card with
/// no colored pixels yields the black sentinel (0, 0, 0).
pub fn dominant_nonwhite_hsv(cell: &RgbImage, mask: WhiteMask, k: usize) -> HsvColor {
    let points: Vec<[f32; 3]> = cell
        .pixels()
        .map(HsvColor::from_rgb)
        .filter(|c| !mask.is_background(c))
        .map(HsvColor::to_array)
        .collect();

    dominant_center(&points, k)
        .map(HsvColor::from_array)
        .unwrap_or_default()
}
