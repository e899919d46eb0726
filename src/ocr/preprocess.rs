//! Same-size OCR enhancement for draft-card crops.
//!
//! Cards print white text on a saturated background. The pipeline below
//! turns that into solid black glyphs on white without resizing:
//! grayscale → CLAHE → blur → unsharp → Otsu (inverted) → opening
//! → optional erosion.

use image::{GrayImage, Luma, RgbImage, imageops};

use crate::config::RelativeRect;

/// CLAHE clip limit (OpenCV convention: multiple of the mean bin height).
const CLAHE_CLIP_LIMIT: f32 = 2.2;
/// CLAHE tiles per axis.
const CLAHE_GRID: u32 = 20;
/// Sigma equivalent to a 3×3 Gaussian kernel.
const BLUR_SIGMA: f32 = 0.8;
const SHARPEN_AMOUNT: f32 = 1.3;

/// Crops a sub-region from a cell image using relative coordinates.
///
/// Converts the relative rect (0.0–1.0) to absolute pixel coordinates,
/// clamps to image bounds, and returns the cropped sub-image.
pub fn crop_region(img: &RgbImage, region: &RelativeRect) -> RgbImage {
    let (w, h) = img.dimensions();

    let x0 = ((region.x * w as f32) as u32).min(w);
    let y0 = ((region.y * h as f32) as u32).min(h);
    let rw = ((region.width * w as f32) as u32).min(w - x0);
    let rh = ((region.height * h as f32) as u32).min(h - y0);

    imageops::crop_imm(img, x0, y0, rw, rh).to_image()
}

/// Reflects an out-of-range index back into `0..n` without repeating the edge.
fn reflect101(i: u32, n: u32) -> u32 {
    if n <= 1 {
        return 0;
    }
    let period = 2 * n - 2;
    let i = i % period;
    if i >= n { period - i } else { i }
}

/// Contrast-limited adaptive histogram equalization.
///
/// The image is split into `grid × grid` tiles (padded by reflection when
/// the size is not a multiple); each tile gets a clipped equalization
/// table, and pixels blend the four nearest tables bilinearly.
pub fn clahe(img: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 || grid == 0 {
        return img.clone();
    }

    let tile_w = w.div_ceil(grid);
    let tile_h = h.div_ceil(grid);
    let tile_area = (tile_w * tile_h) as f32;
    let clip = ((clip_limit * tile_area / 256.0) as u32).max(1);
    let scale = 255.0 / tile_area;

    let mut luts = vec![[0u8; 256]; (grid * grid) as usize];
    for ty in 0..grid {
        for tx in 0..grid {
            let mut hist = [0u32; 256];
            for py in ty * tile_h..(ty + 1) * tile_h {
                for px in tx * tile_w..(tx + 1) * tile_w {
                    let v = img.get_pixel(reflect101(px, w), reflect101(py, h))[0];
                    hist[v as usize] += 1;
                }
            }

            let mut excess = 0u32;
            for bin in hist.iter_mut() {
                if *bin > clip {
                    excess += *bin - clip;
                    *bin = clip;
                }
            }
            let batch = excess / 256;
            let mut residual = excess % 256;
            for bin in hist.iter_mut() {
                *bin += batch;
            }
            if residual > 0 {
                let step = (256 / residual as usize).max(1);
                for bin in hist.iter_mut().step_by(step) {
                    if residual == 0 {
                        break;
                    }
                    *bin += 1;
                    residual -= 1;
                }
            }

            let lut = &mut luts[(ty * grid + tx) as usize];
            let mut sum = 0u32;
            for (entry, &count) in lut.iter_mut().zip(hist.iter()) {
                sum += count;
                *entry = (sum as f32 * scale).round().min(255.0) as u8;
            }
        }
    }

    // Tile index pair and blend weight toward the second tile
    let neighbours = |pos: u32, tile: u32| -> (usize, usize, f32) {
        let f = pos as f32 / tile as f32 - 0.5;
        let lo = f.floor();
        let weight = f - lo;
        let lo = lo as i64;
        let first = lo.max(0) as usize;
        let second = ((lo + 1) as usize).min(grid as usize - 1);
        (first, second, weight)
    };

    let mut out = GrayImage::new(w, h);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let v = img.get_pixel(x, y)[0] as usize;
        let (x1, x2, xa) = neighbours(x, tile_w);
        let (y1, y2, ya) = neighbours(y, tile_h);
        let row = |ty: usize| {
            let base = ty * grid as usize;
            luts[base + x1][v] as f32 * (1.0 - xa) + luts[base + x2][v] as f32 * xa
        };
        let blended = row(y1) * (1.0 - ya) + row(y2) * ya;
        *pixel = Luma([blended.round().clamp(0.0, 255.0) as u8]);
    }
    out
}

/// Unsharp mask: `amount * img - (amount - 1) * blurred`, saturated to u8.
fn sharpen(img: &GrayImage, blurred: &GrayImage, amount: f32) -> GrayImage {
    let mut out = GrayImage::new(img.width(), img.height());
    for ((dst, src), blur) in out.pixels_mut().zip(img.pixels()).zip(blurred.pixels()) {
        let value = amount * src[0] as f32 - (amount - 1.0) * blur[0] as f32;
        *dst = Luma([value.round().clamp(0.0, 255.0) as u8]);
    }
    out
}

/// Otsu's method: the threshold maximizing between-class variance.
pub fn otsu_threshold(pixels: &[u8]) -> u8 {
    let mut histogram = [0u32; 256];
    for &value in pixels {
        histogram[value as usize] += 1;
    }

    let total_pixels = pixels.len() as f64;
    let mut sum_total = 0f64;
    for (value, &count) in histogram.iter().enumerate() {
        sum_total += value as f64 * count as f64;
    }

    let mut sum_background = 0f64;
    let mut weight_background = 0f64;
    let mut max_variance = f64::MIN;
    let mut threshold = 0u8;

    for (value, &count) in histogram.iter().enumerate() {
        weight_background += count as f64;
        if weight_background == 0.0 {
            continue;
        }

        let weight_foreground = total_pixels - weight_background;
        if weight_foreground == 0.0 {
            break;
        }

        sum_background += value as f64 * count as f64;

        let mean_background = sum_background / weight_background;
        let mean_foreground = (sum_total - sum_background) / weight_foreground;
        let variance =
            weight_background * weight_foreground * (mean_background - mean_foreground).powi(2);

        if variance > max_variance {
            max_variance = variance;
            threshold = value as u8;
        }
    }

    threshold
}

/// Pixels brighter than `threshold` become black (0), the rest white (255).
fn binarize_inverted(img: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        pixel[0] = if pixel[0] > threshold { 0 } else { 255 };
    }
    out
}

/// Folds `pick` over the 2×2 square spanning the pixel and its neighbours
/// `offset` (-1 or +1) away on each axis. Out-of-bounds neighbours are
/// skipped.
fn morph_2x2(img: &GrayImage, offset: i64, pick: fn(u8, u8) -> u8) -> GrayImage {
    let (w, h) = img.dimensions();
    let mut out = GrayImage::new(w, h);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let mut acc = img.get_pixel(x, y)[0];
        for (dx, dy) in [(offset, 0), (0, offset), (offset, offset)] {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx >= 0 && ny >= 0 && nx < w as i64 && ny < h as i64 {
                acc = pick(acc, img.get_pixel(nx as u32, ny as u32)[0]);
            }
        }
        *pixel = Luma([acc]);
    }
    out
}

/// Erosion with a 2×2 square anchored at its bottom-right cell.
pub fn erode_2x2(img: &GrayImage) -> GrayImage {
    morph_2x2(img, -1, u8::min)
}

/// Dilation with the reflected 2×2 square, pairing with [`erode_2x2`].
pub fn dilate_2x2(img: &GrayImage) -> GrayImage {
    morph_2x2(img, 1, u8::max)
}

/// Morphological opening: removes bright specks smaller than 2×2 and
/// leaves larger shapes in place.
pub fn open_2x2(img: &GrayImage) -> GrayImage {
    dilate_2x2(&erode_2x2(img))
}

/// Prepares a card crop for Tesseract. Output has the input's size.
pub fn neutral_otsu(img: &RgbImage, antimerge: bool) -> GrayImage {
    let gray = imageops::grayscale(img);
    if gray.width() == 0 || gray.height() == 0 {
        return gray;
    }

    let norm = clahe(&gray, CLAHE_CLIP_LIMIT, CLAHE_GRID);
    let blurred = imageops::blur(&norm, BLUR_SIGMA);
    let sharp = sharpen(&norm, &blurred, SHARPEN_AMOUNT);

    let threshold = otsu_threshold(sharp.as_raw());
    let binary = open_2x2(&binarize_inverted(&sharp, threshold));

    if antimerge { erode_2x2(&binary) } else { binary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn test_crop_region() {
        // 100x200 image
        let img: RgbImage = ImageBuffer::from_fn(100, 200, |x, y| Rgb([x as u8, y as u8, 0]));

        let region = RelativeRect::new(0.1, 0.25, 0.5, 0.1);
        let cropped = crop_region(&img, &region);

        assert_eq!(cropped.dimensions(), (50, 20));
        // Top-left pixel should be (10, 50) in the source image
        assert_eq!(cropped.get_pixel(0, 0)[0], 10);
        assert_eq!(cropped.get_pixel(0, 0)[1], 50);
    }

    #[test]
    fn test_crop_region_clamps() {
        let img = RgbImage::new(100, 100);
        let region = RelativeRect::new(0.9, 0.9, 0.5, 0.5);
        let cropped = crop_region(&img, &region);

        // Should clamp to 10x10 (remaining pixels)
        assert_eq!(cropped.dimensions(), (10, 10));
    }

    #[test]
    fn test_reflect101() {
        assert_eq!(reflect101(0, 5), 0);
        assert_eq!(reflect101(4, 5), 4);
        assert_eq!(reflect101(5, 5), 3);
        assert_eq!(reflect101(9, 5), 1);
        assert_eq!(reflect101(7, 1), 0);
    }

    #[test]
    fn test_otsu_bimodal() {
        let mut pixels = vec![30u8; 100];
        pixels.extend(vec![220u8; 100]);
        let t = otsu_threshold(&pixels);
        assert!((30..220).contains(&t));
    }

    #[test]
    fn test_clahe_keeps_size_and_flat_stays_flat() {
        let img: GrayImage = ImageBuffer::from_pixel(37, 23, Luma([120]));
        let out = clahe(&img, CLAHE_CLIP_LIMIT, CLAHE_GRID);
        assert_eq!(out.dimensions(), (37, 23));
        let first = out.get_pixel(0, 0)[0];
        assert!(out.pixels().all(|p| p[0] == first));
    }

    #[test]
    fn test_opening_removes_specks_keeps_blocks() {
        let mut img = GrayImage::new(12, 12);
        img.put_pixel(1, 1, Luma([255]));
        for y in 5..9 {
            for x in 5..9 {
                img.put_pixel(x, y, Luma([255]));
            }
        }

        let opened = open_2x2(&img);
        assert_eq!(opened.get_pixel(1, 1)[0], 0);
        for y in 5..9 {
            for x in 5..9 {
                assert_eq!(opened.get_pixel(x, y)[0], 255, "({}, {})", x, y);
            }
        }
        assert_eq!(opened.get_pixel(4, 4)[0], 0);
        assert_eq!(opened.get_pixel(9, 9)[0], 0);
    }

    #[test]
    fn test_white_text_becomes_black() {
        // Blue card with a thick white bar of "text" in the middle
        let card: RgbImage = ImageBuffer::from_fn(80, 40, |x, y| {
            if (20..60).contains(&x) && (15..25).contains(&y) {
                Rgb([250, 250, 250])
            } else {
                Rgb([30, 60, 200])
            }
        });

        let out = neutral_otsu(&card, false);
        assert_eq!(out.dimensions(), card.dimensions());
        assert_eq!(out.get_pixel(40, 20)[0], 0);
        assert_eq!(out.get_pixel(5, 5)[0], 255);
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_antimerge_keeps_size() {
        let card: RgbImage = ImageBuffer::from_fn(33, 17, |x, _| {
            if x % 4 == 0 { Rgb([255, 255, 255]) } else { Rgb([200, 40, 40]) }
        });
        assert_eq!(neutral_otsu(&card, true).dimensions(), (33, 17));
    }

    #[test]
    fn test_empty_input() {
        let out = neutral_otsu(&RgbImage::new(0, 0), false);
        assert_eq!(out.dimensions(), (0, 0));
    }
}
