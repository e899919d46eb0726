//! Per-cell field extraction.
//!
//! Two independent strategies read the same card:
//! - ROI: five fixed sub-rectangles, one single-line OCR call each
//! - Whole cell: one block OCR call, tokens classified afterwards
//!
//! Unreadable text never fails a cell; the affected field is left empty
//! and the scorer weighs the gap.

use anyhow::Result;
use image::RgbImage;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::engine::{OcrEngine, PageSegMode, word_texts};
use super::preprocess::{crop_region, neutral_otsu};
use crate::config::{RelativeRect, RoiLayout};
use crate::roster::Position;
use crate::roster::teams::{TEAM_CODES, team_code};

/// Characters Tesseract may emit for the position corner.
pub const POSITION_WHITELIST: &str = "QBWRTEDSTK";
/// Characters Tesseract may emit for the bye-week corner.
pub const BYE_WHITELIST: &str = "BYE 0123456789";

/// One or two digits anywhere in the (space-stripped) bye text
const ROI_BYE_PATTERN: &str = r"(\d{1,2})";
/// "BYE 7" / "BYE7" inside the joined whole-cell text
const WHOLE_BYE_PATTERN: &str = r"\bBYE\s*(\d{1,2})\b";

/// Minimum letters for a token to be considered a name.
const MIN_NAME_LEN: usize = 2;

/// Weakly-typed observations read off one card by one strategy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub pos_text: String,
    pub bye: Option<u32>,
    pub last_name: String,
    pub first_name: String,
    pub team_text: String,
    /// Filled from the card color, not from OCR
    pub color_pos: Option<Position>,
}

impl ExtractedFields {
    /// Same observations with first and last name exchanged.
    pub fn swapped(&self) -> Self {
        Self {
            last_name: self.first_name.clone(),
            first_name: self.last_name.clone(),
            ..self.clone()
        }
    }

    pub fn with_color(mut self, color_pos: Option<Position>) -> Self {
        self.color_pos = color_pos;
        self
    }

    /// True when OCR recovered nothing at all.
    pub fn is_blank(&self) -> bool {
        self.pos_text.is_empty()
            && self.bye.is_none()
            && self.last_name.is_empty()
            && self.first_name.is_empty()
            && self.team_text.is_empty()
    }
}

/// Uppercase ASCII letters of `text`, everything else dropped.
fn letters_only(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Parses the ROI bye text: spaces removed, first 1–2 digit run.
pub fn parse_roi_bye(text: &str) -> Result<Option<u32>> {
    let re = Regex::new(ROI_BYE_PATTERN)?;
    let compact: String = text.chars().filter(|c| *c != ' ').collect();
    Ok(re
        .captures(&compact)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok()))
}

fn read_field(
    engine: &dyn OcrEngine,
    cell: &RgbImage,
    region: &RelativeRect,
    whitelist: Option<&str>,
    antimerge: bool,
) -> Result<String> {
    let crop = crop_region(cell, region);
    if crop.width() == 0 || crop.height() == 0 {
        return Ok(String::new());
    }
    let prepared = neutral_otsu(&crop, antimerge);
    let text = engine.recognize_text(&prepared, PageSegMode::SingleLine, whitelist)?;
    Ok(text.trim().to_string())
}

/// ROI strategy: each field read from its own corner of the card.
pub fn read_cell_roi(
    engine: &dyn OcrEngine,
    cell: &RgbImage,
    layout: &RoiLayout,
    antimerge: bool,
) -> Result<ExtractedFields> {
    if cell.width() == 0 || cell.height() == 0 {
        return Ok(ExtractedFields::default());
    }

    let pos_text = read_field(engine, cell, &layout.pos, Some(POSITION_WHITELIST), antimerge)?;
    let bye_text = read_field(engine, cell, &layout.bye, Some(BYE_WHITELIST), antimerge)?;
    let last_name = read_field(engine, cell, &layout.last_name, None, antimerge)?;
    let team_text = read_field(engine, cell, &layout.team, None, antimerge)?;
    let first_name = read_field(engine, cell, &layout.first_name, None, antimerge)?;

    Ok(ExtractedFields {
        pos_text,
        bye: parse_roi_bye(&bye_text)?,
        last_name,
        first_name,
        team_text,
        color_pos: None,
    })
}

/// Whole-cell strategy: a single block OCR pass, then token classification.
pub fn read_cell_whole(
    engine: &dyn OcrEngine,
    cell: &RgbImage,
    antimerge: bool,
) -> Result<ExtractedFields> {
    if cell.width() == 0 || cell.height() == 0 {
        return Ok(ExtractedFields::default());
    }

    let prepared = neutral_otsu(cell, antimerge);
    let tokens = match engine.recognize_words(&prepared, PageSegMode::SingleBlock) {
        Ok(lines) => word_texts(&lines),
        Err(e) => {
            // Word-level data unavailable; fall back to plain text
            log::debug!("Word-level OCR failed ({}), using plain text", e);
            engine
                .recognize_text(&prepared, PageSegMode::SingleBlock, None)?
                .split_whitespace()
                .map(str::to_string)
                .collect()
        }
    };

    parse_whole_tokens(&tokens)
}

fn parse_whole_bye(tokens: &[String]) -> Result<Option<u32>> {
    let re = Regex::new(WHOLE_BYE_PATTERN)?;
    let joined = tokens.join(" ").to_uppercase();
    if let Some(m) = re.captures(&joined).and_then(|caps| caps.get(1)) {
        return Ok(m.as_str().parse().ok());
    }

    // Phrase split across tokens in an unexpected way: pair "BYE" with the next token
    let upper: Vec<String> = tokens.iter().map(|t| t.to_uppercase()).collect();
    Ok(upper
        .windows(2)
        .find(|pair| pair[0] == "BYE" && !pair[1].is_empty() && pair[1].chars().all(|c| c.is_ascii_digit()))
        .and_then(|pair| pair[1].parse().ok()))
}

fn is_position_code(word: &str) -> bool {
    Position::ALL.iter().any(|p| p.as_str() == word)
}

/// Classifies whole-cell tokens into fields.
///
/// The first valid position code is the position. The team is the first
/// other token that resolves to a team code, so city and mascot words
/// count ("RAVENS" gives BAL). Of the alphabetic tokens (2+ letters, not
/// a position, "BYE" or team code) the longest is the last name and the
/// next different one the first name; city and mascot words stay name
/// candidates.
pub fn parse_whole_tokens(tokens: &[String]) -> Result<ExtractedFields> {
    let tokens: Vec<String> = tokens
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let bye = parse_whole_bye(&tokens)?;

    let pos_text = tokens
        .iter()
        .map(|t| letters_only(t))
        .find(|word| is_position_code(word))
        .unwrap_or_default();

    let team_text = tokens
        .iter()
        .map(|t| letters_only_or_digits(t))
        .filter(|word| word != "BYE" && !is_position_code(word))
        .find_map(|word| team_code(&word))
        .map(str::to_string)
        .unwrap_or_default();

    let mut names: Vec<String> = tokens
        .iter()
        .map(|t| letters_only(t))
        .filter(|word| {
            word.len() >= MIN_NAME_LEN
                && word != "BYE"
                && !is_position_code(word)
                && !TEAM_CODES.contains(&word.as_str())
        })
        .collect();
    // Stable: equal lengths keep reading order
    names.sort_by(|a, b| b.len().cmp(&a.len()));

    let last_name = names.first().cloned().unwrap_or_default();
    let first_name = names
        .iter()
        .skip(1)
        .find(|w| **w != last_name)
        .cloned()
        .unwrap_or_default();

    Ok(ExtractedFields {
        pos_text,
        bye,
        last_name,
        first_name,
        team_text,
        color_pos: None,
    })
}

/// Uppercase letters and digits of `text` (team codes like "49ERS" keep digits).
fn letters_only_or_digits(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
