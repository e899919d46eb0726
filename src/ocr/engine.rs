use anyhow::{Context, Result, anyhow};
use image::GrayImage;
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;

use super::setup::TesseractPaths;

/// Tesseract page segmentation modes used on draft cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageSegMode {
    /// Assume a single uniform block of text (whole card)
    SingleBlock,
    /// Treat the image as a single text line (one ROI field)
    SingleLine,
}

impl PageSegMode {
    pub fn as_arg(self) -> &'static str {
        match self {
            Self::SingleBlock => "6",
            Self::SingleLine => "7",
        }
    }
}

/// Represents a line of OCR text with confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct OcrLine {
    pub text: String,
    pub words: Vec<OcrWord>,
    pub confidence: f32,
}

/// Represents a single word from OCR with confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct OcrWord {
    pub text: String,
    pub confidence: f32,
}

/// Text recognizer used by the cell extractors.
///
/// Implementations must be shareable across extraction worker threads.
pub trait OcrEngine: Sync {
    /// Plain text of a preprocessed image, optionally restricted to `whitelist`.
    fn recognize_text(
        &self,
        img: &GrayImage,
        psm: PageSegMode,
        whitelist: Option<&str>,
    ) -> Result<String>;

    /// Word tokens with confidences, grouped by line.
    fn recognize_words(&self, img: &GrayImage, psm: PageSegMode) -> Result<Vec<OcrLine>>;
}

/// Runs the `tesseract` executable on temporary PNG files.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    executable: PathBuf,
    tessdata: Option<PathBuf>,
    language: String,
}

impl TesseractEngine {
    pub fn new(paths: TesseractPaths, language: &str) -> Self {
        Self {
            executable: paths.executable,
            tessdata: paths.tessdata,
            language: language.to_string(),
        }
    }

    fn command(&self, input: &NamedTempFile, output: &str, psm: PageSegMode) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.arg(input.path()).arg(output);
        if let Some(tessdata) = &self.tessdata {
            cmd.arg("--tessdata-dir").arg(tessdata);
        }
        cmd.arg("-l").arg(&self.language).arg("--psm").arg(psm.as_arg());
        cmd
    }

    fn save_input(img: &GrayImage) -> Result<NamedTempFile> {
        let temp_input = NamedTempFile::with_suffix(".png")?;
        img.save(temp_input.path())
            .context("Failed to write OCR input image")?;
        Ok(temp_input)
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize_text(
        &self,
        img: &GrayImage,
        psm: PageSegMode,
        whitelist: Option<&str>,
    ) -> Result<String> {
        if img.width() == 0 || img.height() == 0 {
            return Ok(String::new());
        }
        let temp_input = Self::save_input(img)?;

        let mut cmd = self.command(&temp_input, "stdout", psm);
        if let Some(chars) = whitelist {
            cmd.arg("-c").arg(format!("tessedit_char_whitelist={}", chars));
        }
        let output = cmd.output().context("Failed to run Tesseract")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn recognize_words(&self, img: &GrayImage, psm: PageSegMode) -> Result<Vec<OcrLine>> {
        if img.width() == 0 || img.height() == 0 {
            return Ok(Vec::new());
        }
        let temp_input = Self::save_input(img)?;

        // Tesseract appends .tsv to the output base
        let temp_output = NamedTempFile::new()?;
        let output_base = temp_output.path().to_string_lossy().to_string();

        let output = self
            .command(&temp_input, &output_base, psm)
            .arg("tsv")
            .output()
            .context("Failed to run Tesseract")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        let tsv_path = format!("{}.tsv", output_base);
        let tsv_content = std::fs::read_to_string(&tsv_path)
            .map_err(|e| anyhow!("Failed to read Tesseract output: {}", e))?;
        let _ = std::fs::remove_file(&tsv_path);

        Ok(parse_tsv_output(&tsv_content))
    }
}

fn finish_line(words: Vec<OcrWord>) -> OcrLine {
    let confidence = if words.is_empty() {
        0.0
    } else {
        words.iter().map(|w| w.confidence).sum::<f32>() / words.len() as f32
    };
    let text = words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    OcrLine {
        text,
        words,
        confidence,
    }
}

/// Parses Tesseract TSV output into lines of words.
///
/// TSV fields: level, page_num, block_num, par_num, line_num, word_num,
/// left, top, width, height, conf, text. Only level-5 rows are words.
pub fn parse_tsv_output(tsv: &str) -> Vec<OcrLine> {
    let mut lines = Vec::new();
    let mut current_key: Option<(i32, i32, i32)> = None;
    let mut current_words: Vec<OcrWord> = Vec::new();

    for row in tsv.lines().skip(1) {
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        let level: i32 = fields[0].parse().unwrap_or(-1);
        let conf: f32 = fields[10].parse().unwrap_or(-1.0);
        let text = fields[11].trim();
        if level != 5 || text.is_empty() || conf < 0.0 {
            continue;
        }

        let key = (
            fields[2].parse().unwrap_or(-1),
            fields[3].parse().unwrap_or(-1),
            fields[4].parse().unwrap_or(-1),
        );
        if current_key.is_some_and(|k| k != key) && !current_words.is_empty() {
            lines.push(finish_line(std::mem::take(&mut current_words)));
        }
        current_key = Some(key);

        current_words.push(OcrWord {
            text: text.to_string(),
            confidence: conf,
        });
    }

    if !current_words.is_empty() {
        lines.push(finish_line(current_words));
    }

    lines
}

/// Flattens OCR lines into their word texts, in reading order.
pub fn word_texts(lines: &[OcrLine]) -> Vec<String> {
    lines
        .iter()
        .flat_map(|line| line.words.iter().map(|w| w.text.clone()))
        .collect()
}
