use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};

use crate::config::TesseractConfig;
use crate::paths::tesseract_data_dir;

#[cfg(windows)]
const EXECUTABLE_NAME: &str = "tesseract.exe";
#[cfg(not(windows))]
const EXECUTABLE_NAME: &str = "tesseract";

#[derive(Debug, Clone, PartialEq)]
pub struct TesseractPaths {
    pub executable: PathBuf,
    /// None lets Tesseract use its compiled-in data directory
    pub tessdata: Option<PathBuf>,
}

/// Returns the first directory in `dirs` holding an executable named `name`.
fn find_in_dirs<I>(name: &str, dirs: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    dirs.into_iter()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

fn has_language(dir: &Path, language: &str) -> bool {
    dir.join(format!("{}.traineddata", language)).is_file()
}

/// Finds the Tesseract executable: the configured path first, then every
/// PATH entry, then the per-user data directory.
pub fn find_tesseract_executable(config: &TesseractConfig) -> Result<PathBuf> {
    if let Some(explicit) = &config.executable {
        if explicit.is_file() {
            return Ok(explicit.clone());
        }
        log::warn!(
            "Configured Tesseract not found at {}, searching PATH",
            explicit.display()
        );
    }

    let path_dirs = std::env::var_os("PATH")
        .map(|p| std::env::split_paths(&p).collect::<Vec<_>>())
        .unwrap_or_default();
    if let Some(found) = find_in_dirs(EXECUTABLE_NAME, path_dirs) {
        return Ok(found);
    }

    let local_dir = tesseract_data_dir();
    if let Some(found) = find_in_dirs(EXECUTABLE_NAME, [local_dir.clone()]) {
        return Ok(found);
    }

    Err(anyhow!(
        "Tesseract not found. Install Tesseract-OCR and add it to PATH, \
         set tesseract.executable in config.json, or place it in {}",
        local_dir.display()
    ))
}

/// Finds a tessdata directory containing the configured language.
///
/// Checks the configured directory, the per-user data directory and
/// TESSDATA_PREFIX. Returns None when none of them has the language.
pub fn find_tessdata_dir(config: &TesseractConfig) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(dir) = &config.tessdata_dir {
        candidates.push(dir.clone());
    }
    candidates.push(tesseract_data_dir().join("tessdata"));
    if let Some(prefix) = std::env::var_os("TESSDATA_PREFIX") {
        let prefix = PathBuf::from(prefix);
        candidates.push(prefix.join("tessdata"));
        candidates.push(prefix);
    }

    candidates
        .into_iter()
        .find(|dir| has_language(dir, &config.language))
}

/// Resolves everything needed to run Tesseract. Missing executable is fatal.
pub fn locate_tesseract(config: &TesseractConfig) -> Result<TesseractPaths> {
    let executable = find_tesseract_executable(config)?;
    let tessdata = find_tessdata_dir(config);

    log::info!("Tesseract found at: {}", executable.display());
    match &tessdata {
        Some(dir) => log::info!("Using tessdata: {}", dir.display()),
        None => log::debug!("No tessdata override; using Tesseract default"),
    }

    Ok(TesseractPaths {
        executable,
        tessdata,
    })
}
