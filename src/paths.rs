use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the default config path: `<exe_dir>/config.json`
pub fn default_config_path() -> PathBuf {
    get_exe_dir().join("config.json")
}

/// Returns the logs directory inside an output directory: `<output>/logs/`
pub fn logs_dir(output_dir: &Path) -> PathBuf {
    output_dir.join("logs")
}

/// Returns the directory for saved cell crops: `<output>/cells/`
pub fn cells_dir(output_dir: &Path) -> PathBuf {
    output_dir.join("cells")
}

/// Returns the per-user fallback directory searched for a Tesseract install.
pub fn tesseract_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("draftboard-ocr")
        .join("tesseract")
}

/// Ensures all output directories exist. Call at startup.
pub fn ensure_directories(output_dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(output_dir)?;
    std::fs::create_dir_all(logs_dir(output_dir))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_directories_creates_logs() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("run");

        ensure_directories(&out).unwrap();

        assert!(out.is_dir());
        assert!(logs_dir(&out).is_dir());
        assert_eq!(cells_dir(&out), out.join("cells"));
    }
}
