//! Draft-board OCR command-line driver.
//!
//! Reads one board screenshot, reconciles every cell against a roster
//! and writes `board.json` to the output directory.

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

use draftboard_ocr::color::ColorProfiles;
use draftboard_ocr::config::BoardConfig;
use draftboard_ocr::pipeline::{load_board, process_board, save_unresolved_cells, write_report};
use draftboard_ocr::roster::Roster;
use draftboard_ocr::{logging, ocr, paths};

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
struct CommandArgs {
    /// Board screenshot to read
    image: PathBuf,

    /// Ranked roster CSV (PLAYER NAME, TEAM, POS, BYE WEEK)
    #[arg(long)]
    roster: PathBuf,

    /// Color profile JSON; built-in defaults when omitted
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// Config JSON; defaults to config.json next to the executable
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of rounds (grid rows)
    #[arg(long)]
    rows: Option<u32>,

    /// Number of teams (grid columns)
    #[arg(long)]
    cols: Option<u32>,

    /// Minimum score for a cell to use its roster match
    #[arg(long)]
    threshold: Option<f64>,

    /// Extraction worker threads
    #[arg(long)]
    workers: Option<usize>,

    /// Output directory
    #[arg(long, short, default_value = "out")]
    output: PathBuf,

    /// Save crops of unresolved cells under <output>/cells/
    #[arg(long)]
    save_unresolved: bool,

    /// Debug logging
    #[arg(long, short)]
    verbose: bool,
}

impl CommandArgs {
    fn apply_overrides(&self, config: &mut BoardConfig) {
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.cols = cols;
        }
        if let Some(threshold) = self.threshold {
            config.confidence_threshold = threshold;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
    }
}

fn run(args: &CommandArgs) -> Result<()> {
    paths::ensure_directories(&args.output)
        .with_context(|| format!("Failed to create output directory: {}", args.output.display()))?;

    // Logging starts before the config is read so config problems are
    // recorded; the file's log level applies only without -v.
    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let log_path = logging::init(level, Some(&paths::logs_dir(&args.output)));
    log::info!("draftboard-ocr {} starting", env!("CARGO_PKG_VERSION"));
    log::info!("Log file: {}", log_path.display());

    let config_path = args.config.clone().unwrap_or_else(paths::default_config_path);
    let mut config = BoardConfig::load(&config_path);
    args.apply_overrides(&mut config);
    if !args.verbose {
        log::set_max_level(logging::parse_level(&config.log_level));
    }

    let roster = Roster::load(&args.roster)?;
    log::info!("Loaded {} players from {}", roster.len(), args.roster.display());

    let profiles = match &args.profiles {
        Some(path) => ColorProfiles::load(path)?,
        None => {
            log::info!("No color profiles given, using built-in defaults");
            ColorProfiles::builtin()
        }
    };

    let engine = ocr::tesseract_engine(&config.tesseract)?;
    let board = load_board(&args.image)?;
    let report = process_board(&board, &roster, &profiles, &engine, &config)?;

    write_report(&report, &args.output)?;
    if args.save_unresolved {
        save_unresolved_cells(&board, &report, &args.output)?;
    }

    for cell in report.unresolved() {
        log::info!(
            "Pick {:>3} (r{} c{}) needs review: '{}' best {:.1}",
            cell.pick,
            cell.row,
            cell.col,
            cell.full_name(),
            cell.match_score
        );
    }
    Ok(())
}

fn main() {
    let args = CommandArgs::parse();
    if let Err(e) = run(&args) {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
