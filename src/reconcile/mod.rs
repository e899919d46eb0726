//! Matching noisy cell readings against the roster.
//!
//! This module provides:
//! - Name normalization and fuzzy similarity
//! - Multi-factor candidate scoring with a draft-position prior
//! - Greedy, order-dependent assignment with a used-player set

pub mod assign;
pub mod fuzzy;
pub mod scorer;

pub use assign::{
    Assigner, AssignmentRules, CellObservation, CellResult, ExtractionVariant, UsedPlayerSet,
    VariantScore, assign_board,
};
pub use fuzzy::{normalize_name, token_set_ratio};
pub use scorer::{ScoreBreakdown, ScoredMatch, Scorer};
