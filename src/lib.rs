//! Draft-board OCR.
//!
//! Reads a screenshot of a snake-draft board, extracts the text and card
//! color of every cell, and reconciles each cell against a ranked player
//! roster.

pub mod color;
pub mod config;
pub mod draft;
pub mod grid;
pub mod logging;
pub mod ocr;
pub mod paths;
pub mod pipeline;
pub mod reconcile;
pub mod roster;
