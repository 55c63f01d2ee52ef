//! Error types for configuration parsing.
//!
//! None of these escape the engine: every caller that receives one logs it
//! and falls back to a default.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("invalid number for {key}: {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("unknown symbol type: {0:?}")]
    UnknownSymbolType(String),

    #[error("custom positions are not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("custom position {index} is out of range: ({x}, {y})")]
    OutOfRange { index: usize, x: f64, y: f64 },

    #[error("custom positions list is empty")]
    EmptyPositions,
}
