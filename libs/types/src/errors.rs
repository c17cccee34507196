//! Error types for tape generation
//!
//! Error taxonomy using thiserror

use thiserror::Error;

/// Top-level generation error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerateError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),
}

/// Rejected generation parameter. Always names the offending parameter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("{name} must be at least 1, got {value}")]
    Zero { name: &'static str, value: u64 },

    #[error("{name} must be within [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },

    #[error("{name} must be non-negative and finite, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("{name} must be non-negative, got {value}")]
    NegativeNanos { name: &'static str, value: i64 },

    #[error("{name} must exceed levels x tick_size = {min}, got {value}")]
    BelowBookDepth { name: &'static str, value: f64, min: f64 },

    #[error("{name} = {value} leaves no usable quantity at the deepest level")]
    DeepestLevelQuantity { name: &'static str, value: usize },

    #[error("event buffer of {n_steps} steps x {per_step} events overflows")]
    BufferOverflow { n_steps: u64, per_step: u64 },

    #[error("timestamp range overflows i64 nanoseconds after {n_steps} steps")]
    TimestampOverflow { n_steps: u64 },
}

/// Raw flag word that violates the category/side exclusivity rules.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlagError {
    #[error("flags {raw:#x}: expected exactly one category bit, found {found}")]
    Category { raw: u64, found: u32 },

    #[error("flags {raw:#x}: expected exactly one side bit, found {found}")]
    Side { raw: u64, found: u32 },

    #[error("flags {raw:#x}: no origin bit set")]
    NoOrigin { raw: u64 },

    #[error("flags {raw:#x}: unknown bits {unknown:#x}")]
    UnknownBits { raw: u64, unknown: u64 },
}

/// Semantic event that cannot become a record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(f64),

    #[error("local_ts {local_ts} precedes exch_ts {exch_ts}")]
    LocalBeforeExchange { exch_ts: i64, local_ts: i64 },

    #[error("Invalid flags: {0}")]
    Flags(#[from] FlagError),
}
