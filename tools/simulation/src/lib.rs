//! Synthetic L2 Market Tape Generator
//!
//! Deterministic simulator producing order-book snapshots, incremental
//! depth updates and trades as one time-ordered array of 64-byte records,
//! ready for an hftbacktest-compatible backtester.
//!
//! # Modules
//! - `config`: Generation parameters, defaults and validation
//! - `price`: Regime-switching mid-price process
//! - `depth`: Depth book builder and quantity profiles
//! - `trades`: Aggressor trade generator
//! - `encoder`: Semantic event to record mapping
//! - `assembler`: Periodic stream and initial snapshot
//! - `merge`: Stable time-ordered merge and order check
//! - `tape`: Output layouts and container persistence
//! - `inspect`: Event filters and tape summary
//! - `telemetry`: Tracing subscriber setup

pub mod config;
pub mod price;
pub mod depth;
pub mod trades;
pub mod encoder;
pub mod assembler;
pub mod merge;
pub mod tape;
pub mod inspect;
pub mod telemetry;

pub use assembler::{generate_snapshot, StreamAssembler};
pub use config::GeneratorConfig;
pub use depth::{DepthBookBuilder, DepthLadder, DepthProfile, Level};
pub use merge::{check_order, merge, OrderViolation};
pub use tape::{build_tape, generate_day, write_tape, Layout, TapePart};
