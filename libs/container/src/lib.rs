//! Container I/O for the event tape
//!
//! Persists record arrays as NumPy `.npz` archives (one `.npy` member per
//! key) and reads them back with schema validation.
//!
//! # Modules
//! - `npy`: `.npy` v1.0 header and payload codec for the record dtype
//! - `npz`: Atomic container writer, container reader
//! - `digest`: SHA-256 of written containers

pub mod digest;
pub mod npy;
pub mod npz;

use std::io;
use thiserror::Error;

pub use digest::{sha256_file, sha256_hex};
pub use npz::{encode_container, read_records, ContainerReader, ContainerWriter, WriteReport, DATA_KEY};

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Key '{key}' not found; available keys: {}", .available.join(", "))]
    MissingKey { key: String, available: Vec<String> },

    #[error("Invalid container name: '{0}'")]
    InvalidName(String),

    #[error("Malformed .npy header: {0}")]
    Header(String),

    #[error("Record dtype mismatch: expected {expected}, found {found}")]
    Dtype { expected: String, found: String },

    #[error("Truncated payload: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },
}
