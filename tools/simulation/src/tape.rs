//! Tape assembly and persistence
//!
//! Wires snapshot, periodic stream, merger and container writer together.
//! Two on-disk layouts are supported:
//!
//! - [`Layout::Concatenated`]: snapshot and day merged into `part-000.npz`
//! - [`Layout::Separated`]: snapshot in `part-000-eod.npz`, day in
//!   `part-000.npz`

use crate::assembler::{generate_snapshot, StreamAssembler};
use crate::config::GeneratorConfig;
use crate::merge::merge;
use container::{ContainerError, ContainerWriter, WriteReport};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;
use types::errors::GenerateError;
use types::record::EventRecord;

/// Container holding the day stream (or everything, when concatenated).
pub const DAY_PART: &str = "part-000";
/// Container holding the initial snapshot in the separated layout.
pub const SNAPSHOT_PART: &str = "part-000-eod";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Concatenated,
    Separated,
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "concatenated" => Ok(Layout::Concatenated),
            "separated" => Ok(Layout::Separated),
            other => Err(format!(
                "unknown layout '{}'. Available: concatenated, separated",
                other
            )),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Concatenated => f.write_str("concatenated"),
            Layout::Separated => f.write_str("separated"),
        }
    }
}

/// One container's worth of records.
#[derive(Debug, Clone, PartialEq)]
pub struct TapePart {
    pub name: &'static str,
    pub records: Vec<EventRecord>,
}

/// Generate the periodic stream with a fresh generator seeded from `config.seed`.
pub fn generate_day(config: &GeneratorConfig) -> Result<Vec<EventRecord>, GenerateError> {
    let assembler = StreamAssembler::new(config)?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    assembler.run(&mut rng)
}

/// Generate every part for `layout`, each already time-ordered.
pub fn build_tape(config: &GeneratorConfig, layout: Layout) -> Result<Vec<TapePart>, GenerateError> {
    let snapshot = generate_snapshot(config)?;
    let day = generate_day(config)?;

    let parts = match layout {
        Layout::Concatenated => vec![TapePart {
            name: DAY_PART,
            records: merge([snapshot, day]),
        }],
        Layout::Separated => vec![
            TapePart {
                name: SNAPSHOT_PART,
                records: merge([snapshot]),
            },
            TapePart {
                name: DAY_PART,
                records: merge([day]),
            },
        ],
    };

    info!(
        %layout,
        parts = parts.len(),
        records = parts.iter().map(|p| p.records.len()).sum::<usize>(),
        "Tape assembled"
    );
    Ok(parts)
}

/// Persist every part through `writer`.
pub fn write_tape(parts: &[TapePart], writer: &ContainerWriter) -> Result<Vec<WriteReport>, ContainerError> {
    let mut reports = Vec::with_capacity(parts.len());
    for part in parts {
        let report = writer.write(part.name, &part.records)?;
        info!(
            path = %report.path.display(),
            records = report.records,
            bytes = report.bytes,
            sha256 = %report.sha256,
            "Wrote container"
        );
        reports.push(report);
    }
    Ok(reports)
}
