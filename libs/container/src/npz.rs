//! `.npz` container writer and reader
//!
//! A container is a ZIP archive whose members are `.npy` files; the member
//! `data.npy` is exposed under the key `"data"`. Writes are atomic (temp file,
//! fsync, rename) and byte-stable: entry timestamps are pinned so identical
//! records always give identical bytes.

use crate::digest::sha256_hex;
use crate::{npy, ContainerError};
use std::fs::{self, File};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use types::record::EventRecord;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Key the record array is stored under.
pub const DATA_KEY: &str = "data";

const MEMBER_SUFFIX: &str = ".npy";

/// Outcome of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub path: PathBuf,
    pub records: usize,
    /// Size of the container file on disk
    pub bytes: u64,
    /// SHA-256 of the container file, lowercase hex
    pub sha256: String,
}

// ── Container Writer ────────────────────────────────────────────────

/// Writes record arrays as `.npz` containers.
pub struct ContainerWriter {
    dir: PathBuf,
    compress: bool,
}

impl ContainerWriter {
    /// Create a new writer. `compress` selects deflate over stored entries.
    pub fn new(dir: impl Into<PathBuf>, compress: bool) -> Self {
        Self {
            dir: dir.into(),
            compress,
        }
    }

    /// Write `records` to `<dir>/<name>.npz` under [`DATA_KEY`].
    pub fn write(&self, name: &str, records: &[EventRecord]) -> Result<WriteReport, ContainerError> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(ContainerError::InvalidName(name.to_string()));
        }
        fs::create_dir_all(&self.dir)?;

        let image = encode_container(records, self.compress)?;
        let sha256 = sha256_hex(&image);

        let filename = format!("{}.npz", name);
        let path = self.dir.join(&filename);
        let tmp_path = self.dir.join(format!("{}.tmp", filename));

        // Atomic write: write to tmp, fsync, rename
        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(&image)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;

        debug!(
            path = %path.display(),
            records = records.len(),
            bytes = image.len(),
            compressed = self.compress,
            "Container written"
        );

        Ok(WriteReport {
            path,
            records: records.len(),
            bytes: image.len() as u64,
            sha256,
        })
    }
}

/// Build the complete container image in memory.
pub fn encode_container(records: &[EventRecord], compress: bool) -> Result<Vec<u8>, ContainerError> {
    let member = npy::encode(records)?;
    let method = if compress {
        CompressionMethod::Deflated
    } else {
        CompressionMethod::Stored
    };
    let options = SimpleFileOptions::default()
        .compression_method(method)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644)
        .large_file(member.len() as u64 >= u32::MAX as u64);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file(format!("{}{}", DATA_KEY, MEMBER_SUFFIX), options)?;
    zip.write_all(&member)?;
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

// ── Container Reader ────────────────────────────────────────────────

/// Reads record arrays back out of an `.npz` container.
pub struct ContainerReader {
    path: PathBuf,
    archive: ZipArchive<File>,
}

impl ContainerReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ContainerError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let archive = ZipArchive::new(file)?;
        Ok(Self { path, archive })
    }

    /// Array keys in the container, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .archive
            .file_names()
            .map(|name| name.strip_suffix(MEMBER_SUFFIX).unwrap_or(name).to_string())
            .collect();
        keys.sort();
        keys
    }

    /// Read and validate the array stored under `key`.
    pub fn read(&mut self, key: &str) -> Result<Vec<EventRecord>, ContainerError> {
        let member = format!("{}{}", key, MEMBER_SUFFIX);
        if !self.archive.file_names().any(|name| name == member) {
            return Err(ContainerError::MissingKey {
                key: key.to_string(),
                available: self.keys(),
            });
        }
        let mut entry = self.archive.by_name(&member)?;
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut buf)?;
        drop(entry);

        let records = npy::decode(&buf)?;
        debug!(
            path = %self.path.display(),
            key,
            records = records.len(),
            "Container array read"
        );
        Ok(records)
    }
}

/// Read the [`DATA_KEY`] array from a container file.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<EventRecord>, ContainerError> {
    ContainerReader::open(path)?.read(DATA_KEY)
}

// ── Tests ───────────────────────────────────────────────────────────
