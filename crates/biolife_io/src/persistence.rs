//! Snapshot files.
//!
//! A snapshot is one JSON document holding a [`SimulationRecord`], optionally
//! wrapped in gzip. Loading sniffs the gzip magic bytes instead of trusting
//! the file extension, so renamed files still open.

use crate::error::{IoError, Result};
use crate::serialization::{from_json_bytes, to_json};
use biolife_data::SimulationRecord;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[must_use]
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() >= GZIP_MAGIC.len() && bytes[..2] == GZIP_MAGIC
}

/// Writes `record` to `path`, gzip-compressed when `compress` is set.
///
/// The parent directory is created if missing.
pub fn save_snapshot<P: AsRef<Path>>(
    path: P,
    record: &SimulationRecord,
    compress: bool,
) -> Result<()> {
    let path = path.as_ref();
    let json = to_json(record)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            IoError::FileSystem(e).with_context(format!("creating {:?}", parent))
        })?;
    }

    let file = File::create(path)
        .map_err(|e| IoError::FileSystem(e).with_context(format!("creating {:?}", path)))?;
    let mut writer = BufWriter::new(file);
    if compress {
        let mut encoder = GzEncoder::new(&mut writer, Compression::default());
        encoder
            .write_all(json.as_bytes())
            .map_err(|e| IoError::compression(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| IoError::compression(e.to_string()))?;
    } else {
        writer.write_all(json.as_bytes())?;
    }
    writer.flush()?;

    tracing::debug!(
        path = %path.display(),
        cells = record.cells.len(),
        plants = record.plants.len(),
        compress,
        "Snapshot written"
    );
    Ok(())
}

/// Reads a snapshot written by [`save_snapshot`].
///
/// Only the file format is checked here; record contents are validated by
/// the world before anything is hydrated.
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<SimulationRecord> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::not_found(path.display().to_string()));
    }

    let bytes = std::fs::read(path)
        .map_err(|e| IoError::FileSystem(e).with_context(format!("reading {:?}", path)))?;

    let record = if is_gzip(&bytes) {
        let mut decoded = Vec::new();
        GzDecoder::new(bytes.as_slice())
            .read_to_end(&mut decoded)
            .map_err(|e| IoError::compression(e.to_string()))?;
        from_json_bytes(&decoded)
    } else {
        from_json_bytes(&bytes)
    }
    .map_err(|e| e.with_context(format!("decoding {:?}", path)))?;

    Ok(record)
}
