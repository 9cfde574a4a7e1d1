//! JSON array files backing every content repository.
//!
//! A repository keeps its whole collection in memory and mirrors it to one
//! pretty-printed JSON array. Loading validates each element on its own so a
//! single bad record is skipped instead of poisoning the file; saving rewrites
//! the whole file through a temporary sibling that is renamed into place.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// A record stored in a JSON array file.
pub trait Record: Serialize + DeserializeOwned {
    /// Name used in log lines about this record.
    fn label(&self) -> &str;
}

/// Load and validate every record of a JSON array file.
///
/// A missing file is created empty. `is_valid` runs on each decoded record;
/// rejected or undecodable elements are logged and skipped.
pub fn load_records<T, F>(path: &Path, module: &'static str, mut is_valid: F) -> Result<Vec<T>>
where
    T: Record,
    F: FnMut(&T) -> bool,
{
    if !path.exists() {
        warn!("{module}: {} not found, creating empty file", path.display());
        save_records::<T>(path, module, &[])?;
        return Ok(Vec::new());
    }

    let content = fs_err::read_to_string(path).map_err(|e| {
        Error::model(module, "LOAD_003", format!("Error loading {}: {e}", path.display()))
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|e| {
        Error::model(module, "LOAD_002", format!("Error decoding JSON from {}: {e}", path.display()))
    })?;
    let Value::Array(items) = value else {
        return Err(Error::model(
            module,
            "LOAD_001",
            format!("{} is not a list", path.display()),
        ));
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        let label = value_label(&item);
        match serde_json::from_value::<T>(item) {
            Ok(record) if is_valid(&record) => records.push(record),
            Ok(record) => warn!("{module}: invalid record skipped: {}", record.label()),
            Err(e) => warn!("{module}: invalid record skipped: {label} ({e})"),
        }
    }
    info!("{module}: loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Rewrite a JSON array file with the given records.
pub fn save_records<T: Serialize>(path: &Path, module: &'static str, records: &[T]) -> Result<()> {
    write_json(path, records).map_err(|e| {
        Error::model(module, "SAVE_001", format!("Error saving to {}: {e}", path.display()))
    })?;
    info!("{module}: saved {} records to {}", records.len(), path.display());
    Ok(())
}

/// Write any value as 4-space indented JSON, replacing `path` atomically.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs_err::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(e, dir.to_path_buf()))?;
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut tmp, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .map_err(|e| Error::json(e, path.to_path_buf()))?;
    tmp.persist(path)
        .map_err(|e| Error::io(e.error, path.to_path_buf()))?;
    Ok(())
}

/// Read a JSON document of any shape.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs_err::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| Error::json(e, path.to_path_buf()))
}

fn value_label(value: &Value) -> String {
    ["title", "name", "id"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .unwrap_or("Unknown")
        .to_string()
}
