// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::StoreError;

/// Current on-disk layout version of the state file.
pub const STATE_FILE_VERSION: u32 = 1;

#[derive(Serialize)]
struct StateFileRef<'a> {
    version: u32,
    variables: &'a BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct StateFile {
    version: u32,
    #[serde(default)]
    variables: BTreeMap<String, Value>,
}

/// Read the state file. A missing file is an empty store.
pub(crate) fn load(path: &Path) -> Result<BTreeMap<String, Value>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(io_error(path, e)),
    };

    let state: StateFile = serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    if state.version != STATE_FILE_VERSION {
        return Err(StoreError::UnsupportedVersion {
            path: path.display().to_string(),
            version: state.version,
        });
    }

    Ok(state.variables)
}

/// Write the full variable map, replacing the state file atomically.
///
/// The data goes to a temporary file in the same directory, is synced, and
/// is then renamed over the old file, so a crash leaves either the previous
/// or the new state on disk.
pub(crate) fn save(path: &Path, variables: &BTreeMap<String, Value>) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(
            &mut writer,
            &StateFileRef {
                version: STATE_FILE_VERSION,
                variables,
            },
        )
        .map_err(|e| StoreError::Serialization {
            message: e.to_string(),
        })?;
        writer.flush().map_err(|e| io_error(path, e))?;
    }
    tmp.as_file().sync_all().map_err(|e| io_error(path, e))?;
    tmp.persist(path).map_err(|e| io_error(path, e.error))?;

    Ok(())
}

fn io_error(path: &Path, error: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}
