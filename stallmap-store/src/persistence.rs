//! File persistence helpers.
//!
//! Writes go through a temp file and a rename, so a reader never sees a
//! half-written export.

use serde::{de::DeserializeOwned, Serialize};
use stallmap_core::StallMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::error::StoreError;

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// - macOS: `~/Library/Application Support/stallmap`
/// - Linux: `~/.config/stallmap`
/// - Windows: `%APPDATA%\stallmap`
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|c| c.join("stallmap"))
        .unwrap_or_else(|| PathBuf::from("."))
}

// ============================================================================
// File Operations
// ============================================================================

async fn create_parent_dirs(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            debug!(path = %parent.display(), "Creating directory");
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Saves data as pretty JSON.
///
/// Creates parent directories if they don't exist and replaces any existing
/// file atomically (temp file + rename).
pub async fn save_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving JSON file");

    create_parent_dirs(path).await?;

    let json = serde_json::to_string_pretty(data)?;

    let temp_path = temp_path_for(path);
    tokio::fs::write(&temp_path, &json).await?;
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    debug!(path = %path.display(), bytes = json.len(), "JSON file saved");
    Ok(())
}

/// Loads data from a JSON file.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    debug!(path = %path.display(), "Loading JSON file");

    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_json::from_str(&content)?;

    Ok(data)
}

/// Writes the stall records exactly as the server sent them.
///
/// Returns the absolute path of the written file.
#[instrument(skip(stalls), fields(path = %path.display(), stalls = stalls.len()))]
pub async fn save_stalls(path: &Path, stalls: &StallMap) -> Result<PathBuf, StoreError> {
    save_json(path, stalls.raw()).await?;

    let written = tokio::fs::canonicalize(path).await?;
    info!(path = %written.display(), "Stall data saved");
    Ok(written)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_dir() {
        let path = default_config_dir();
        assert!(path.ends_with("stallmap"));
    }

    #[test]
    fn test_temp_path_sits_next_to_target() {
        let temp = temp_path_for(Path::new("out/stall_map_data.json"));
        assert_eq!(temp, PathBuf::from("out/stall_map_data.json.tmp"));
    }

    #[test]
    fn test_temp_path_without_extension() {
        let temp = temp_path_for(Path::new("stalls"));
        assert_eq!(temp, PathBuf::from("stalls.tmp"));
    }
}
