//! # PriceBot Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Small wrappers around `std::fs` used by the snapshot cache:
//! - **`ensure_dir_exists`**: creates the cache directory (and parents) on first run,
//!   and refuses a path that exists but is not a directory.
//! - **`read_file_to_string`**: reads a snapshot, adding the path to any I/O error.
//! - **`write_string_to_file`**: writes a snapshot through a temporary sibling file and
//!   a rename, so an interrupted first run never leaves a half-written snapshot behind
//!   (snapshots are trusted forever once they exist).
//!
//! ```rust
//! use crate::common::fs::io;
//!
//! io::ensure_dir_exists(Path::new("cache"))?;
//! io::write_string_to_file(Path::new("cache/coins_list.json"), &raw)?;
//! let raw = io::read_file_to_string(Path::new("cache/coins_list.json"))?;
//! ```
//!
use crate::core::error::{PriceBotError, Result};
use anyhow::Context;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Ensures that a directory exists at the specified path.
///
/// If the path does not exist, it is created along with any missing parents
/// (like `mkdir -p`). If it exists but is not a directory,
/// `PriceBotError::FileSystem` is returned.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
        info!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        anyhow::bail!(PriceBotError::FileSystem(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    } else {
        debug!("Directory already exists: {:?}", path);
    }
    Ok(())
}

/// Reads the entire content of a file into a string, with the path in the error context.
pub fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// # Write File (`write_string_to_file`)
///
/// Writes `content` to `path`, creating the parent directory if needed and
/// replacing any existing file. The bytes land in `<path>.tmp` first and are
/// renamed into place once fully written.
pub fn write_string_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir_exists(parent)?;
        }
    }

    let staging = staging_path(path);
    fs::write(&staging, content)
        .with_context(|| format!("Failed to write to file {:?}", staging))?;
    fs::rename(&staging, path)
        .with_context(|| format!("Failed to move {:?} into place at {:?}", staging, path))?;
    info!("Wrote {} bytes to file: {:?}", content.len(), path);
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
