//! # PriceBot Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Filesystem helpers shared across the crate. Currently this is only the `io`
//! submodule, which backs the catalog's snapshot cache.
//!
//! ```rust
//! use crate::common::fs::io;
//!
//! io::ensure_dir_exists(cache_dir)?;
//! io::write_string_to_file(&cache_dir.join("currencies_list.json"), &raw)?;
//! ```
//!

/// Contains basic file I/O operations (e.g., `ensure_dir_exists`,
/// `read_file_to_string`, `write_string_to_file`).
pub mod io;
