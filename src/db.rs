// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::store::SqliteStore;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("org.oikonomos", "Oikonomos", "oikonomos"));

pub fn default_db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    Ok(proj.data_dir().join("oikonomos.sqlite"))
}

pub fn open_or_init(path: &Path) -> Result<SqliteStore> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data dir {}", dir.display()))?;
    }
    let store =
        SqliteStore::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    debug!(path = %path.display(), "ledger database ready");
    Ok(store)
}
