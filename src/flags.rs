// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Key-value flags kept outside the SQLite file, so clearing the tables does
//! not clear them and vice versa.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LedgerError, Result};

pub const DB_INITIALIZED: &str = "dbInitialized";

pub trait FlagStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Flags persisted as a single JSON object file.
#[derive(Debug, Clone)]
pub struct FileFlagStore {
    path: PathBuf,
}

impl FileFlagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            LedgerError::StorageUnavailable(format!(
                "flag file {} is corrupt: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn save(&self, flags: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(flags)
            .map_err(|e| LedgerError::StorageUnavailable(e.to_string()))?;
        fs::write(&self.path, body)?;
        Ok(())
    }
}

impl FlagStore for FileFlagStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    /// A corrupt file is replaced rather than left to fail every launch.
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut flags = match self.load() {
            Err(LedgerError::StorageUnavailable(reason)) if self.path.exists() => {
                tracing::warn!(%reason, "overwriting unreadable flag file");
                BTreeMap::new()
            }
            other => other?,
        };
        flags.insert(key.to_string(), value.to_string());
        self.save(&flags)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut flags = self.load()?;
        if flags.remove(key).is_some() {
            self.save(&flags)?;
        }
        Ok(())
    }
}

/// Process-local flags; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryFlagStore {
    flags: BTreeMap<String, String>,
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.flags.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.flags.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.flags.remove(key);
        Ok(())
    }
}
