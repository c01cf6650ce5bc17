// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::db;

pub const DATA_DIR_ENV: &str = "LEDGE_DATA_DIR";
pub const FLAGS_FILE: &str = "flags.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Seed sample transactions along with the default categories.
    pub seed_samples: bool,
}

impl Config {
    /// `--data-dir`, then `LEDGE_DATA_DIR`, then the platform data dir.
    pub fn from_matches(m: &clap::ArgMatches) -> Result<Self> {
        let data_dir = match m
            .get_one::<String>("data-dir")
            .map(|s| s.trim().to_string())
            .or_else(|| std::env::var(DATA_DIR_ENV).ok())
            .filter(|s| !s.is_empty())
        {
            Some(dir) => {
                let dir = PathBuf::from(dir);
                fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create data dir {}", dir.display()))?;
                dir
            }
            None => db::default_data_dir()?,
        };
        Ok(Self {
            data_dir,
            seed_samples: m.get_flag("with-samples"),
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(db::DB_FILE)
    }

    pub fn flags_path(&self) -> PathBuf {
        self.data_dir.join(FLAGS_FILE)
    }
}
