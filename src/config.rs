use std::{io::ErrorKind, path::Path};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::{
    storage::{
        csv::CsvTarget,
        session_store::{csv_file_target, csv_key_value_target},
    },
    tracker::StartPolicy,
};

pub const CONFIG_FILE: &str = "config.json";
const SUPPORTED_SCHEMA: u8 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CsvTargetKind {
    #[default]
    File,
    KeyValue,
}

/// Optional `config.json` inside the data directory. Every field falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub schema: u8,
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub start_policy: StartPolicy,
    pub csv_target: CsvTargetKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: SUPPORTED_SCHEMA,
            work_minutes: 25,
            break_minutes: 5,
            start_policy: StartPolicy::default(),
            csv_target: CsvTargetKind::default(),
        }
    }
}

impl Config {
    pub fn csv_target(&self, data_dir: &Path) -> CsvTarget {
        match self.csv_target {
            CsvTargetKind::File => csv_file_target(data_dir),
            CsvTargetKind::KeyValue => csv_key_value_target(),
        }
    }

    fn validate(self) -> Result<Self> {
        if self.schema != SUPPORTED_SCHEMA {
            return Err(anyhow!("Unsupported config schema {}", self.schema));
        }
        if self.work_minutes == 0 || self.break_minutes == 0 {
            return Err(anyhow!("Interval lengths must be at least a minute"));
        }
        Ok(self)
    }
}

pub fn load_config(data_dir: &Path) -> Result<Config> {
    let path = data_dir.join(CONFIG_FILE);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No config at {path:?}, using defaults");
            return Ok(Config::default());
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to read {path:?}")),
    };
    serde_json::from_str::<Config>(&raw)
        .with_context(|| format!("Invalid config in {path:?}"))?
        .validate()
        .with_context(|| format!("Invalid config in {path:?}"))
}
