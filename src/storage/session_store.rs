use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::{
    csv::{write_csv, CsvTarget},
    entities::SessionRecord,
    kv_store::KeyValueStore,
};

pub const SESSIONS_KEY: &str = "@zendoro_sessions";
pub const CSV_KEY: &str = "zendoro_sessions_csv";
pub const CSV_FILE_NAME: &str = "sessions.csv";

/// Default csv mirror for a data directory.
pub fn csv_file_target(data_dir: &Path) -> CsvTarget {
    CsvTarget::File(data_dir.join(CSV_FILE_NAME))
}

pub fn csv_key_value_target() -> CsvTarget {
    CsvTarget::KeyValue(CSV_KEY.to_string())
}

/// Binds the authoritative session list in a [KeyValueStore] with its csv mirror.
pub struct SessionStore<S: KeyValueStore> {
    store: S,
    csv_target: CsvTarget,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S, csv_target: CsvTarget) -> Self {
        Self { store, csv_target }
    }

    /// `None` means nothing was ever saved, which is different from an empty history.
    pub async fn load(&self) -> Result<Option<Vec<SessionRecord>>> {
        let Some(raw) = self.store.get(SESSIONS_KEY).await? else {
            debug!("No sessions stored under {SESSIONS_KEY}");
            return Ok(None);
        };
        let sessions = serde_json::from_str::<Vec<SessionRecord>>(&raw)
            .with_context(|| format!("Stored value under {SESSIONS_KEY} is not a session list"))?;
        Ok(Some(sessions))
    }

    /// Overwrites the whole list, then regenerates the csv mirror from it.
    pub async fn save(&self, sessions: &[SessionRecord]) -> Result<()> {
        let raw = serde_json::to_string(sessions)?;
        self.store.set(SESSIONS_KEY, &raw).await?;
        self.refresh_csv(sessions).await
    }

    pub async fn refresh_csv(&self, sessions: &[SessionRecord]) -> Result<()> {
        write_csv(&self.csv_target, &self.store, sessions)
            .await
            .context("Failed to update csv mirror")
    }

    pub fn csv_path(&self) -> Option<PathBuf> {
        self.csv_target.path().cloned()
    }
}
