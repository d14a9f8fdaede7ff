use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use super::{entities::SessionRecord, kv_store::KeyValueStore};

pub const CSV_HEADER: &str = "id,startTime,endTime,duration,isCompleted";

/// Where the csv mirror goes. Environments without a filesystem keep it in the key-value store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvTarget {
    File(PathBuf),
    KeyValue(String),
}

impl CsvTarget {
    /// Path handed out for exporting. Key-value mirrors have nothing to share.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            CsvTarget::File(path) => Some(path),
            CsvTarget::KeyValue(_) => None,
        }
    }
}

/// Projects the session list into csv, in list order. Values are never quoted since none of the
/// fields can contain a comma.
pub fn render_csv(sessions: &[SessionRecord]) -> String {
    let mut csv = String::with_capacity(CSV_HEADER.len() + 1 + sessions.len() * 80);
    csv.push_str(CSV_HEADER);
    csv.push('\n');
    for session in sessions {
        csv.push_str(&session.csv_row());
        csv.push('\n');
    }
    csv
}

pub async fn write_csv(
    target: &CsvTarget,
    store: &impl KeyValueStore,
    sessions: &[SessionRecord],
) -> Result<()> {
    let csv = render_csv(sessions);
    match target {
        CsvTarget::File(path) => {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, csv).await?;
            info!("Csv updated at {path:?}");
        }
        CsvTarget::KeyValue(key) => {
            store.set(key, &csv).await?;
            info!("Csv stored under {key}");
        }
    }
    Ok(())
}
