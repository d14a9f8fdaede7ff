use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::debug;

/// Interface for abstracting a durable string store. Values are always replaced as a whole.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns `None` when nothing was stored under `key` yet.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[cfg(test)]
mockall::mock! {
    pub KeyValueStore {}

    #[async_trait]
    impl KeyValueStore for KeyValueStore {
        async fn get(&self, key: &str) -> Result<Option<String>>;

        async fn set(&self, key: &str, value: &str) -> Result<()>;
    }
}

/// The main realization of [KeyValueStore]. Each key is a file inside `store_dir`.
pub struct FileKeyValueStore {
    store_dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(store_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&store_dir)?;

        Ok(Self { store_dir })
    }

    fn file_name(key: &str) -> Result<String> {
        if key.is_empty() || key == "." || key == ".." {
            return Err(anyhow!("Key {key:?} can't be used as a file name"));
        }
        Ok(key
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '@' | '.' => c,
                _ => '_',
            })
            .collect())
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        Ok(self.store_dir.join(Self::file_name(key)?))
    }

    /// New values are written here first. `~` never survives [Self::file_name], so a staging file
    /// can't collide with a key.
    fn staging_path(&self, key: &str) -> Result<PathBuf> {
        Ok(self.store_dir.join(format!("~{}.tmp", Self::file_name(key)?)))
    }

    async fn read_locked(path: &Path) -> Result<String, std::io::Error> {
        let mut file = File::open(path).await?;
        file.lock_shared()?;
        let mut value = String::new();
        let result = file.read_to_string(&mut value).await;
        file.unlock_async().await?;
        result.map(|_| value)
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        debug!("Reading {path:?}");
        match Self::read_locked(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)?,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        let staging = self.staging_path(key)?;
        debug!("Writing {} bytes into {path:?}", value.len());

        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&staging)
            .await?;

        // The key file is only ever replaced by a rename, so it holds either the previous or the
        // new value in full.
        file.lock_exclusive()?;
        let result = async {
            file.set_len(0).await?;
            file.write_all(value.as_bytes()).await?;
            file.flush().await?;
            file.sync_data().await?;
            tokio::fs::rename(&staging, &path).await
        }
        .await;
        file.unlock_async().await?;
        result?;
        Ok(())
    }
}

/// Volatile store, used when there is no data directory to write into and in tests. Clones share
/// the same contents.
#[derive(Clone, Default)]
pub struct MemoryKeyValueStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow!("Memory store was poisoned"))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow!("Memory store was poisoned"))?;
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
