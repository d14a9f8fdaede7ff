use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::storage::{entities::SessionRecord, kv_store::KeyValueStore, session_store::SessionStore};

/// Work the tracker hands over to the persistence worker. Requests are applied one by one in the
/// order they were sent, so a later snapshot can never be overwritten by an earlier one.
#[derive(Debug)]
pub enum PersistRequest {
    Save(Vec<SessionRecord>),
    Load(oneshot::Sender<Result<Option<Vec<SessionRecord>>>>),
    /// Regenerates the csv mirror and answers with its path, if it has one.
    RefreshCsv(Vec<SessionRecord>, oneshot::Sender<Result<Option<PathBuf>>>),
    /// Answered once every earlier request has been handled.
    Flush(oneshot::Sender<()>),
}

impl PersistRequest {
    /// Short form for logs, without the session snapshot itself.
    pub fn describe(&self) -> String {
        match self {
            PersistRequest::Save(sessions) => format!("save of {} sessions", sessions.len()),
            PersistRequest::Load(_) => "load".to_string(),
            PersistRequest::RefreshCsv(sessions, _) => {
                format!("csv refresh of {} sessions", sessions.len())
            }
            PersistRequest::Flush(_) => "flush".to_string(),
        }
    }
}

/// Represents the single writer of the session store. It is the only place that touches storage.
pub struct PersistenceModule<S: KeyValueStore> {
    receiver: mpsc::UnboundedReceiver<PersistRequest>,
    store: SessionStore<S>,
}

impl<S: KeyValueStore> PersistenceModule<S> {
    pub fn new(receiver: mpsc::UnboundedReceiver<PersistRequest>, store: SessionStore<S>) -> Self {
        Self { receiver, store }
    }

    /// Runs until every sender is dropped.
    pub async fn run(mut self) {
        while let Some(request) = self.receiver.recv().await {
            self.process_next(request).await;
        }
        self.receiver.close();
        debug!("Persistence worker stopped");
    }

    async fn process_next(&mut self, request: PersistRequest) {
        match request {
            PersistRequest::Save(sessions) => match self.store.save(&sessions).await {
                Ok(_) => info!("Saved {} sessions", sessions.len()),
                Err(e) => error!("Error saving sessions: {e:?}"),
            },
            PersistRequest::Load(reply) => {
                let result = self.store.load().await;
                if reply.send(result).is_err() {
                    debug!("Nobody is waiting for loaded sessions");
                }
            }
            PersistRequest::RefreshCsv(sessions, reply) => {
                let result = self
                    .store
                    .refresh_csv(&sessions)
                    .await
                    .map(|_| self.store.csv_path());
                if reply.send(result).is_err() {
                    debug!("Nobody is waiting for the csv export");
                }
            }
            PersistRequest::Flush(reply) => {
                let _ = reply.send(());
            }
        }
    }
}
