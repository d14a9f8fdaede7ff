//! Session tracking. [SessionTracker] follows a single focus session through
//! `Idle -> Running <-> Paused -> Idle`, keeps the history of finished sessions and hands
//! snapshots of it to a [persistence::PersistenceModule] running beside it.

pub mod persistence;
pub mod stats;

use std::path::PathBuf;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
    storage::{
        entities::{session_id, SessionRecord},
        kv_store::KeyValueStore,
        session_store::SessionStore,
    },
    utils::{clock::Clock, percentage::Percentage},
};

use persistence::{PersistRequest, PersistenceModule};
use stats::DayFocus;

pub use crate::utils::time::format_focused_time;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("Session {0} is already in progress")]
    SessionInProgress(String),
}

/// What [SessionTracker::start_session] does when a session is already running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StartPolicy {
    /// Drop the unfinished session without recording it and start over.
    #[default]
    Restart,
    /// Keep the running session and report [TrackerError::SessionInProgress].
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone)]
struct InFlightSession {
    id: String,
    start_time: DateTime<Utc>,
}

pub struct SessionTracker {
    sessions: Vec<SessionRecord>,
    current: Option<InFlightSession>,
    pause_start: Option<DateTime<Utc>>,
    total_pause: Duration,
    policy: StartPolicy,
    clock: Box<dyn Clock>,
    persistence: mpsc::UnboundedSender<PersistRequest>,
    worker: Option<JoinHandle<()>>,
}

impl SessionTracker {
    /// Creates a tracker together with the worker that has to be run for anything to be
    /// persisted.
    pub fn new<S: KeyValueStore>(
        store: SessionStore<S>,
        clock: Box<dyn Clock>,
        policy: StartPolicy,
    ) -> (Self, PersistenceModule<S>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let tracker = Self {
            sessions: vec![],
            current: None,
            pause_start: None,
            total_pause: Duration::zero(),
            policy,
            clock,
            persistence: sender,
            worker: None,
        };
        (tracker, PersistenceModule::new(receiver, store))
    }

    /// Same as [SessionTracker::new], with the worker spawned on the current runtime.
    pub fn spawn<S: KeyValueStore>(
        store: SessionStore<S>,
        clock: Box<dyn Clock>,
        policy: StartPolicy,
    ) -> Self {
        let (mut tracker, worker) = Self::new(store, clock, policy);
        tracker.worker = Some(tokio::spawn(worker.run()));
        tracker
    }

    pub fn state(&self) -> TrackerState {
        match (&self.current, self.pause_start) {
            (None, _) => TrackerState::Idle,
            (Some(_), Some(_)) => TrackerState::Paused,
            (Some(_), None) => TrackerState::Running,
        }
    }

    /// Starts a new session and returns its id.
    pub fn start_session(&mut self) -> Result<String, TrackerError> {
        if let Some(current) = &self.current {
            match self.policy {
                StartPolicy::Reject => {
                    return Err(TrackerError::SessionInProgress(current.id.clone()));
                }
                StartPolicy::Restart => {
                    warn!("Discarding unfinished session {}", current.id);
                }
            }
        }

        let now = self.clock.time();
        let id = session_id(now);
        self.current = Some(InFlightSession {
            id: id.clone(),
            start_time: now,
        });
        self.pause_start = None;
        self.total_pause = Duration::zero();
        info!("Session started at {now}");
        Ok(id)
    }

    pub fn pause_session(&mut self) {
        if self.current.is_none() {
            debug!("Pause ignored, no session in progress");
            return;
        }
        if let Some(pause_start) = self.pause_start {
            debug!("Pause ignored, already paused since {pause_start}");
            return;
        }
        let now = self.clock.time();
        self.pause_start = Some(now);
        info!("Session paused at {now}");
    }

    pub fn resume_session(&mut self) {
        if self.current.is_none() {
            debug!("Resume ignored, no session in progress");
            return;
        }
        let Some(pause_start) = self.pause_start.take() else {
            debug!("Resume ignored, session is not paused");
            return;
        };
        let pause = self.clock.time() - pause_start;
        self.total_pause += pause;
        info!(
            "Resumed after pause of {}s, total pause {}s",
            pause.num_milliseconds() as f64 / 1000.,
            self.total_pause.num_milliseconds() as f64 / 1000.
        );
    }

    /// Finishes the running session and records it. An open pause counts as paused time.
    pub fn end_session(&mut self, is_completed: bool) -> Option<SessionRecord> {
        let Some(current) = self.current.take() else {
            debug!("End ignored, no session in progress");
            return None;
        };

        let now = self.clock.time();
        let gross = now - current.start_time;
        let mut total_pause = self.total_pause;
        if let Some(pause_start) = self.pause_start.take() {
            total_pause += now - pause_start;
        }
        let active = gross - total_pause;

        let record = SessionRecord {
            id: current.id,
            start_time: current.start_time,
            end_time: now,
            duration: active.num_seconds().max(0) as u64,
            is_completed,
        };
        info!(
            "Session ended. Active duration {}s (excluding {}s paused), completed: {is_completed}",
            record.duration,
            total_pause.num_milliseconds() as f64 / 1000.
        );

        self.sessions.push(record.clone());
        self.total_pause = Duration::zero();
        self.save_sessions();
        Some(record)
    }

    pub fn skip_session(&mut self) -> Option<SessionRecord> {
        if self.current.is_none() {
            return None;
        }
        self.end_session(false)
    }

    /// Clears history and any running session, then persists the empty history.
    pub fn reset(&mut self) {
        self.sessions.clear();
        self.current = None;
        self.pause_start = None;
        self.total_pause = Duration::zero();
        info!("Session history cleared");
        self.save_sessions();
    }

    /// Queues a full snapshot for saving. Returns before anything is written.
    pub fn save_sessions(&self) {
        self.send(PersistRequest::Save(self.sessions.clone()));
    }

    /// Replaces history with what is stored. Saves queued earlier are written first. Failures
    /// are logged and leave history untouched.
    pub async fn load_sessions(&mut self) {
        let (reply, response) = oneshot::channel();
        if !self.send(PersistRequest::Load(reply)) {
            return;
        }
        match response.await {
            Ok(Ok(Some(sessions))) => {
                debug!("Loaded {} sessions", sessions.len());
                self.sessions = sessions;
            }
            Ok(Ok(None)) => debug!("No stored sessions"),
            Ok(Err(e)) => error!("Error loading sessions: {e:?}"),
            Err(e) => error!("Persistence worker dropped load request: {e}"),
        }
    }

    /// Rewrites the csv mirror from current history and returns the file to share, if the mirror
    /// lives in a file.
    pub async fn export_csv(&self) -> Option<PathBuf> {
        let (reply, response) = oneshot::channel();
        if !self.send(PersistRequest::RefreshCsv(self.sessions.clone(), reply)) {
            return None;
        }
        match response.await {
            Ok(Ok(path)) => path,
            Ok(Err(e)) => {
                error!("Error updating csv: {e:?}");
                None
            }
            Err(e) => {
                error!("Persistence worker dropped csv request: {e}");
                None
            }
        }
    }

    /// Waits until everything queued so far has been persisted (or failed to).
    pub async fn flush(&self) {
        let (reply, response) = oneshot::channel();
        if self.send(PersistRequest::Flush(reply)) {
            let _ = response.await;
        }
    }

    /// Flushes pending saves and stops the worker started by [SessionTracker::spawn].
    pub async fn shutdown(self) {
        self.flush().await;
        let Self {
            persistence,
            worker,
            ..
        } = self;
        drop(persistence);
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                error!("Persistence worker failed {e:?}");
            }
        }
    }

    fn send(&self, request: PersistRequest) -> bool {
        match self.persistence.send(request) {
            Ok(_) => true,
            Err(e) => {
                error!(
                    "Persistence worker is not running, {} lost",
                    e.0.describe()
                );
                false
            }
        }
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    pub fn total_focused_time(&self) -> u64 {
        stats::total_focused_time(&self.sessions)
    }

    pub fn skip_percentage(&self) -> Percentage {
        stats::skip_percentage(&self.sessions)
    }

    pub fn completed_count(&self) -> usize {
        stats::completed_count(&self.sessions)
    }

    pub fn skipped_count(&self) -> usize {
        stats::skipped_count(&self.sessions)
    }

    pub fn sessions_history(&self) -> Vec<SessionRecord> {
        stats::sessions_history(&self.sessions)
    }

    pub fn weekly_breakdown<Tz: TimeZone>(&self, now: DateTime<Tz>) -> Vec<DayFocus> {
        stats::weekly_breakdown(&self.sessions, now)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Result};
    use chrono::Duration;
    use tempfile::tempdir;

    use crate::{
        storage::{
            entities::SessionRecord,
            kv_store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, MockKeyValueStore},
            session_store::{csv_file_target, csv_key_value_target, SessionStore, SESSIONS_KEY},
        },
        utils::{
            clock::{
                test_clock::{test_start, ManualClock},
                Clock,
            },
            logging::TEST_LOGGING,
        },
    };

    use super::{format_focused_time, SessionTracker, StartPolicy, TrackerError, TrackerState};

    fn memory_tracker(
        kv: MemoryKeyValueStore,
        policy: StartPolicy,
    ) -> (SessionTracker, ManualClock) {
        let clock = ManualClock::new(test_start());
        let tracker = SessionTracker::spawn(
            SessionStore::new(kv, csv_key_value_target()),
            Box::new(clock.clone()),
            policy,
        );
        (tracker, clock)
    }

    #[tokio::test]
    async fn test_pause_resume_scenario() -> Result<()> {
        *TEST_LOGGING;
        let (mut tracker, clock) = memory_tracker(MemoryKeyValueStore::new(), StartPolicy::Restart);

        tracker.start_session()?;
        assert_eq!(tracker.state(), TrackerState::Running);
        clock.advance_secs(10);
        tracker.pause_session();
        assert_eq!(tracker.state(), TrackerState::Paused);
        clock.advance_secs(30);
        tracker.resume_session();
        clock.advance_secs(60);
        let record = tracker.end_session(true).unwrap();

        assert_eq!(record.duration, 70);
        assert!(record.is_completed);
        assert_eq!(record.start_time, test_start());
        assert_eq!(record.end_time, test_start() + Duration::seconds(100));
        assert_eq!(record.id, test_start().timestamp_millis().to_string());
        assert_eq!(tracker.state(), TrackerState::Idle);
        assert_eq!(tracker.sessions(), &[record]);

        tracker.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_skip_without_pauses() -> Result<()> {
        let (mut tracker, clock) = memory_tracker(MemoryKeyValueStore::new(), StartPolicy::Restart);

        tracker.start_session()?;
        clock.advance_secs(5);
        let record = tracker.skip_session().unwrap();

        assert_eq!(record.duration, 5);
        assert!(!record.is_completed);
        assert_eq!(tracker.skip_session(), None);

        tracker.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_duration_floors_partial_seconds() -> Result<()> {
        let (mut tracker, clock) = memory_tracker(MemoryKeyValueStore::new(), StartPolicy::Restart);

        tracker.start_session()?;
        clock.advance(Duration::milliseconds(2500));
        tracker.pause_session();
        clock.advance(Duration::milliseconds(700));
        tracker.resume_session();
        clock.advance(Duration::milliseconds(1999));
        // 5199ms elapsed, 700ms of it paused.
        assert_eq!(tracker.end_session(true).unwrap().duration, 4);

        tracker.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_multiple_pauses() -> Result<()> {
        let (mut tracker, clock) = memory_tracker(MemoryKeyValueStore::new(), StartPolicy::Restart);

        tracker.start_session()?;
        for _ in 0..3 {
            clock.advance_secs(100);
            tracker.pause_session();
            clock.advance_secs(20);
            tracker.resume_session();
        }
        clock.advance_secs(40);

        assert_eq!(tracker.end_session(false).unwrap().duration, 340);
        tracker.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_end_while_paused() -> Result<()> {
        let (mut tracker, clock) = memory_tracker(MemoryKeyValueStore::new(), StartPolicy::Restart);

        tracker.start_session()?;
        clock.advance_secs(50);
        tracker.pause_session();
        clock.advance_secs(1000);
        let record = tracker.end_session(true).unwrap();

        assert_eq!(record.duration, 50);
        assert_eq!(tracker.state(), TrackerState::Idle);

        // The open pause must not leak into the next session.
        tracker.start_session()?;
        clock.advance_secs(10);
        assert_eq!(tracker.end_session(true).unwrap().duration, 10);

        tracker.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_resume_without_pause_is_noop() -> Result<()> {
        let (mut tracker, clock) = memory_tracker(MemoryKeyValueStore::new(), StartPolicy::Restart);

        tracker.resume_session();
        tracker.pause_session();
        assert_eq!(tracker.state(), TrackerState::Idle);

        tracker.start_session()?;
        clock.advance_secs(10);
        tracker.resume_session();
        assert_eq!(tracker.total_pause, Duration::zero());
        clock.advance_secs(10);

        assert_eq!(tracker.end_session(true).unwrap().duration, 20);
        assert_eq!(tracker.end_session(true), None);
        assert_eq!(tracker.sessions().len(), 1);

        tracker.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_double_pause_keeps_first_pause_start() -> Result<()> {
        let (mut tracker, clock) = memory_tracker(MemoryKeyValueStore::new(), StartPolicy::Restart);

        tracker.start_session()?;
        clock.advance_secs(10);
        tracker.pause_session();
        clock.advance_secs(20);
        tracker.pause_session();
        clock.advance_secs(20);
        tracker.resume_session();
        clock.advance_secs(10);

        assert_eq!(tracker.end_session(true).unwrap().duration, 20);
        tracker.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_clock_going_backwards_clamps_to_zero() -> Result<()> {
        let (mut tracker, clock) = memory_tracker(MemoryKeyValueStore::new(), StartPolicy::Restart);

        tracker.start_session()?;
        clock.set(test_start() - Duration::hours(1));

        assert_eq!(tracker.end_session(true).unwrap().duration, 0);
        tracker.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_restart_policy_discards_running_session() -> Result<()> {
        let (mut tracker, clock) = memory_tracker(MemoryKeyValueStore::new(), StartPolicy::Restart);

        let first = tracker.start_session()?;
        clock.advance_secs(10);
        tracker.pause_session();
        clock.advance_secs(10);
        let second = tracker.start_session()?;
        assert_ne!(first, second);
        assert_eq!(tracker.state(), TrackerState::Running);
        clock.advance_secs(15);

        let record = tracker.end_session(true).unwrap();
        assert_eq!(record.id, second);
        assert_eq!(record.duration, 15);
        assert_eq!(tracker.sessions().len(), 1);

        tracker.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_reject_policy_keeps_running_session() -> Result<()> {
        let (mut tracker, clock) = memory_tracker(MemoryKeyValueStore::new(), StartPolicy::Reject);

        let first = tracker.start_session()?;
        clock.advance_secs(10);
        assert_eq!(
            tracker.start_session(),
            Err(TrackerError::SessionInProgress(first.clone()))
        );
        clock.advance_secs(15);

        let record = tracker.end_session(true).unwrap();
        assert_eq!(record.id, first);
        assert_eq!(record.duration, 25);

        tracker.start_session()?;
        tracker.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_aggregates() -> Result<()> {
        let (mut tracker, clock) = memory_tracker(MemoryKeyValueStore::new(), StartPolicy::Restart);
        assert_eq!(*tracker.skip_percentage(), 0.);
        assert_eq!(tracker.total_focused_time(), 0);

        for (seconds, completed) in [(1500, true), (300, false), (1500, true), (60, false)] {
            tracker.start_session()?;
            clock.advance_secs(seconds);
            tracker.end_session(completed);
            clock.advance_secs(60);
        }

        assert_eq!(tracker.total_focused_time(), 3360);
        assert_eq!(*tracker.skip_percentage(), 50.);
        assert_eq!(tracker.completed_count(), 2);
        assert_eq!(tracker.skipped_count(), 2);
        assert_eq!(format_focused_time(tracker.total_focused_time()), "56m 0s");

        let history = tracker.sessions_history();
        assert_eq!(history.len(), 4);
        assert!(history.windows(2).all(|v| v[0].start_time >= v[1].start_time));
        assert_eq!(tracker.sessions()[0].duration, 1500);

        let week = tracker.weekly_breakdown(clock.time());
        assert_eq!(week[6].total_seconds(), 3360);

        tracker.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_rapid_completions_persist_last_snapshot() -> Result<()> {
        let kv = MemoryKeyValueStore::new();
        let (mut tracker, clock) = memory_tracker(kv.clone(), StartPolicy::Restart);

        for _ in 0..50 {
            tracker.start_session()?;
            clock.advance_secs(1);
            tracker.end_session(true);
        }
        tracker.flush().await;

        let stored = kv.get(SESSIONS_KEY).await?.unwrap();
        let stored: Vec<SessionRecord> = serde_json::from_str(&stored)?;
        assert_eq!(stored.len(), 50);
        assert_eq!(stored, tracker.sessions());

        tracker.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_clears_history_and_storage() -> Result<()> {
        let kv = MemoryKeyValueStore::new();
        let (mut tracker, clock) = memory_tracker(kv.clone(), StartPolicy::Restart);

        tracker.start_session()?;
        clock.advance_secs(30);
        tracker.end_session(true);
        tracker.start_session()?;
        tracker.reset();

        assert!(tracker.sessions_history().is_empty());
        assert_eq!(tracker.state(), TrackerState::Idle);

        tracker.load_sessions().await;
        assert!(tracker.sessions_history().is_empty());
        tracker.shutdown().await;

        let (mut reloaded, _) = memory_tracker(kv, StartPolicy::Restart);
        reloaded.load_sessions().await;
        assert!(reloaded.sessions_history().is_empty());
        reloaded.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_round_trip_through_restart() -> Result<()> {
        let dir = tempdir()?;
        let clock = ManualClock::new(test_start());
        let mut tracker = SessionTracker::spawn(
            SessionStore::new(
                FileKeyValueStore::new(dir.path().join("store"))?,
                csv_file_target(dir.path()),
            ),
            Box::new(clock.clone()),
            StartPolicy::Restart,
        );
        for (seconds, completed) in [(1500, true), (42, false), (900, true)] {
            tracker.start_session()?;
            clock.advance_secs(seconds);
            tracker.end_session(completed);
        }
        let before = tracker.sessions().to_vec();
        tracker.shutdown().await;

        let mut restarted = SessionTracker::spawn(
            SessionStore::new(
                FileKeyValueStore::new(dir.path().join("store"))?,
                csv_file_target(dir.path()),
            ),
            Box::new(clock.clone()),
            StartPolicy::Restart,
        );
        assert!(restarted.sessions().is_empty());
        restarted.load_sessions().await;
        assert_eq!(restarted.sessions(), before.as_slice());

        let csv = std::fs::read_to_string(dir.path().join("sessions.csv"))?;
        assert_eq!(csv.lines().count(), 4);

        restarted.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_file_save_keeps_earlier_history() -> Result<()> {
        let dir = tempdir()?;
        let clock = ManualClock::new(test_start());
        let open = |clock: &ManualClock| -> Result<SessionTracker> {
            Ok(SessionTracker::spawn(
                SessionStore::new(
                    FileKeyValueStore::new(dir.path().join("store"))?,
                    csv_file_target(dir.path()),
                ),
                Box::new(clock.clone()),
                StartPolicy::Restart,
            ))
        };

        let mut tracker = open(&clock)?;
        for seconds in [1500, 1500, 1500] {
            tracker.start_session()?;
            clock.advance_secs(seconds);
            tracker.end_session(true);
        }
        tracker.flush().await;

        let staging = dir.path().join("store").join(format!("~{SESSIONS_KEY}.tmp"));
        std::fs::create_dir(&staging)?;
        tracker.start_session()?;
        clock.advance_secs(60);
        tracker.end_session(true);
        tracker.shutdown().await;
        std::fs::remove_dir(&staging)?;

        let mut restarted = open(&clock)?;
        restarted.load_sessions().await;
        assert_eq!(restarted.sessions().len(), 3);

        restarted.start_session()?;
        clock.advance_secs(60);
        restarted.end_session(true);
        restarted.shutdown().await;

        let mut reloaded = open(&clock)?;
        reloaded.load_sessions().await;
        assert_eq!(reloaded.sessions().len(), 4);
        reloaded.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_export_csv_returns_file() -> Result<()> {
        let dir = tempdir()?;
        let clock = ManualClock::new(test_start());
        let mut tracker = SessionTracker::spawn(
            SessionStore::new(MemoryKeyValueStore::new(), csv_file_target(dir.path())),
            Box::new(clock.clone()),
            StartPolicy::Restart,
        );
        tracker.start_session()?;
        clock.advance_secs(3);
        tracker.end_session(true);

        let path = tracker.export_csv().await.unwrap();
        assert_eq!(path, dir.path().join("sessions.csv"));
        let csv = std::fs::read_to_string(path)?;
        assert!(csv.starts_with("id,startTime,endTime,duration,isCompleted\n"));
        assert!(csv.ends_with(",3,true\n"));

        tracker.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_save_keeps_memory_state() -> Result<()> {
        *TEST_LOGGING;
        let mut kv = MockKeyValueStore::new();
        kv.expect_set().returning(|_, _| Err(anyhow!("read only")));
        kv.expect_get().returning(|_| Err(anyhow!("unreadable")));

        let clock = ManualClock::new(test_start());
        let mut tracker = SessionTracker::spawn(
            SessionStore::new(kv, csv_key_value_target()),
            Box::new(clock.clone()),
            StartPolicy::Restart,
        );
        tracker.start_session()?;
        clock.advance_secs(12);
        tracker.end_session(true);
        tracker.flush().await;

        assert_eq!(tracker.sessions().len(), 1);

        tracker.load_sessions().await;
        assert_eq!(tracker.sessions().len(), 1);
        assert_eq!(tracker.export_csv().await, None);

        tracker.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupted_store_leaves_history() -> Result<()> {
        let kv = MemoryKeyValueStore::new();
        let (mut tracker, clock) = memory_tracker(kv.clone(), StartPolicy::Restart);
        tracker.start_session()?;
        clock.advance_secs(1);
        tracker.end_session(false);
        tracker.flush().await;

        kv.set(SESSIONS_KEY, "[{\"id\": 1}]").await?;
        tracker.load_sessions().await;
        assert_eq!(tracker.sessions().len(), 1);

        tracker.shutdown().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_without_worker_lifecycle_still_works() -> Result<()> {
        let clock = ManualClock::new(test_start());
        let (mut tracker, worker) = SessionTracker::new(
            SessionStore::new(MemoryKeyValueStore::new(), csv_key_value_target()),
            Box::new(clock.clone()),
            StartPolicy::Restart,
        );
        drop(worker);

        tracker.start_session()?;
        clock.advance_secs(7);
        assert_eq!(tracker.end_session(true).unwrap().duration, 7);
        tracker.load_sessions().await;
        assert_eq!(tracker.sessions().len(), 1);
        tracker.flush().await;
        Ok(())
    }
}
