//! Per-user progress records in the remote store.
//!
//! Initialization is best-effort: a record that already exists counts as
//! success, and any other failure is logged and swallowed so that a flaky
//! backend never blocks the practice session.

use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::remote::{from_record, to_record, Query, RemoteError, RemoteErrorKind, RemoteStore};
use crate::app::domain::progress::{UserProgress, XP_PER_CORRECT_ANSWER};

pub const PROGRESS_COLLECTION: &str = "user_progress";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created,
    AlreadyExisted,
    /// Gave up; the failure was logged.
    Failed,
}

/// Bounded, log-only retry for background initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    /// Only failures that can plausibly clear up on their own are retried.
    pub fn is_retryable(error: &RemoteError) -> bool {
        matches!(error.kind, RemoteErrorKind::Transport | RemoteErrorKind::Server)
    }
}

/// Create the starting record for `user_id`. An existing record is not a
/// failure and is left untouched.
pub fn create_progress(
    store: &dyn RemoteStore,
    user_id: u64,
    today: NaiveDate,
) -> Result<EnsureOutcome, RemoteError> {
    let record = to_record(&UserProgress::new(user_id, today))?;
    match store.insert(PROGRESS_COLLECTION, record) {
        Ok(_) => {
            info!(user_id, "created progress record");
            Ok(EnsureOutcome::Created)
        }
        Err(e) if e.is_conflict() => {
            info!(user_id, "progress record already exists");
            Ok(EnsureOutcome::AlreadyExisted)
        }
        Err(e) => Err(e),
    }
}

/// `create_progress` with retries. Never returns an error.
pub fn ensure_progress(
    store: &dyn RemoteStore,
    user_id: u64,
    today: NaiveDate,
    policy: RetryPolicy,
) -> EnsureOutcome {
    let attempts = policy.max_attempts.max(1);
    for attempt in 1..=attempts {
        match create_progress(store, user_id, today) {
            Ok(outcome) => return outcome,
            Err(e) if attempt < attempts && RetryPolicy::is_retryable(&e) => {
                warn!(user_id, attempt, "progress init failed, retrying: {}", e);
                thread::sleep(policy.backoff);
            }
            Err(e) => {
                warn!(user_id, attempt, "progress init failed, giving up: {}", e);
                return EnsureOutcome::Failed;
            }
        }
    }
    EnsureOutcome::Failed
}

pub fn fetch_progress(
    store: &dyn RemoteStore,
    user_id: u64,
) -> Result<Option<UserProgress>, RemoteError> {
    let query = Query::new(PROGRESS_COLLECTION).where_eq("user_id", user_id).limit(1);
    store
        .select(&query)?
        .into_iter()
        .next()
        .map(from_record)
        .transpose()
}

/// Apply one answered card to the user's record: streak for today, XP if
/// correct. Creates the record first if the user has none yet.
pub fn record_answer(
    store: &dyn RemoteStore,
    user_id: u64,
    correct: bool,
    today: NaiveDate,
) -> Result<UserProgress, RemoteError> {
    let mut progress = match fetch_progress(store, user_id)? {
        Some(p) => p,
        None => {
            create_progress(store, user_id, today)?;
            fetch_progress(store, user_id)?.unwrap_or_else(|| UserProgress::new(user_id, today))
        }
    };

    progress.record_activity(today);
    if correct {
        progress.award_xp(XP_PER_CORRECT_ANSWER);
    }

    let mut patch = to_record(&progress)?;
    patch.remove("user_id");
    let selector = Query::new(PROGRESS_COLLECTION).where_eq("user_id", user_id);
    store.update(&selector, patch)?;

    Ok(progress)
}

enum ProgressJob {
    Ensure { today: NaiveDate, policy: RetryPolicy },
    Answer { correct: bool, today: NaiveDate },
}

/// Handle to the one thread that writes a user's progress record.
///
/// Jobs run in submission order, so two answers never read the same
/// record before either has written it back. Dropping the handle closes
/// the queue; the worker drains what is left and exits.
pub struct ProgressRecorder {
    user_id: u64,
    jobs: Option<Sender<ProgressJob>>,
    worker: Option<JoinHandle<()>>,
}

impl ProgressRecorder {
    /// `on_update` runs on the worker after every successful write.
    pub fn spawn<F>(store: Arc<dyn RemoteStore>, user_id: u64, on_update: F) -> Self
    where
        F: Fn(UserProgress) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<ProgressJob>();

        let spawned = thread::Builder::new()
            .name("progress-writer".into())
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    match job {
                        ProgressJob::Ensure { today, policy } => {
                            ensure_progress(store.as_ref(), user_id, today, policy);
                            match fetch_progress(store.as_ref(), user_id) {
                                Ok(Some(progress)) => on_update(progress),
                                Ok(None) => debug!(user_id, "no progress record to show"),
                                Err(e) => warn!(user_id, "Failed to read progress: {}", e),
                            }
                        }
                        ProgressJob::Answer { correct, today } => {
                            match record_answer(store.as_ref(), user_id, correct, today) {
                                Ok(progress) => on_update(progress),
                                Err(e) => warn!(user_id, "Failed to record answer: {}", e),
                            }
                        }
                    }
                }
                debug!(user_id, "progress writer stopped");
            });

        match spawned {
            Ok(worker) => Self {
                user_id,
                jobs: Some(tx),
                worker: Some(worker),
            },
            Err(e) => {
                warn!(user_id, "Failed to start progress writer: {}", e);
                Self {
                    user_id,
                    jobs: None,
                    worker: None,
                }
            }
        }
    }

    /// Queue the best-effort create, followed by a read of the record.
    pub fn ensure(&self, today: NaiveDate, policy: RetryPolicy) -> bool {
        self.send(ProgressJob::Ensure { today, policy })
    }

    /// Queue one answered card. False when the writer is gone.
    pub fn submit(&self, correct: bool, today: NaiveDate) -> bool {
        self.send(ProgressJob::Answer { correct, today })
    }

    fn send(&self, job: ProgressJob) -> bool {
        let queued = self.jobs.as_ref().is_some_and(|tx| tx.send(job).is_ok());
        if !queued {
            warn!(user_id = self.user_id, "progress writer unavailable, update dropped");
        }
        queued
    }

    /// Close the queue and wait until every queued job has run.
    pub fn finish(mut self) {
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!(user_id = self.user_id, "progress writer panicked");
            }
        }
    }
}

impl Drop for ProgressRecorder {
    fn drop(&mut self) {
        self.jobs.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::remote::{MemoryStore, Record};
    use std::sync::Mutex;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn store() -> MemoryStore {
        MemoryStore::new().with_unique(PROGRESS_COLLECTION, "user_id")
    }

    fn quick() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            backoff: Duration::ZERO,
        }
    }

    #[test]
    fn test_create_then_existing() {
        let store = store();
        assert_eq!(create_progress(&store, 42, today()).unwrap(), EnsureOutcome::Created);
        assert_eq!(
            create_progress(&store, 42, today()).unwrap(),
            EnsureOutcome::AlreadyExisted
        );
        assert_eq!(store.count(PROGRESS_COLLECTION), 1);
    }

    #[test]
    fn test_new_record_fields() {
        let store = store();
        create_progress(&store, 42, today()).unwrap();
        let p = fetch_progress(&store, 42).unwrap().unwrap();
        assert_eq!(p, UserProgress::new(42, today()));
    }

    #[test]
    fn test_ensure_retries_transient_failures() {
        let store = store();
        store.inject_failure(RemoteError::new(RemoteErrorKind::Transport, "timeout"));
        store.inject_failure(RemoteError::new(RemoteErrorKind::Server, "503"));

        assert_eq!(ensure_progress(&store, 7, today(), quick()), EnsureOutcome::Created);
        assert_eq!(store.count(PROGRESS_COLLECTION), 1);
    }

    #[test]
    fn test_ensure_gives_up_after_bound() {
        let store = store();
        for _ in 0..3 {
            store.inject_failure(RemoteError::new(RemoteErrorKind::Transport, "down"));
        }
        assert_eq!(ensure_progress(&store, 7, today(), quick()), EnsureOutcome::Failed);
        assert_eq!(store.count(PROGRESS_COLLECTION), 0);
    }

    #[test]
    fn test_ensure_does_not_retry_auth_failure() {
        let store = store();
        store.inject_failure(RemoteError::new(RemoteErrorKind::Unauthorized, "bad key"));
        assert_eq!(ensure_progress(&store, 7, today(), quick()), EnsureOutcome::Failed);
        // The next call would have succeeded; no retry consumed it.
        assert_eq!(store.count(PROGRESS_COLLECTION), 0);
    }

    #[test]
    fn test_fetch_missing_user() {
        assert_eq!(fetch_progress(&store(), 99).unwrap(), None);
    }

    #[test]
    fn test_record_answer_awards_xp_and_streak() {
        let store = store();
        create_progress(&store, 42, today()).unwrap();

        let p = record_answer(&store, 42, true, today()).unwrap();
        assert_eq!(p.total_xp, XP_PER_CORRECT_ANSWER);
        assert_eq!(p.current_streak, 1);

        let p = record_answer(&store, 42, false, today().succ_opt().unwrap()).unwrap();
        assert_eq!(p.total_xp, XP_PER_CORRECT_ANSWER);
        assert_eq!(p.current_streak, 2);

        let stored = fetch_progress(&store, 42).unwrap().unwrap();
        assert_eq!(stored, p);
        assert_eq!(store.count(PROGRESS_COLLECTION), 1);
    }

    #[test]
    fn test_record_answer_creates_missing_record() {
        let store = store();
        let p = record_answer(&store, 5, true, today()).unwrap();
        assert_eq!(p.user_id, 5);
        assert_eq!(p.total_xp, XP_PER_CORRECT_ANSWER);
        assert_eq!(store.count(PROGRESS_COLLECTION), 1);
    }

    /// Delays reads so overlapping writers would both see the old record.
    struct SlowReads {
        inner: MemoryStore,
        delay: Duration,
    }

    impl RemoteStore for SlowReads {
        fn select(&self, query: &Query) -> Result<Vec<Record>, RemoteError> {
            thread::sleep(self.delay);
            self.inner.select(query)
        }

        fn insert(&self, collection: &str, record: Record) -> Result<Record, RemoteError> {
            self.inner.insert(collection, record)
        }

        fn update(&self, query: &Query, patch: Record) -> Result<Vec<Record>, RemoteError> {
            self.inner.update(query, patch)
        }
    }

    #[test]
    fn test_recorder_serializes_answers() {
        let slow = Arc::new(SlowReads {
            inner: store(),
            delay: Duration::from_millis(30),
        });
        create_progress(slow.as_ref(), 42, today()).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let recorder = ProgressRecorder::spawn(slow.clone(), 42, move |p| {
            sink.lock().unwrap().push(p.total_xp)
        });

        assert!(recorder.submit(true, today()));
        assert!(recorder.submit(true, today()));
        recorder.finish();

        assert_eq!(*seen.lock().unwrap(), vec![10, 20]);
        let stored = fetch_progress(slow.as_ref(), 42).unwrap().unwrap();
        assert_eq!(stored.total_xp, 2 * XP_PER_CORRECT_ANSWER);
    }

    #[test]
    fn test_recorder_ensure_then_answer() {
        let store = Arc::new(store());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let recorder = ProgressRecorder::spawn(store.clone(), 9, move |p| sink.lock().unwrap().push(p));

        assert!(recorder.ensure(today(), quick()));
        assert!(recorder.submit(false, today()));
        recorder.finish();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], UserProgress::new(9, today()));
        assert_eq!(seen[1].current_streak, 1);
        assert_eq!(seen[1].total_xp, 0);
        assert_eq!(store.count(PROGRESS_COLLECTION), 1);
    }
}
