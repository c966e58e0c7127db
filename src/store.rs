//! Document-style record store.
//!
//! Four collections (stacks, resources, quizzes, attempts) kept in memory behind
//! `RwLock`s, with an optional JSON snapshot on disk. Operations mirror a
//! document database: find-by-id, find-by-filter, insert, update-by-id,
//! delete-by-id, delete-many. Last write wins; there is no optimistic locking.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument};

use crate::domain::{Quiz, QuizAttempt, Resource, Stack};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot format error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Anything stored in a `Collection` is addressed by a string id.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    fn id(&self) -> &str;
}

impl Record for Stack {
    fn id(&self) -> &str {
        &self.id
    }
}
impl Record for Resource {
    fn id(&self) -> &str {
        &self.id
    }
}
impl Record for Quiz {
    fn id(&self) -> &str {
        &self.id
    }
}
impl Record for QuizAttempt {
    fn id(&self) -> &str {
        &self.id
    }
}

struct Slots<T> {
    next_seq: u64,
    // seq keeps insertion order stable for listings and snapshots.
    by_id: HashMap<String, (u64, T)>,
}

pub struct Collection<T> {
    slots: RwLock<Slots<T>>,
}

impl<T: Record> Default for Collection<T> {
    fn default() -> Self {
        Self::from_records(Vec::new())
    }
}

impl<T: Record> Collection<T> {
    fn from_records(records: Vec<T>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut next_seq = 0;
        for r in records {
            by_id.insert(r.id().to_string(), (next_seq, r));
            next_seq += 1;
        }
        Self { slots: RwLock::new(Slots { next_seq, by_id }) }
    }

    pub async fn find_by_id(&self, id: &str) -> Option<T> {
        self.slots.read().await.by_id.get(id).map(|(_, r)| r.clone())
    }

    /// Matching records in insertion order (oldest first).
    pub async fn find(&self, filter: impl Fn(&T) -> bool) -> Vec<T> {
        let slots = self.slots.read().await;
        let mut hits: Vec<&(u64, T)> = slots.by_id.values().filter(|(_, r)| filter(r)).collect();
        hits.sort_by_key(|(seq, _)| *seq);
        hits.into_iter().map(|(_, r)| r.clone()).collect()
    }

    pub async fn count(&self, filter: impl Fn(&T) -> bool) -> usize {
        self.slots.read().await.by_id.values().filter(|(_, r)| filter(r)).count()
    }

    /// Insert or replace by id. A replaced record keeps its original position.
    pub async fn insert(&self, record: T) -> T {
        let mut slots = self.slots.write().await;
        let id = record.id().to_string();
        let seq = match slots.by_id.get(&id) {
            Some((seq, _)) => *seq,
            None => {
                let seq = slots.next_seq;
                slots.next_seq += 1;
                seq
            }
        };
        slots.by_id.insert(id, (seq, record.clone()));
        record
    }

    /// Apply `f` to the record under the write lock. `None` if the id is unknown.
    pub async fn update_by_id<R>(&self, id: &str, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut slots = self.slots.write().await;
        slots.by_id.get_mut(id).map(|(_, r)| f(r))
    }

    pub async fn delete_by_id(&self, id: &str) -> Option<T> {
        self.slots.write().await.by_id.remove(id).map(|(_, r)| r)
    }

    /// Remove every matching record; returns how many were removed.
    pub async fn delete_many(&self, filter: impl Fn(&T) -> bool) -> usize {
        let mut slots = self.slots.write().await;
        let before = slots.by_id.len();
        slots.by_id.retain(|_, (_, r)| !filter(r));
        before - slots.by_id.len()
    }

    async fn all(&self) -> Vec<T> {
        self.find(|_| true).await
    }
}

#[derive(Serialize, Deserialize, Default)]
struct Snapshot {
    #[serde(default)]
    stacks: Vec<Stack>,
    #[serde(default)]
    resources: Vec<Resource>,
    #[serde(default)]
    quizzes: Vec<Quiz>,
    #[serde(default)]
    attempts: Vec<QuizAttempt>,
}

pub struct Store {
    pub stacks: Collection<Stack>,
    pub resources: Collection<Resource>,
    pub quizzes: Collection<Quiz>,
    pub attempts: Collection<QuizAttempt>,
    /// Held while attempts are added or a quiz and its attempts are removed,
    /// so no attempt outlives its quiz.
    pub attempt_gate: Mutex<()>,
    snapshot_path: Option<PathBuf>,
    persist_lock: Mutex<()>,
}

impl Store {
    pub fn in_memory() -> Self {
        Self::from_snapshot(Snapshot::default(), None)
    }

    fn from_snapshot(s: Snapshot, snapshot_path: Option<PathBuf>) -> Self {
        Self {
            stacks: Collection::from_records(s.stacks),
            resources: Collection::from_records(s.resources),
            quizzes: Collection::from_records(s.quizzes),
            attempts: Collection::from_records(s.attempts),
            attempt_gate: Mutex::new(()),
            snapshot_path,
            persist_lock: Mutex::new(()),
        }
    }

    /// Open a snapshot-backed store. A missing file yields an empty store.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let snapshot = match tokio::fs::read_to_string(&path).await {
            Ok(s) => serde_json::from_str::<Snapshot>(&s)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(target: "stacks_backend", "No snapshot yet; starting empty");
                Snapshot::default()
            }
            Err(e) => return Err(e.into()),
        };
        info!(
            target: "stacks_backend",
            stacks = snapshot.stacks.len(),
            resources = snapshot.resources.len(),
            quizzes = snapshot.quizzes.len(),
            attempts = snapshot.attempts.len(),
            "Loaded store snapshot"
        );
        Ok(Self::from_snapshot(snapshot, Some(path)))
    }

    /// Write a fresh snapshot if the store is file-backed. Errors are logged, not returned.
    pub async fn persist(&self) {
        let Some(path) = &self.snapshot_path else { return };
        let _guard = self.persist_lock.lock().await;
        if let Err(e) = self.write_snapshot(path).await {
            error!(target: "stacks_backend", path = %path.display(), error = %e, "Failed to write store snapshot");
        }
    }

    async fn write_snapshot(&self, path: &Path) -> Result<(), StoreError> {
        let snapshot = Snapshot {
            stacks: self.stacks.all().await,
            resources: self.resources.all().await,
            quizzes: self.quizzes.all().await,
            attempts: self.attempts.all().await,
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        debug!(target: "stacks_backend", bytes = bytes.len(), "Store snapshot written");
        Ok(())
    }
}
