use crate::errors::Result;
use crate::models::StreakData;
use crate::progress::ProgressStore;
use crate::registry::HabitRegistry;
use crate::tracker::HabitTracker;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error};

pub const HABITS_KEY: &str = "habits";
pub const PROGRESS_KEY: &str = "progress";
pub const STREAK_KEY: &str = "streakData";

/// Key-value store of JSON documents, one file per key under `root`.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        fs::write(self.path_for(key), value).await?;
        Ok(())
    }
}

async fn load_document<T: DeserializeOwned + Default>(store: &BlobStore, key: &str) -> T {
    match store.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                error!("failed to parse {key}: {err}");
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(err) => {
            error!("failed to read {key}: {err}");
            T::default()
        }
    }
}

/// Loads the three documents. Anything unreadable falls back to empty state.
pub async fn load_tracker(store: &BlobStore) -> HabitTracker {
    let habits: HabitRegistry = load_document(store, HABITS_KEY).await;
    let progress: ProgressStore = load_document(store, PROGRESS_KEY).await;
    let streak: StreakData = load_document(store, STREAK_KEY).await;
    debug!(
        habits = habits.habits().len(),
        days = progress.len(),
        "tracker state loaded"
    );
    HabitTracker::new(habits, progress, streak)
}

pub async fn persist_tracker(store: &BlobStore, tracker: &HabitTracker) -> Result<()> {
    let habits = serde_json::to_string(tracker.habits())?;
    let progress = serde_json::to_string(tracker.progress())?;
    let streak = serde_json::to_string(tracker.streak())?;
    store.set(HABITS_KEY, &habits).await?;
    store.set(PROGRESS_KEY, &progress).await?;
    store.set(STREAK_KEY, &streak).await?;
    Ok(())
}

/// Persists and logs failures; the in-memory state stays authoritative.
pub async fn save_tracker(store: &BlobStore, tracker: &HabitTracker) {
    if let Err(err) = persist_tracker(store, tracker).await {
        error!("failed to persist tracker state: {err}");
    }
}
