//! Saved board snapshots kept in local storage.

use super::{Storage, StorageError, StorageResult};
use crate::shapes::Element;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Key under which the ordered list of saved boards is stored.
pub const SAVED_BOARDS_KEY: &str = "lessonboard.saved";

/// One saved copy of a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedBoard {
    pub id: Uuid,
    #[serde(alias = "date")]
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub elements: Vec<Element>,
    /// PNG data URL of the board at save time.
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl SavedBoard {
    /// Snapshot `elements` now. An empty title is replaced by one built from
    /// the date.
    pub fn new(title: &str, elements: Vec<Element>, thumbnail: Option<String>) -> Self {
        let timestamp = Utc::now();
        let title = if title.trim().is_empty() {
            format!("Board {}", timestamp.format("%Y-%m-%d"))
        } else {
            title.trim().to_string()
        };
        Self {
            id: Uuid::new_v4(),
            timestamp,
            title,
            elements,
            thumbnail,
        }
    }
}

/// Append-only list of saved boards on top of a [`Storage`].
#[derive(Debug)]
pub struct SavedBoards<S> {
    storage: S,
}

impl<S: Storage> SavedBoards<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// All saved boards, oldest first. A never-written list is empty.
    pub async fn list(&self) -> StorageResult<Vec<SavedBoard>> {
        match self.storage.get(SAVED_BOARDS_KEY).await? {
            None => Ok(Vec::new()),
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                StorageError::Serialization(format!("Failed to parse saved boards: {}", e))
            }),
        }
    }

    /// Append a board to the list.
    pub async fn save(&self, board: &SavedBoard) -> StorageResult<()> {
        let mut boards = self.list().await?;
        boards.push(board.clone());
        self.write(&boards).await?;
        log::info!("Saved board {} ({})", board.title, board.id);
        Ok(())
    }

    /// Find a saved board by id.
    pub async fn get(&self, id: Uuid) -> StorageResult<SavedBoard> {
        self.list()
            .await?
            .into_iter()
            .find(|board| board.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    /// Delete a saved board. Returns whether anything was removed.
    pub async fn remove(&self, id: Uuid) -> StorageResult<bool> {
        let mut boards = self.list().await?;
        let before = boards.len();
        boards.retain(|board| board.id != id);
        if boards.len() == before {
            return Ok(false);
        }
        self.write(&boards).await?;
        Ok(true)
    }

    async fn write(&self, boards: &[SavedBoard]) -> StorageResult<()> {
        let json = serde_json::to_string(boards)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.set(SAVED_BOARDS_KEY, &json).await
    }
}
