//! Progress tracker — sole owner of one learner's live week list.
//!
//! Every mutation writes the full list to the snapshot store before
//! returning. Store failures are logged and never roll back memory.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::progress::store::SnapshotStore;
use crate::roadmap::WeekRecord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("week index {index} is out of range ({len} weeks)")]
    OutOfRange { index: usize, len: usize },
}

/// Derived, read-only view returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub weeks: Vec<WeekRecord>,
    pub completed: usize,
    pub total: usize,
    pub percentage: f64,
    pub rounded_percentage: u32,
}

pub struct ProgressTracker {
    weeks: Vec<WeekRecord>,
    store: Arc<dyn SnapshotStore>,
    slot: String,
}

impl ProgressTracker {
    /// Empty tracker bound to a store slot. Nothing is read or written.
    pub fn new(store: Arc<dyn SnapshotStore>, slot: impl Into<String>) -> Self {
        Self {
            weeks: Vec::new(),
            store,
            slot: slot.into(),
        }
    }

    /// Reads the slot and restores it. Unreadable or absent snapshots give an
    /// empty tracker.
    pub async fn load(store: Arc<dyn SnapshotStore>, slot: impl Into<String>) -> Self {
        let mut tracker = Self::new(store, slot);
        let snapshot = match tracker.store.load(&tracker.slot).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(
                    "Could not read {} snapshot {}: {e}; starting empty",
                    tracker.store.backend(),
                    tracker.slot
                );
                None
            }
        };
        tracker.restore(snapshot);
        tracker
    }

    /// Installs a previously persisted snapshot as-is. Does not persist.
    pub fn restore(&mut self, snapshot: Option<Vec<WeekRecord>>) {
        self.weeks = snapshot.unwrap_or_default();
        debug!("Restored {} weeks for {}", self.weeks.len(), self.slot);
    }

    pub fn weeks(&self) -> &[WeekRecord] {
        &self.weeks
    }

    pub fn snapshot(&self) -> Vec<WeekRecord> {
        self.weeks.clone()
    }

    /// Swaps in a whole new week list.
    pub async fn replace_all(&mut self, weeks: Vec<WeekRecord>) {
        self.weeks = weeks;
        self.persist().await;
    }

    /// Flips `completed` on one week.
    pub async fn toggle_completion(&mut self, index: usize) -> Result<&WeekRecord, TrackerError> {
        self.check_index(index)?;
        self.weeks[index].completed = !self.weeks[index].completed;
        self.persist().await;
        Ok(&self.weeks[index])
    }

    /// Replaces the project link on one week. Completion is untouched.
    pub async fn set_project_link(
        &mut self,
        index: usize,
        value: impl Into<String>,
    ) -> Result<&WeekRecord, TrackerError> {
        self.check_index(index)?;
        self.weeks[index].project_link = value.into();
        self.persist().await;
        Ok(&self.weeks[index])
    }

    pub fn completed_count(&self) -> usize {
        self.weeks.iter().filter(|w| w.completed).count()
    }

    /// Completed weeks as a share of all weeks, 0–100. Zero when empty.
    pub fn current_percentage(&self) -> f64 {
        if self.weeks.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 * 100.0 / self.weeks.len() as f64
    }

    pub fn view(&self) -> ProgressView {
        let percentage = self.current_percentage();
        ProgressView {
            weeks: self.snapshot(),
            completed: self.completed_count(),
            total: self.weeks.len(),
            percentage,
            rounded_percentage: percentage.round() as u32,
        }
    }

    fn check_index(&self, index: usize) -> Result<(), TrackerError> {
        if index < self.weeks.len() {
            Ok(())
        } else {
            Err(TrackerError::OutOfRange {
                index,
                len: self.weeks.len(),
            })
        }
    }

    async fn persist(&self) {
        if let Err(e) = self.store.save(&self.slot, &self.weeks).await {
            warn!(
                "Failed to persist {} weeks to {} slot {}: {e}",
                self.weeks.len(),
                self.store.backend(),
                self.slot
            );
        }
    }
}
