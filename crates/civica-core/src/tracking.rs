//! Assignment tracking store.
//!
//! Owns the `IssueId -> AssignmentRecord` mapping, persisted wholesale
//! after every call. A record's lifetime is independent of the issue's own
//! status: it is created on first assignment and its slots are removable
//! one at a time. Assignment is last-writer-wins per slot; any permitted
//! actor can claim or release a slot at any time.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::model::{Assignee, AssignmentRecord, IssueId, Person, StatusNote};
use crate::storage::Storage;

/// Storage key holding the issue-id to assignment-record mapping.
pub const TRACKING_KEY: &str = "issue_tracking";

pub struct TrackingStore {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl TrackingStore {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// The full mapping. Corrupt or unreadable state degrades to empty.
    #[must_use]
    pub fn get_all(&self) -> BTreeMap<String, AssignmentRecord> {
        let blob = match self.storage.get(TRACKING_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => return BTreeMap::new(),
            Err(e) => {
                tracing::warn!("tracking read failed, treating as empty: {e}");
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&blob) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!("corrupt tracking blob, treating as empty: {e}");
                BTreeMap::new()
            }
        }
    }

    #[must_use]
    pub fn get(&self, issue_id: &IssueId) -> Option<AssignmentRecord> {
        self.get_all().remove(issue_id.as_str())
    }

    /// Set the operational holder, overwriting any existing one.
    pub fn assign(&self, issue_id: &IssueId, person: &Person) -> Result<AssignmentRecord> {
        let now = self.clock.now();
        self.mutate(issue_id, |record| {
            record.assigned_to = Some(Assignee::new(person, now));
        })
    }

    /// Set the supervisory holder, overwriting any existing one.
    pub fn set_in_charge(&self, issue_id: &IssueId, person: &Person) -> Result<AssignmentRecord> {
        let now = self.clock.now();
        self.mutate(issue_id, |record| {
            record.in_charge = Some(Assignee::new(person, now));
        })
    }

    /// Clear the operational slot. No-op (and no `last_updated` bump) when
    /// there is no record or no holder.
    pub fn unassign(&self, issue_id: &IssueId) -> Result<Option<AssignmentRecord>> {
        self.release(issue_id, |record| record.assigned_to.take().is_some())
    }

    /// Clear the supervisory slot. Same no-op semantics as [`unassign`].
    ///
    /// [`unassign`]: Self::unassign
    pub fn remove_in_charge(&self, issue_id: &IssueId) -> Result<Option<AssignmentRecord>> {
        self.release(issue_id, |record| record.in_charge.take().is_some())
    }

    /// Append to the ordered note log, creating the record if absent.
    pub fn add_status_note(
        &self,
        issue_id: &IssueId,
        note: &str,
        author: &Person,
    ) -> Result<AssignmentRecord> {
        if note.trim().is_empty() {
            return Err(Error::Validation("status note is required".to_string()));
        }

        let now = self.clock.now();
        self.mutate(issue_id, |record| {
            record.status_updates.push(StatusNote {
                note: note.trim().to_string(),
                updated_by: author.clone(),
                timestamp: now,
            });
        })
    }

    /// Administrative reset of all tracking state.
    pub fn clear_all(&self) -> Result<()> {
        self.storage.remove(TRACKING_KEY)
    }

    /// Read-modify-write against the whole mapping, creating the record
    /// for `issue_id` when missing and bumping `last_updated`.
    fn mutate(
        &self,
        issue_id: &IssueId,
        apply: impl FnOnce(&mut AssignmentRecord),
    ) -> Result<AssignmentRecord> {
        let now = self.clock.now();
        let mut all = self.get_all();
        let record = all
            .entry(issue_id.as_str().to_string())
            .or_insert_with(|| AssignmentRecord::empty(now));

        apply(record);
        record.last_updated = now;
        let result = record.clone();
        self.write_all(&all)?;
        Ok(result)
    }

    /// Like [`mutate`], but never creates a record and only persists (and
    /// bumps `last_updated`) when `apply` reports an actual change.
    ///
    /// [`mutate`]: Self::mutate
    fn release(
        &self,
        issue_id: &IssueId,
        apply: impl FnOnce(&mut AssignmentRecord) -> bool,
    ) -> Result<Option<AssignmentRecord>> {
        let mut all = self.get_all();
        let Some(record) = all.get_mut(issue_id.as_str()) else {
            return Ok(None);
        };

        if apply(record) {
            record.last_updated = self.clock.now();
            let result = record.clone();
            self.write_all(&all)?;
            return Ok(Some(result));
        }

        Ok(Some(record.clone()))
    }

    fn write_all(&self, all: &BTreeMap<String, AssignmentRecord>) -> Result<()> {
        let blob = serde_json::to_string(all)
            .map_err(|e| Error::Storage(format!("cannot encode tracking map: {e}")))?;
        self.storage.set(TRACKING_KEY, &blob)
    }
}
