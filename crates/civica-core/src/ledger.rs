//! Local issue ledger.
//!
//! Citizen-filed issues persist here, not in the remote store (which is
//! read-mostly and regenerates its records on every fetch). Ids are minted
//! in the `local-` namespace so merging with remote results never collides.
//! The whole ledger is one JSON array under a single storage key, written
//! back wholesale after every mutation.

use std::sync::Arc;

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::model::{Issue, IssueDraft, IssueId, Session, Status};
use crate::storage::Storage;

/// Storage key holding the ordered array of locally created issues.
pub const LEDGER_KEY: &str = "local_issues";

pub struct LocalLedger {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl LocalLedger {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// All local issues, most-recent-first.
    ///
    /// Unreadable or corrupt ledger state degrades to empty; losing the
    /// view is worse than losing the blob here, since every mutation
    /// rewrites it anyway.
    #[must_use]
    pub fn list_all(&self) -> Vec<Issue> {
        let blob = match self.storage.get(LEDGER_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("ledger read failed, treating as empty: {e}");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Issue>>(&blob) {
            Ok(issues) => issues,
            Err(e) => {
                tracing::warn!("corrupt ledger blob, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    #[must_use]
    pub fn find_by_id(&self, id: &IssueId) -> Option<Issue> {
        self.list_all().into_iter().find(|issue| &issue.id == id)
    }

    /// File a new issue: mint a namespaced id, stamp it pending with zero
    /// upvotes, and prepend it to the persisted order.
    ///
    /// Unlike reads, a write failure here must surface — otherwise the
    /// creation would appear to silently succeed.
    pub fn create(&self, draft: &IssueDraft, reporter: &Session) -> Result<Issue> {
        draft.validate()?;

        let now = self.clock.now();
        let issues = self.list_all();

        let stamp_ms = now.timestamp_millis();
        let mut seq = 0;
        let mut id = IssueId::local(stamp_ms, seq);
        while issues.iter().any(|issue| issue.id == id) {
            seq += 1;
            id = IssueId::local(stamp_ms, seq);
        }

        let issue = Issue {
            id,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            category: draft.category,
            status: Status::Pending,
            reporter_id: reporter.id,
            reporter_name: reporter.name.clone(),
            created_at: now,
            upvotes: 0,
        };

        self.append(issue)
    }

    /// Store an already-built issue at the head of persisted order.
    pub fn append(&self, issue: Issue) -> Result<Issue> {
        let mut issues = self.list_all();
        issues.insert(0, issue.clone());
        self.write_all(&issues)?;
        Ok(issue)
    }

    /// Update a local issue's status. Returns `false` when the id is not
    /// ledger-owned — the caller falls back to the remote-update path.
    pub fn update_status(&self, id: &IssueId, status: Status) -> Result<bool> {
        let mut issues = self.list_all();
        let Some(issue) = issues.iter_mut().find(|issue| &issue.id == id) else {
            return Ok(false);
        };

        issue.status = status;
        self.write_all(&issues)?;
        Ok(true)
    }

    fn write_all(&self, issues: &[Issue]) -> Result<()> {
        let blob = serde_json::to_string(issues)
            .map_err(|e| Error::Storage(format!("cannot encode ledger: {e}")))?;
        self.storage.set(LEDGER_KEY, &blob)
    }
}
