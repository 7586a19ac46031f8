//! In-memory [`RemoteStore`] fake shared by engine and dashboard tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::model::{
    Comment, CommentDraft, Issue, IssueDraft, IssueId, Role, Session, Status, Update, UpdateDraft,
    UserAccount,
};
use crate::remote::RemoteStore;

#[derive(Debug, Default)]
struct FakeState {
    issues: Vec<Issue>,
    comments: HashMap<IssueId, Vec<Comment>>,
    users: Vec<UserAccount>,
    updates: Vec<Update>,
    next_id: u64,
    /// When set, every call fails with `Error::Network` until cleared.
    offline: bool,
    /// When set, every call fails with `Error::Auth`.
    unauthorized: bool,
}

pub struct FakeRemote {
    state: Mutex<FakeState>,
    now: DateTime<Utc>,
    calls: AtomicUsize,
}

impl FakeRemote {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_id: 1000,
                ..FakeState::default()
            }),
            now,
            calls: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn push_issue(&self, issue: Issue) {
        self.lock().issues.push(issue);
    }

    pub fn push_user(&self, user: UserAccount) {
        self.lock().users.push(user);
    }

    pub fn push_comment(&self, comment: Comment) {
        let mut state = self.lock();
        state
            .comments
            .entry(comment.issue_id.clone())
            .or_default()
            .push(comment);
    }

    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn set_unauthorized(&self, unauthorized: bool) {
        self.lock().unauthorized = unauthorized;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn issue_status(&self, id: &IssueId) -> Option<Status> {
        self.lock()
            .issues
            .iter()
            .find(|issue| &issue.id == id)
            .map(|issue| issue.status)
    }

    fn check(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.lock();
        if state.unauthorized {
            return Err(Error::Auth);
        }
        if state.offline {
            return Err(Error::Network("connection refused".to_string()));
        }
        Ok(())
    }

    fn mint_id(&self) -> u64 {
        let mut state = self.lock();
        state.next_id += 1;
        state.next_id
    }
}

impl RemoteStore for FakeRemote {
    fn list_issues(&self) -> Result<Vec<Issue>> {
        self.check()?;
        Ok(self.lock().issues.clone())
    }

    fn get_issue(&self, id: &IssueId) -> Result<Issue> {
        self.check()?;
        self.lock()
            .issues
            .iter()
            .find(|issue| &issue.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                kind: "issue",
                id: id.to_string(),
            })
    }

    fn create_issue(&self, draft: &IssueDraft, reporter: &Session) -> Result<Issue> {
        self.check()?;
        draft.validate()?;
        let issue = Issue {
            id: IssueId::remote(self.mint_id()),
            title: draft.title.clone(),
            description: draft.description.clone(),
            category: draft.category,
            status: Status::Pending,
            reporter_id: reporter.id,
            reporter_name: reporter.name.clone(),
            created_at: self.now,
            upvotes: 0,
        };
        self.lock().issues.push(issue.clone());
        Ok(issue)
    }

    fn update_status(&self, id: &IssueId, status: Status) -> Result<Issue> {
        self.check()?;
        let mut state = self.lock();
        let issue = state
            .issues
            .iter_mut()
            .find(|issue| &issue.id == id)
            .ok_or_else(|| Error::NotFound {
                kind: "issue",
                id: id.to_string(),
            })?;
        issue.status = status;
        Ok(issue.clone())
    }

    fn list_comments(&self, id: &IssueId) -> Result<Vec<Comment>> {
        self.check()?;
        Ok(self.lock().comments.get(id).cloned().unwrap_or_default())
    }

    fn add_comment(&self, id: &IssueId, draft: &CommentDraft, author: &Session) -> Result<Comment> {
        self.check()?;
        draft.validate()?;
        let comment = Comment {
            id: self.mint_id(),
            issue_id: id.clone(),
            author: author.name.clone(),
            author_role: author.role,
            body: draft.body.clone(),
            created_at: self.now,
        };
        self.push_comment(comment.clone());
        Ok(comment)
    }

    fn list_users(&self) -> Result<Vec<UserAccount>> {
        self.check()?;
        Ok(self.lock().users.clone())
    }

    fn update_user_role(&self, user_id: u64, role: Role) -> Result<UserAccount> {
        self.check()?;
        let mut state = self.lock();
        let user = state
            .users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or_else(|| Error::NotFound {
                kind: "user",
                id: user_id.to_string(),
            })?;
        user.role = role;
        Ok(user.clone())
    }

    fn delete_user(&self, user_id: u64) -> Result<()> {
        self.check()?;
        let mut state = self.lock();
        let before = state.users.len();
        state.users.retain(|user| user.id != user_id);
        if state.users.len() == before {
            return Err(Error::NotFound {
                kind: "user",
                id: user_id.to_string(),
            });
        }
        Ok(())
    }

    fn list_updates(&self) -> Result<Vec<Update>> {
        self.check()?;
        Ok(self.lock().updates.clone())
    }

    fn create_update(&self, draft: &UpdateDraft, author: &Session) -> Result<Update> {
        self.check()?;
        draft.validate()?;
        let update = Update {
            id: self.mint_id(),
            title: draft.title.clone(),
            content: draft.content.clone(),
            politician_id: author.id,
            politician_name: author.name.clone(),
            created_at: self.now,
            likes: 0,
        };
        self.lock().updates.push(update.clone());
        Ok(update)
    }
}
