//! Issue lifecycle engine.
//!
//! Merges the local ledger with the remote store into one canonical view,
//! enforces the status state machine, and gates mutations by the caller's
//! role. Status moves freely between pending, in-progress, and resolved
//! (resolved issues can be reopened) but only triage roles may move it.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::ledger::LocalLedger;
use crate::model::{
    AssignmentRecord, Comment, CommentDraft, Issue, IssueDraft, IssueId, Person, Role, Session,
    Status, Update, UpdateDraft, UserAccount,
};
use crate::remote::RemoteStore;
use crate::session::SessionStore;
use crate::tracking::TrackingStore;

/// Everything a single-issue screen needs in one unit. Either the whole
/// view loads or the whole view fails.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IssueView {
    #[serde(flatten)]
    pub issue: Issue,
    pub comments: Vec<Comment>,
    pub record: Option<AssignmentRecord>,
}

pub struct Engine {
    session: SessionStore,
    ledger: LocalLedger,
    tracking: TrackingStore,
    remote: Arc<dyn RemoteStore>,
}

impl Engine {
    #[must_use]
    pub const fn new(
        session: SessionStore,
        ledger: LocalLedger,
        tracking: TrackingStore,
        remote: Arc<dyn RemoteStore>,
    ) -> Self {
        Self {
            session,
            ledger,
            tracking,
            remote,
        }
    }

    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.session.current()
    }

    fn require_session(&self) -> Result<Session> {
        self.session.current().ok_or(Error::Auth)
    }

    fn require_triager(&self, action: &'static str) -> Result<Session> {
        let session = self.require_session()?;
        if session.role.can_update_status() {
            Ok(session)
        } else {
            Err(Error::Forbidden {
                role: session.role,
                action,
            })
        }
    }

    fn require_admin(&self, action: &'static str) -> Result<Session> {
        let session = self.require_session()?;
        if session.role == Role::Admin {
            Ok(session)
        } else {
            Err(Error::Forbidden {
                role: session.role,
                action,
            })
        }
    }

    /// Merged issue list: ledger entries first (most recent first), then
    /// remote issues in store order. Fails wholesale when the remote is
    /// unreachable; no partial view.
    pub fn all_issues(&self) -> Result<Vec<Issue>> {
        let mut issues = self.ledger.list_all();
        issues.extend(self.remote.list_issues()?);
        Ok(issues)
    }

    /// Single issue, ledger taking priority over the remote store.
    pub fn issue(&self, id: &IssueId) -> Result<Issue> {
        if let Some(issue) = self.ledger.find_by_id(id) {
            return Ok(issue);
        }
        self.remote.get_issue(id)
    }

    /// File a new issue into the local ledger. Citizens only; the remote
    /// store is read-mostly and never sees locally filed issues.
    pub fn report(&self, draft: &IssueDraft) -> Result<Issue> {
        let session = self.require_session()?;
        if session.role != Role::Citizen {
            return Err(Error::Forbidden {
                role: session.role,
                action: "report an issue",
            });
        }
        self.ledger.create(draft, &session)
    }

    /// Move an issue to `status`. Ledger-owned issues update in place;
    /// everything else goes through the remote store.
    pub fn set_status(&self, id: &IssueId, status: Status) -> Result<Issue> {
        self.require_triager("update issue status")?;
        if self.ledger.update_status(id, status)? {
            return self.ledger.find_by_id(id).ok_or_else(|| Error::NotFound {
                kind: "issue",
                id: id.to_string(),
            });
        }
        if id.is_local() {
            // A local id missing from the ledger will never exist remotely.
            return Err(Error::NotFound {
                kind: "issue",
                id: id.to_string(),
            });
        }
        self.remote.update_status(id, status)
    }

    /// Issue, comments, and assignment record as one unit.
    pub fn view(&self, id: &IssueId) -> Result<IssueView> {
        let issue = self.issue(id)?;
        let comments = if id.is_local() {
            Vec::new()
        } else {
            self.remote.list_comments(id)?
        };
        let record = self.tracking.get(id);
        Ok(IssueView {
            issue,
            comments,
            record,
        })
    }

    pub fn add_comment(&self, id: &IssueId, draft: &CommentDraft) -> Result<Comment> {
        let session = self.require_session()?;
        if id.is_local() {
            return Err(Error::Validation(
                "locally filed issues cannot take comments yet".to_string(),
            ));
        }
        self.remote.add_comment(id, draft, &session)
    }

    #[must_use]
    pub fn assignments(&self) -> std::collections::BTreeMap<String, AssignmentRecord> {
        self.tracking.get_all()
    }

    pub fn assign(&self, id: &IssueId, person: &Person) -> Result<AssignmentRecord> {
        self.require_triager("assign an issue")?;
        self.tracking.assign(id, person)
    }

    pub fn set_in_charge(&self, id: &IssueId, person: &Person) -> Result<AssignmentRecord> {
        self.require_triager("take charge of an issue")?;
        self.tracking.set_in_charge(id, person)
    }

    /// Returns the updated record, or `None` when the slot was already empty.
    pub fn unassign(&self, id: &IssueId) -> Result<Option<AssignmentRecord>> {
        self.require_triager("unassign an issue")?;
        self.tracking.unassign(id)
    }

    pub fn remove_in_charge(&self, id: &IssueId) -> Result<Option<AssignmentRecord>> {
        self.require_triager("release charge of an issue")?;
        self.tracking.remove_in_charge(id)
    }

    pub fn add_status_note(&self, id: &IssueId, note: &str) -> Result<AssignmentRecord> {
        let session = self.require_triager("add a status note")?;
        self.tracking.add_status_note(id, note, &session.person())
    }

    pub fn clear_tracking(&self) -> Result<()> {
        self.require_admin("clear assignment tracking")?;
        self.tracking.clear_all()
    }

    pub fn list_users(&self) -> Result<Vec<UserAccount>> {
        self.require_admin("list user accounts")?;
        self.remote.list_users()
    }

    pub fn set_user_role(&self, user_id: u64, role: Role) -> Result<UserAccount> {
        self.require_admin("change a user's role")?;
        self.remote.update_user_role(user_id, role)
    }

    pub fn delete_user(&self, user_id: u64) -> Result<()> {
        self.require_admin("delete a user account")?;
        self.remote.delete_user(user_id)
    }

    pub fn list_updates(&self) -> Result<Vec<Update>> {
        self.remote.list_updates()
    }

    pub fn post_update(&self, draft: &UpdateDraft) -> Result<Update> {
        let session = self.require_session()?;
        if session.role != Role::Politician {
            return Err(Error::Forbidden {
                role: session.role,
                action: "post an update",
            });
        }
        self.remote.create_update(draft, &session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::model::Category;
    use crate::storage::MemoryStorage;
    use crate::testutil::FakeRemote;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn remote_issue(id: u64) -> Issue {
        Issue {
            id: IssueId::remote(id),
            title: format!("remote issue {id}"),
            description: "from the wire".to_string(),
            category: Category::Infrastructure,
            status: Status::Pending,
            reporter_id: 1,
            reporter_name: "Citizen 1".to_string(),
            created_at: start(),
            upvotes: 3,
        }
    }

    struct Fixture {
        engine: Engine,
        remote: Arc<FakeRemote>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let storage: Arc<dyn crate::storage::Storage> = Arc::new(MemoryStorage::default());
        let clock = Arc::new(ManualClock::new(start()));
        let remote = Arc::new(FakeRemote::new(start()));
        let engine = Engine::new(
            SessionStore::new(Arc::clone(&storage), clock.clone()),
            LocalLedger::new(Arc::clone(&storage), clock.clone()),
            TrackingStore::new(Arc::clone(&storage), clock.clone()),
            remote.clone(),
        );
        Fixture {
            engine,
            remote,
            clock,
        }
    }

    fn login(fx: &Fixture, email: &str, role: Role) -> Session {
        fx.engine
            .session
            .login(email, None, role)
            .expect("login succeeds")
    }

    fn draft() -> IssueDraft {
        IssueDraft {
            title: "Pothole on 5th Ave".to_string(),
            description: "Deep pothole near the crosswalk".to_string(),
            category: Category::Infrastructure,
        }
    }

    #[test]
    fn freshly_reported_issue_heads_the_merged_list() {
        let fx = fixture();
        fx.remote.push_issue(remote_issue(1));
        login(&fx, "ada@example.com", Role::Citizen);

        let created = fx.engine.report(&draft()).expect("report succeeds");
        assert_eq!(created.status, Status::Pending);
        assert_eq!(created.upvotes, 0);

        let issues = fx.engine.all_issues().expect("list succeeds");
        assert_eq!(issues[0].id, created.id);
        assert_eq!(issues[1].id, IssueId::remote(1));

        let found = fx.engine.issue(&created.id).expect("lookup succeeds");
        assert_eq!(found.title, "Pothole on 5th Ave");
    }

    #[test]
    fn rejected_credentials_surface_as_auth() {
        let fx = fixture();
        fx.remote.push_issue(remote_issue(1));
        login(&fx, "mod@example.com", Role::Moderator);

        fx.remote.set_unauthorized(true);
        let err = fx.engine.all_issues().unwrap_err();
        assert!(matches!(err, Error::Auth));
        let err = fx
            .engine
            .set_status(&IssueId::remote(1), Status::Resolved)
            .unwrap_err();
        assert!(matches!(err, Error::Auth));
    }

    #[test]
    fn reporting_requires_a_citizen_session() {
        let fx = fixture();
        let err = fx.engine.report(&draft()).unwrap_err();
        assert!(matches!(err, Error::Auth));

        login(&fx, "mod@example.com", Role::Moderator);
        let err = fx.engine.report(&draft()).unwrap_err();
        assert!(matches!(
            err,
            Error::Forbidden {
                role: Role::Moderator,
                ..
            }
        ));
    }

    #[test]
    fn citizens_cannot_move_status() {
        let fx = fixture();
        fx.remote.push_issue(remote_issue(1));
        login(&fx, "ada@example.com", Role::Citizen);

        let err = fx
            .engine
            .set_status(&IssueId::remote(1), Status::Resolved)
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));
        assert_eq!(
            fx.remote.issue_status(&IssueId::remote(1)),
            Some(Status::Pending)
        );
    }

    #[test]
    fn status_moves_freely_for_triage_roles_and_resolved_reopens() {
        let fx = fixture();
        fx.remote.push_issue(remote_issue(1));
        login(&fx, "rep@example.com", Role::Politician);

        let id = IssueId::remote(1);
        for status in [Status::InProgress, Status::Resolved, Status::Pending] {
            let updated = fx.engine.set_status(&id, status).expect("update succeeds");
            assert_eq!(updated.status, status);
        }
    }

    #[test]
    fn ledger_owned_issues_update_without_touching_the_remote() {
        let fx = fixture();
        login(&fx, "ada@example.com", Role::Citizen);
        let created = fx.engine.report(&draft()).expect("report succeeds");
        fx.engine.session.logout().expect("logout succeeds");
        login(&fx, "mod@example.com", Role::Moderator);

        let before = fx.remote.call_count();
        let updated = fx
            .engine
            .set_status(&created.id, Status::InProgress)
            .expect("update succeeds");
        assert_eq!(updated.status, Status::InProgress);
        assert_eq!(fx.remote.call_count(), before);
    }

    #[test]
    fn unknown_local_id_is_not_retried_remotely() {
        let fx = fixture();
        login(&fx, "mod@example.com", Role::Moderator);
        let ghost = IssueId::from("local-12345");
        let err = fx
            .engine
            .set_status(&ghost, Status::Resolved)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "issue", .. }));
        assert_eq!(fx.remote.call_count(), 0);
    }

    #[test]
    fn remote_outage_fails_the_whole_list() {
        let fx = fixture();
        login(&fx, "ada@example.com", Role::Citizen);
        fx.engine.report(&draft()).expect("report succeeds");
        fx.remote.set_offline(true);

        let err = fx.engine.all_issues().unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[test]
    fn view_bundles_issue_comments_and_record() {
        let fx = fixture();
        fx.remote.push_issue(remote_issue(1));
        login(&fx, "rep@example.com", Role::Politician);

        let id = IssueId::remote(1);
        let session = fx.engine.current_session().expect("logged in");
        fx.engine
            .add_comment(&id, &CommentDraft { body: "On it".to_string() })
            .expect("comment succeeds");
        fx.engine.assign(&id, &session.person()).expect("assign succeeds");
        fx.clock.advance(chrono::Duration::seconds(1));

        let view = fx.engine.view(&id).expect("view loads");
        assert_eq!(view.issue.id, id);
        assert_eq!(view.comments.len(), 1);
        let record = view.record.expect("record exists");
        assert_eq!(record.assigned_to.expect("assigned").id, session.id);
    }

    #[test]
    fn comments_on_local_issues_are_rejected() {
        let fx = fixture();
        login(&fx, "ada@example.com", Role::Citizen);
        let created = fx.engine.report(&draft()).expect("report succeeds");
        let err = fx
            .engine
            .add_comment(&created.id, &CommentDraft { body: "hi".to_string() })
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn user_administration_is_admin_only() {
        let fx = fixture();
        login(&fx, "rep@example.com", Role::Politician);
        let err = fx.engine.list_users().unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));

        fx.engine.session.logout().expect("logout succeeds");
        login(&fx, "root@example.com", Role::Admin);
        fx.remote.push_user(UserAccount {
            id: 4,
            name: "Patricia Lebsack".to_string(),
            email: "julianne@kory.org".to_string(),
            role: Role::Citizen,
            active: true,
            joined_at: start(),
        });

        let promoted = fx
            .engine
            .set_user_role(4, Role::Moderator)
            .expect("role change succeeds");
        assert_eq!(promoted.role, Role::Moderator);
        fx.engine.delete_user(4).expect("delete succeeds");
        assert!(fx.engine.list_users().expect("list succeeds").is_empty());
    }

    #[test]
    fn only_politicians_post_updates() {
        let fx = fixture();
        login(&fx, "root@example.com", Role::Admin);
        let draft = UpdateDraft {
            title: "Budget approved".to_string(),
            content: "The park budget passed".to_string(),
        };
        let err = fx.engine.post_update(&draft).unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));

        fx.engine.session.logout().expect("logout succeeds");
        login(&fx, "rep@example.com", Role::Politician);
        let posted = fx.engine.post_update(&draft).expect("post succeeds");
        assert_eq!(posted.likes, 0);
        assert_eq!(posted.politician_name, "rep");
    }
}
