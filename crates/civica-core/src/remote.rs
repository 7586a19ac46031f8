//! Remote issue store client.
//!
//! The remote side is a generic mock content API (`/posts`, `/users`): each
//! read reshapes its records into domain records via [`Enrichment`]. A
//! bearer credential from the session rides on every request when present;
//! a 401-class response maps to [`Error::Auth`], and the presentation
//! boundary clears the session in response (see `civica-cli`).

use chrono::Duration;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;

use crate::clock::Clock;
use crate::config::ApiConfig;
use crate::enrich::Enrichment;
use crate::error::{Error, Result};
use crate::model::{
    Category, Comment, CommentDraft, Issue, IssueDraft, IssueId, Role, Session, Status, Update,
    UpdateDraft, UserAccount,
};

/// The remote store contract consumed by the lifecycle engine.
pub trait RemoteStore: Send + Sync {
    fn list_issues(&self) -> Result<Vec<Issue>>;
    fn get_issue(&self, id: &IssueId) -> Result<Issue>;
    fn create_issue(&self, draft: &IssueDraft, reporter: &Session) -> Result<Issue>;
    fn update_status(&self, id: &IssueId, status: Status) -> Result<Issue>;
    fn list_comments(&self, id: &IssueId) -> Result<Vec<Comment>>;
    fn add_comment(&self, id: &IssueId, draft: &CommentDraft, author: &Session) -> Result<Comment>;
    fn list_users(&self) -> Result<Vec<UserAccount>>;
    fn update_user_role(&self, user_id: u64, role: Role) -> Result<UserAccount>;
    fn delete_user(&self, user_id: u64) -> Result<()>;
    fn list_updates(&self) -> Result<Vec<Update>>;
    fn create_update(&self, draft: &UpdateDraft, author: &Session) -> Result<Update>;
}

/// Generic post record as the mock API returns it.
#[derive(Debug, Clone, Deserialize)]
struct PostRecord {
    id: u64,
    #[serde(rename = "userId", default)]
    user_id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CommentRecord {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    body: String,
}

#[derive(Debug, Clone, Deserialize)]
struct UserRecord {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

/// Create responses only reliably carry the new id.
#[derive(Debug, Clone, Deserialize)]
struct CreatedRecord {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    message: String,
}

/// Blocking HTTP implementation of [`RemoteStore`].
pub struct HttpRemote {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
    clock: Arc<dyn Clock>,
    /// Pinned enrichment seed; `None` draws a fresh seed per read pass.
    seed: Option<u64>,
}

impl HttpRemote {
    #[must_use]
    pub fn new(config: &ApiConfig, token: Option<String>, clock: Arc<dyn Clock>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
            clock,
            seed: None,
        }
    }

    /// Pin the enrichment seed. For tests.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn enrichment(&self) -> Enrichment {
        self.seed.map_or_else(Enrichment::random, Enrichment::with_seed)
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        match &self.token {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .authorize(self.agent.get(&url))
            .call()
            .map_err(|e| map_http_error(e, path))?;
        decode(response, path)
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .authorize(self.agent.request(method, &url))
            .send_json(body)
            .map_err(|e| map_http_error(e, path))?;
        decode(response, path)
    }
}

fn decode<T: DeserializeOwned>(response: ureq::Response, path: &str) -> Result<T> {
    response
        .into_json::<T>()
        .map_err(|e| Error::Network(format!("invalid response body from {path}: {e}")))
}

fn map_http_error(err: ureq::Error, path: &str) -> Error {
    match err {
        ureq::Error::Status(401, _) => Error::Auth,
        ureq::Error::Status(404, _) => Error::NotFound {
            kind: "remote record",
            id: path.to_string(),
        },
        ureq::Error::Status(code, response) => {
            // Surface the remote's own message when it sends one.
            let message = response
                .into_json::<RemoteErrorBody>()
                .ok()
                .map(|body| body.message)
                .filter(|message| !message.is_empty());
            Error::Network(
                message.unwrap_or_else(|| format!("remote returned HTTP {code} for {path}")),
            )
        }
        ureq::Error::Transport(transport) => Error::Network(transport.to_string()),
    }
}

fn issue_from_post(
    post: &PostRecord,
    enrichment: Enrichment,
    now: chrono::DateTime<chrono::Utc>,
) -> Issue {
    Issue {
        id: IssueId::remote(post.id),
        title: post.title.clone(),
        description: post.body.clone(),
        category: enrichment.category(post.id),
        status: enrichment.status(post.id),
        reporter_id: post.user_id,
        reporter_name: format!("Citizen {}", post.user_id),
        created_at: enrichment.created_within(post.id, Duration::days(30), now),
        upvotes: enrichment.upvotes(post.id),
    }
}

fn comment_from_record(
    record: &CommentRecord,
    issue_id: &IssueId,
    enrichment: Enrichment,
    now: chrono::DateTime<chrono::Utc>,
) -> Comment {
    Comment {
        id: record.id,
        issue_id: issue_id.clone(),
        author: record.name.clone(),
        author_role: enrichment.comment_role(record.id),
        body: record.body.clone(),
        created_at: enrichment.created_within(record.id, Duration::days(10), now),
    }
}

fn account_from_record(
    record: &UserRecord,
    enrichment: Enrichment,
    now: chrono::DateTime<chrono::Utc>,
) -> UserAccount {
    UserAccount {
        id: record.id,
        name: record.name.clone(),
        email: record.email.clone(),
        role: enrichment.account_role(record.id),
        active: enrichment.account_active(record.id),
        joined_at: enrichment.created_within(record.id, Duration::days(365), now),
    }
}

fn update_from_post(
    post: &PostRecord,
    enrichment: Enrichment,
    now: chrono::DateTime<chrono::Utc>,
) -> Update {
    Update {
        id: post.id,
        title: post.title.clone(),
        content: post.body.clone(),
        politician_id: post.user_id,
        politician_name: format!("Politician {}", post.user_id),
        created_at: enrichment.created_within(post.id, Duration::days(7), now),
        likes: enrichment.likes(post.id),
    }
}

impl RemoteStore for HttpRemote {
    fn list_issues(&self) -> Result<Vec<Issue>> {
        let posts: Vec<PostRecord> = self.get_json("/posts")?;
        let enrichment = self.enrichment();
        let now = self.clock.now();
        Ok(posts
            .iter()
            .map(|post| issue_from_post(post, enrichment, now))
            .collect())
    }

    fn get_issue(&self, id: &IssueId) -> Result<Issue> {
        let post: PostRecord = self
            .get_json(&format!("/posts/{id}"))
            .map_err(|e| match e {
                Error::NotFound { .. } => Error::NotFound {
                    kind: "issue",
                    id: id.to_string(),
                },
                other => other,
            })?;
        Ok(issue_from_post(&post, self.enrichment(), self.clock.now()))
    }

    fn create_issue(&self, draft: &IssueDraft, reporter: &Session) -> Result<Issue> {
        draft.validate()?;
        let created: CreatedRecord = self.send_json(
            "POST",
            "/posts",
            json!({
                "title": draft.title,
                "body": draft.description,
                "userId": reporter.id,
            }),
        )?;
        Ok(Issue {
            id: IssueId::remote(created.id),
            title: draft.title.clone(),
            description: draft.description.clone(),
            category: draft.category,
            status: Status::Pending,
            reporter_id: reporter.id,
            reporter_name: reporter.name.clone(),
            created_at: self.clock.now(),
            upvotes: 0,
        })
    }

    fn update_status(&self, id: &IssueId, status: Status) -> Result<Issue> {
        let post: PostRecord = self
            .send_json("PATCH", &format!("/posts/{id}"), json!({ "status": status }))
            .map_err(|e| match e {
                Error::NotFound { .. } => Error::NotFound {
                    kind: "issue",
                    id: id.to_string(),
                },
                other => other,
            })?;
        let mut issue = issue_from_post(&post, self.enrichment(), self.clock.now());
        // The requested status is authoritative, not the enrichment pass.
        issue.status = status;
        Ok(issue)
    }

    fn list_comments(&self, id: &IssueId) -> Result<Vec<Comment>> {
        let records: Vec<CommentRecord> = self.get_json(&format!("/posts/{id}/comments"))?;
        let enrichment = self.enrichment();
        let now = self.clock.now();
        Ok(records
            .iter()
            .map(|record| comment_from_record(record, id, enrichment, now))
            .collect())
    }

    fn add_comment(
        &self,
        id: &IssueId,
        draft: &CommentDraft,
        author: &Session,
    ) -> Result<Comment> {
        draft.validate()?;
        let created: CreatedRecord = self.send_json(
            "POST",
            &format!("/posts/{id}/comments"),
            json!({
                "name": author.name,
                "email": author.email,
                "body": draft.body,
            }),
        )?;
        Ok(Comment {
            id: created.id,
            issue_id: id.clone(),
            author: author.name.clone(),
            author_role: author.role,
            body: draft.body.clone(),
            created_at: self.clock.now(),
        })
    }

    fn list_users(&self) -> Result<Vec<UserAccount>> {
        let records: Vec<UserRecord> = self.get_json("/users")?;
        let enrichment = self.enrichment();
        let now = self.clock.now();
        Ok(records
            .iter()
            .map(|record| account_from_record(record, enrichment, now))
            .collect())
    }

    fn update_user_role(&self, user_id: u64, role: Role) -> Result<UserAccount> {
        let record: UserRecord = self
            .send_json("PATCH", &format!("/users/{user_id}"), json!({ "role": role }))
            .map_err(|e| match e {
                Error::NotFound { .. } => Error::NotFound {
                    kind: "user",
                    id: user_id.to_string(),
                },
                other => other,
            })?;
        let mut account = account_from_record(&record, self.enrichment(), self.clock.now());
        account.role = role;
        Ok(account)
    }

    fn delete_user(&self, user_id: u64) -> Result<()> {
        let path = format!("/users/{user_id}");
        let url = format!("{}{path}", self.base_url);
        self.authorize(self.agent.delete(&url))
            .call()
            .map_err(|e| match map_http_error(e, &path) {
                Error::NotFound { .. } => Error::NotFound {
                    kind: "user",
                    id: user_id.to_string(),
                },
                other => other,
            })?;
        Ok(())
    }

    fn list_updates(&self) -> Result<Vec<Update>> {
        let posts: Vec<PostRecord> = self.get_json("/posts")?;
        let enrichment = self.enrichment();
        let now = self.clock.now();
        Ok(posts
            .iter()
            .take(10)
            .map(|post| update_from_post(post, enrichment, now))
            .collect())
    }

    fn create_update(&self, draft: &UpdateDraft, author: &Session) -> Result<Update> {
        draft.validate()?;
        let created: CreatedRecord = self.send_json(
            "POST",
            "/posts",
            json!({
                "title": draft.title,
                "body": draft.content,
                "userId": author.id,
            }),
        )?;
        Ok(Update {
            id: created.id,
            title: draft.title.clone(),
            content: draft.content.clone(),
            politician_id: author.id,
            politician_name: author.name.clone(),
            created_at: self.clock.now(),
            likes: 0,
        })
    }
}
