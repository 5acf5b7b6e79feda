pub mod github;
pub mod link;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// An issue as returned by the tracker.
///
/// Only the fields the labeler reads are typed; everything else the API sent
/// is kept in `extra` so the update can echo the record back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "label_names")]
    pub labels: Vec<String>,
    #[serde(default)]
    pub comments_url: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Issue {
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    pub fn is_labeled(&self) -> bool {
        !self.labels.is_empty()
    }

    /// The update endpoint rejects a stale `assignee`, so it never goes back.
    pub fn strip_assignee(&mut self) {
        self.extra.remove("assignee");
    }
}

/// Labels arrive as `{"name": ..}` objects from the REST API but as plain
/// strings in hand-written payloads; accept both.
fn label_names<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LabelRef {
        Name(String),
        Object { name: String },
    }

    let labels: Option<Vec<LabelRef>> = Option::deserialize(deserializer)?;
    Ok(labels
        .unwrap_or_default()
        .into_iter()
        .map(|l| match l {
            LabelRef::Name(name) | LabelRef::Object { name } => name,
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub body: Option<String>,
}

/// One page of a paginated collection plus the `rel="next"` continuation.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next: Option<String>) -> Self {
        Self { items, next }
    }
}

/// Result of fetching the first page of issues.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueFetch {
    /// A fresh listing and the `ETag` it was served with, if any.
    Page(Page<Issue>, Option<String>),
    /// The list is unchanged since the last fetch (`304 Not Modified`).
    NotModified,
    Failed { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateResponse {
    pub status: u16,
    pub body: String,
}

impl UpdateResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

pub trait IssueTracker {
    /// Fetch the first page of the repository's issues.
    fn fetch_issues(&self) -> Result<IssueFetch>;

    /// Fetch a follow-up page of issues by its `next` link.
    fn fetch_issue_page(&self, url: &str) -> Result<Page<Issue>>;

    /// Fetch one page of an issue's comments.
    fn fetch_comments(&self, url: &str) -> Result<Page<Comment>>;

    /// Send the issue back with its new labels.
    fn update_issue(&self, issue: &Issue) -> Result<UpdateResponse>;

    /// Use `etag` for the next conditional `fetch_issues`.
    ///
    /// Called once every issue in the listing served with `etag` has been
    /// handled successfully.
    fn remember_etag(&self, _etag: &str) {}
}
