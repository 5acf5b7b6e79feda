use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::rules::RuleSet;
use crate::sources::{Comment, Issue, IssueFetch, IssueTracker, Page, UpdateResponse};

/// Create an `Issue` with sensible defaults for tests.
pub fn make_issue(number: u64, title: &str, body: &str, labels: &[&str]) -> Issue {
    let mut extra = serde_json::Map::new();
    extra.insert(
        "assignee".to_string(),
        serde_json::json!({"login": "someone"}),
    );
    Issue {
        number,
        title: title.to_string(),
        body: Some(body.to_string()),
        labels: labels.iter().map(|l| l.to_string()).collect(),
        comments_url: format!("https://api.test/repos/o/r/issues/{number}/comments"),
        extra,
    }
}

pub fn test_config() -> Config {
    Config {
        repo: "o/r".to_string(),
        token: "secret".to_string(),
        api_url: "https://api.test".to_string(),
        rules: RuleSet::from_pairs([(".*bug.*", "possible_bug"), (".*urgent.*", "ASAP")])
            .unwrap(),
        default_label: "triage".to_string(),
        check_comments: false,
        output: None,
    }
}

#[derive(Default)]
struct TrackerState {
    first: VecDeque<Result<IssueFetch>>,
    pages: HashMap<String, Page<Issue>>,
    comments: HashMap<String, Page<Comment>>,
    update_status: HashMap<u64, u16>,
    fetched_pages: Vec<String>,
    fetched_comments: Vec<String>,
    updates: Vec<Issue>,
    etags: Vec<String>,
}

/// Scripted in-memory tracker that records every call.
#[derive(Default)]
pub struct MockTracker {
    state: Mutex<TrackerState>,
}

impl MockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next `fetch_issues` call.
    pub fn with_first(self, fetch: Result<IssueFetch>) -> Self {
        self.state.lock().unwrap().first.push_back(fetch);
        self
    }

    pub fn with_page(self, url: &str, page: Page<Issue>) -> Self {
        self.state.lock().unwrap().pages.insert(url.to_string(), page);
        self
    }

    pub fn with_comments(self, url: &str, bodies: &[&str], next: Option<&str>) -> Self {
        let items = bodies
            .iter()
            .map(|b| Comment {
                body: Some(b.to_string()),
            })
            .collect();
        self.state
            .lock()
            .unwrap()
            .comments
            .insert(url.to_string(), Page::new(items, next.map(str::to_string)));
        self
    }

    /// Make the update for `number` answer with `status` (default 200).
    pub fn with_update_status(self, number: u64, status: u16) -> Self {
        self.state
            .lock()
            .unwrap()
            .update_status
            .insert(number, status);
        self
    }

    pub fn updates(&self) -> Vec<Issue> {
        self.state.lock().unwrap().updates.clone()
    }

    pub fn updated_numbers(&self) -> Vec<u64> {
        self.updates().iter().map(|i| i.number).collect()
    }

    pub fn fetched_pages(&self) -> Vec<String> {
        self.state.lock().unwrap().fetched_pages.clone()
    }

    pub fn fetched_comments(&self) -> Vec<String> {
        self.state.lock().unwrap().fetched_comments.clone()
    }

    pub fn remembered_etags(&self) -> Vec<String> {
        self.state.lock().unwrap().etags.clone()
    }
}

impl IssueTracker for MockTracker {
    fn fetch_issues(&self) -> Result<IssueFetch> {
        self.state
            .lock()
            .unwrap()
            .first
            .pop_front()
            .unwrap_or_else(|| Err(Error::Http("no more mock responses".to_string())))
    }

    fn fetch_issue_page(&self, url: &str) -> Result<Page<Issue>> {
        let mut state = self.state.lock().unwrap();
        state.fetched_pages.push(url.to_string());
        state
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Http(format!("GET {url} failed: 404 / Not Found")))
    }

    fn fetch_comments(&self, url: &str) -> Result<Page<Comment>> {
        let mut state = self.state.lock().unwrap();
        state.fetched_comments.push(url.to_string());
        state
            .comments
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Http(format!("GET {url} failed: 404 / Not Found")))
    }

    fn update_issue(&self, issue: &Issue) -> Result<UpdateResponse> {
        let mut state = self.state.lock().unwrap();
        state.updates.push(issue.clone());
        let status = state.update_status.get(&issue.number).copied().unwrap_or(200);
        let body = if status == 200 {
            serde_json::json!({"number": issue.number}).to_string()
        } else {
            r#"{"message":"Validation Failed"}"#.to_string()
        };
        Ok(UpdateResponse { status, body })
    }

    fn remember_etag(&self, etag: &str) {
        self.state.lock().unwrap().etags.push(etag.to_string());
    }
}
