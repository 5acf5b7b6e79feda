use std::sync::Mutex;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

use super::link::next_link;
use super::{Comment, Issue, IssueFetch, IssueTracker, Page, UpdateResponse};

pub const GITHUB_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "labelbot";
const ACCEPT: &str = "application/vnd.github+json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GitHub REST v3 issue tracker for a single `owner/name` repository.
///
/// Sends the last remembered ETag back as `If-None-Match`, so an unchanged
/// repository costs a `304`. Listings are not remembered until the caller has
/// finished with them.
pub struct GitHubTracker {
    api_url: String,
    repo: String,
    token: String,
    agent: ureq::Agent,
    etag: Mutex<Option<String>>,
}

impl GitHubTracker {
    pub fn new(config: &Config) -> Self {
        Self::with_api_url(&config.api_url, &config.repo, &config.token)
    }

    pub fn with_api_url(api_url: &str, repo: &str, token: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            repo: repo.to_string(),
            token: token.to_string(),
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
            etag: Mutex::new(None),
        }
    }

    fn issues_url(&self) -> String {
        format!("{}/repos/{}/issues", self.api_url, self.repo)
    }

    fn issue_url(&self, number: u64) -> String {
        format!("{}/repos/{}/issues/{number}", self.api_url, self.repo)
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set("Authorization", &format!("token {}", self.token))
            .set("User-Agent", USER_AGENT)
            .set("Accept", ACCEPT)
    }

    fn current_etag(&self) -> Option<String> {
        self.etag.lock().ok().and_then(|etag| etag.clone())
    }

    fn get_page<T: DeserializeOwned>(&self, url: &str) -> Result<Page<T>> {
        let response = respond(self.request("GET", url).call())?;
        let status = response.status();
        if !(200..300).contains(&status) {
            let body = response.into_string().unwrap_or_default();
            return Err(Error::Http(format!("GET {url} failed: {status} / {body}")));
        }
        read_page(response)
    }
}

/// Treat HTTP error statuses as ordinary responses; only transport failures
/// become errors.
fn respond(result: std::result::Result<ureq::Response, ureq::Error>) -> Result<ureq::Response> {
    match result {
        Ok(response) => Ok(response),
        Err(ureq::Error::Status(_, response)) => Ok(response),
        Err(e) => Err(Error::Http(e.to_string())),
    }
}

fn read_page<T: DeserializeOwned>(response: ureq::Response) -> Result<Page<T>> {
    let next = next_link(response.header("link"));
    let url = response.get_url().to_string();
    let items: Vec<T> = response
        .into_json()
        .map_err(|e| Error::Decode(format!("failed to parse {url}: {e}")))?;
    debug!(url = %url, count = items.len(), has_next = next.is_some(), "fetched page");
    Ok(Page::new(items, next))
}

impl IssueTracker for GitHubTracker {
    fn fetch_issues(&self) -> Result<IssueFetch> {
        let url = self.issues_url();
        let mut request = self.request("GET", &url);
        if let Some(etag) = self.current_etag() {
            request = request.set("If-None-Match", &etag);
        }

        let response = respond(request.call())?;
        match response.status() {
            304 => Ok(IssueFetch::NotModified),
            200 => {
                let etag = response.header("etag").map(str::to_string);
                Ok(IssueFetch::Page(read_page(response)?, etag))
            }
            status => Ok(IssueFetch::Failed {
                status,
                body: response.into_string().unwrap_or_default(),
            }),
        }
    }

    fn fetch_issue_page(&self, url: &str) -> Result<Page<Issue>> {
        self.get_page(url)
    }

    fn fetch_comments(&self, url: &str) -> Result<Page<Comment>> {
        self.get_page(url)
    }

    fn update_issue(&self, issue: &Issue) -> Result<UpdateResponse> {
        let url = self.issue_url(issue.number);
        let response = respond(self.request("PATCH", &url).send_json(issue))?;
        let status = response.status();
        let body = response
            .into_string()
            .map_err(|e| Error::Http(format!("failed to read PATCH {url} response: {e}")))?;
        Ok(UpdateResponse { status, body })
    }

    fn remember_etag(&self, etag: &str) {
        if let Ok(mut current) = self.etag.lock() {
            *current = Some(etag.to_string());
        }
    }
}
