use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::report::Reporter;
use crate::rules::decide_labels;
use crate::sources::{Issue, IssueFetch, IssueTracker, Page, UpdateResponse};

/// Result of one attempted label update.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub success: bool,
    pub issue: u64,
    /// Index of the issue page the issue came from, in traversal order.
    pub page: usize,
    pub status: u16,
    pub body: String,
}

/// Everything one fetch-and-label cycle produced.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// False when the first issue page could not be fetched.
    pub fetched: bool,
    pub outcomes: Vec<Outcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> bool {
        self.fetched && self.outcomes.iter().all(|o| o.success)
    }

    pub fn exit_code(&self) -> i32 {
        if self.succeeded() { 0 } else { 1 }
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }
}

/// Collect every comment body behind `endpoint`, following `next` links.
///
/// Bodies come back as one flat list, earliest page first. Any transport or
/// decode failure aborts the walk; no partial list is returned.
pub fn fetch_all_comments<T: IssueTracker + ?Sized>(
    tracker: &T,
    endpoint: &str,
) -> Result<Vec<String>> {
    let mut bodies = Vec::new();
    let mut visited = HashSet::new();
    let mut url = Some(endpoint.to_string());

    while let Some(current) = url.take() {
        if !visited.insert(current.clone()) {
            warn!(url = %current, "comment pagination loops back, stopping");
            break;
        }
        let page = tracker.fetch_comments(&current)?;
        bodies.extend(page.items.into_iter().map(|c| c.body.unwrap_or_default()));
        url = page.next;
    }

    debug!(endpoint, count = bodies.len(), "fetched comments");
    Ok(bodies)
}

/// Applies the configured rules to a repository's unlabeled issues.
pub struct Labeler<T, P> {
    tracker: T,
    reporter: P,
    config: Config,
}

impl<T: IssueTracker, P: Reporter> Labeler<T, P> {
    pub fn new(tracker: T, reporter: P, config: Config) -> Self {
        Self {
            tracker,
            reporter,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn reporter(&self) -> &P {
        &self.reporter
    }

    /// Run `iterations` batches, sleeping `interval` between them.
    ///
    /// Returns 0 only if every batch succeeded.
    pub fn run_loop(&self, iterations: u32, interval: Duration) -> i32 {
        let mut exit_code = 0;

        for iteration in 1..=iterations {
            info!(iteration, iterations, repo = %self.config.repo, "starting batch");
            let code = match self.run_batch() {
                Ok(report) => {
                    info!(
                        iteration,
                        processed = report.outcomes.len(),
                        failed = report.failures(),
                        "batch finished"
                    );
                    report.exit_code()
                }
                Err(e) => {
                    warn!(iteration, error = %e, "batch aborted");
                    1
                }
            };
            exit_code = exit_code.max(code);

            if iteration < iterations {
                debug!(interval_secs = interval.as_secs(), "sleeping before next batch");
                thread::sleep(interval);
            }
        }

        exit_code
    }

    /// Fetch every issue page once and label the unlabeled issues.
    ///
    /// A failed first fetch is reported and yields a report with no outcomes.
    /// Transport or decode errors after that propagate.
    pub fn run_batch(&self) -> Result<BatchReport> {
        match self.tracker.fetch_issues()? {
            IssueFetch::Page(first, etag) => {
                let report = BatchReport {
                    fetched: true,
                    outcomes: self.process_pages(first)?,
                };
                // Only a fully processed list may be skipped by the next conditional fetch.
                if let Some(etag) = etag.filter(|_| report.succeeded()) {
                    self.tracker.remember_etag(&etag);
                }
                Ok(report)
            }
            IssueFetch::NotModified => {
                info!("issue list unchanged since last fetch");
                self.reporter.unchanged();
                Ok(BatchReport {
                    fetched: true,
                    outcomes: Vec::new(),
                })
            }
            IssueFetch::Failed { status, body } => {
                warn!(status, repo = %self.config.repo, "fetching issues failed");
                self.reporter.fetch_failed(&self.config.repo, status, &body);
                Ok(BatchReport {
                    fetched: false,
                    outcomes: Vec::new(),
                })
            }
        }
    }

    /// Walk the pages starting at `first` in order, labeling as it goes.
    ///
    /// Outcomes are in page order, then in-page order. A failed update is
    /// recorded and the walk continues.
    pub fn process_pages(&self, first: Page<Issue>) -> Result<Vec<Outcome>> {
        let mut outcomes = Vec::new();
        let mut visited = HashSet::new();
        let mut page = first;
        let mut index = 0;

        loop {
            let next = page.next.take();
            debug!(page = index, issues = page.items.len(), "processing issue page");

            for issue in page.items {
                if let Some(outcome) = self.label_issue(issue, index)? {
                    outcomes.push(outcome);
                }
            }

            let Some(url) = next else {
                break;
            };
            if !visited.insert(url.clone()) {
                warn!(url = %url, "issue pagination loops back, stopping");
                break;
            }
            page = self.tracker.fetch_issue_page(&url)?;
            index += 1;
        }

        Ok(outcomes)
    }

    /// Label one issue unless it already has labels.
    ///
    /// Returns `None` for a labeled issue; no request is made for it.
    pub fn label_issue(&self, mut issue: Issue, page: usize) -> Result<Option<Outcome>> {
        if issue.is_labeled() {
            debug!(issue = issue.number, labels = ?issue.labels, "already labeled, skipping");
            return Ok(None);
        }

        let comments = if self.config.check_comments {
            Some(fetch_all_comments(&self.tracker, &issue.comments_url)?)
        } else {
            None
        };

        issue.labels = decide_labels(
            &issue,
            &self.config.rules,
            comments.as_deref(),
            &self.config.default_label,
        );
        issue.strip_assignee();

        let response = self
            .tracker
            .update_issue(&issue)
            .unwrap_or_else(|e| UpdateResponse {
                status: 0,
                body: e.to_string(),
            });
        let success = response.is_success();

        if success {
            info!(issue = issue.number, labels = ?issue.labels, "patched issue");
            self.reporter.issue_patched(issue.number, &issue.title, &issue.labels);
        } else {
            warn!(issue = issue.number, status = response.status, "editing labels failed");
            self.reporter.update_failed(response.status, &response.body);
        }

        Ok(Some(Outcome {
            success,
            issue: issue.number,
            page,
            status: response.status,
            body: response.body,
        }))
    }
}
