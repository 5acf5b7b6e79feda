#![allow(dead_code)]

use std::path::{Path, PathBuf};

use labelbot::config::Config;
use labelbot::rules::RuleSet;

pub const REPO: &str = "octo/hello";
pub const TOKEN: &str = "test-token";

pub fn issue_json(
    number: u64,
    title: &str,
    body: &str,
    labels: &[&str],
    api: &str,
) -> serde_json::Value {
    serde_json::json!({
        "number": number,
        "title": title,
        "body": body,
        "state": "open",
        "labels": labels.iter().map(|l| serde_json::json!({"name": l})).collect::<Vec<_>>(),
        "comments_url": format!("{api}/repos/{REPO}/issues/{number}/comments"),
        "assignee": {"login": "octocat"}
    })
}

pub fn comment_json(body: &str) -> serde_json::Value {
    serde_json::json!({"id": 1, "body": body, "user": {"login": "someone"}})
}

pub fn next_link(url: &str) -> String {
    format!("<{url}>; rel=\"next\", <{url}>; rel=\"last\"")
}

/// Sensible default `Config` against `api_url`. Callers can override fields
/// via struct update syntax.
pub fn test_config(api_url: &str) -> Config {
    Config {
        repo: REPO.to_string(),
        token: TOKEN.to_string(),
        api_url: api_url.to_string(),
        rules: RuleSet::from_pairs([(".*bug.*", "possible_bug"), (".*urgent.*", "ASAP")])
            .unwrap(),
        default_label: "triage".to_string(),
        check_comments: false,
        output: None,
    }
}

/// Write `auth.toml` and `labels.toml` into `dir` and return their paths.
pub fn write_config_files(dir: &Path) -> (PathBuf, PathBuf) {
    let auth = dir.join("auth.toml");
    let labels = dir.join("labels.toml");
    std::fs::write(&auth, format!("[github]\ntoken = \"{TOKEN}\"\n")).unwrap();
    std::fs::write(
        &labels,
        "[labels]\n\".*bug.*\" = \"possible_bug\"\n\".*urgent.*\" = \"ASAP\"\n",
    )
    .unwrap();
    (auth, labels)
}
