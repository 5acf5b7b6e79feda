use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::CommonArgs;
use crate::error::{Error, Result};
use crate::rules::RuleSet;

/// `auth.toml`:
///
/// ```toml
/// [github]
/// token = "ghp_..."
/// ```
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AuthFile {
    pub github: Option<GitHubSection>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GitHubSection {
    pub token: Option<String>,
}

/// `labels.toml`: one `"<regex>" = "<label>"` entry per rule, in priority
/// order.
///
/// ```toml
/// [labels]
/// ".*serious.*" = "serious_issue"
/// ".*bug.*" = "possible_bug"
/// ```
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LabelFile {
    pub labels: Option<toml::Table>,
}

/// Immutable settings shared by the batch loop and the webhook.
#[derive(Debug, Clone)]
pub struct Config {
    pub repo: String,
    pub token: String,
    pub api_url: String,
    pub rules: RuleSet,
    pub default_label: String,
    pub check_comments: bool,
    pub output: Option<PathBuf>,
}

impl Config {
    pub fn load(args: &CommonArgs) -> Result<Self> {
        let auth = parse_auth(&read_file(Path::new(&args.auth_file))?)?;
        let labels = parse_labels(&read_file(Path::new(&args.label_file))?)?;
        merge(auth, labels, args)
    }
}

fn read_file(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(Error::ConfigNotFound(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

pub fn parse_auth(content: &str) -> Result<String> {
    let auth: AuthFile = toml::from_str(content)?;
    auth.github
        .and_then(|github| github.token)
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| {
            Error::ConfigValidation(
                "auth file must contain a token:\n\n[github]\ntoken = \"XXXXXXXXXXXXXX\""
                    .to_string(),
            )
        })
}

pub fn parse_labels(content: &str) -> Result<RuleSet> {
    let file: LabelFile = toml::from_str(content)?;
    let table = file.labels.ok_or_else(|| {
        Error::ConfigValidation(
            "label file must contain a [labels] table:\n\n[labels]\n\".*serious.*\" = \"serious_issue\"\n\".*bug.*\" = \"possible_bug\""
                .to_string(),
        )
    })?;

    let mut pairs = Vec::with_capacity(table.len());
    for (pattern, value) in table {
        let label = match value {
            toml::Value::String(label) if !label.trim().is_empty() => label,
            other => {
                return Err(Error::ConfigValidation(format!(
                    "label for pattern {pattern:?} must be a non-empty string, got {other}"
                )));
            }
        };
        pairs.push((pattern, label));
    }

    RuleSet::from_pairs(pairs)
}

pub fn merge(token: String, rules: RuleSet, args: &CommonArgs) -> Result<Config> {
    if args.default_label.trim().is_empty() {
        return Err(Error::ConfigValidation("default label must not be empty".to_string()));
    }
    if !is_repo_slug(&args.repo) {
        return Err(Error::ConfigValidation(format!(
            "repo must look like owner/name, got {:?}",
            args.repo
        )));
    }

    Ok(Config {
        repo: args.repo.clone(),
        token,
        api_url: args.api_url.clone(),
        rules,
        default_label: args.default_label.clone(),
        check_comments: args.comments,
        output: args.output.as_ref().map(PathBuf::from),
    })
}

fn is_repo_slug(repo: &str) -> bool {
    matches!(
        repo.split_once('/'),
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/')
    )
}
