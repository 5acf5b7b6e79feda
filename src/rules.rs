use regex::{Regex, RegexBuilder};

use crate::error::{Error, Result};
use crate::sources::Issue;

/// A case-insensitive pattern and the label it assigns.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: Regex,
    label: String,
}

impl Rule {
    pub fn new(pattern: &str, label: impl Into<String>) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self {
            pattern: regex,
            label: label.into(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Substring search, not a full match.
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Rules in priority order (the order they were declared in).
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn from_pairs<I, P, L>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, L)>,
        P: AsRef<str>,
        L: Into<String>,
    {
        let rules = pairs
            .into_iter()
            .map(|(pattern, label)| Rule::new(pattern.as_ref(), label))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Compute the labels for an unlabeled issue.
///
/// Every rule matching the title or the body contributes its label, in rule
/// order. When `comments` is given, each comment is then scanned the same way
/// in comment order. Labels are not deduplicated: a rule that matches the
/// title and two comments yields its label three times. If nothing matched,
/// the result is exactly `[default_label]`.
pub fn decide_labels(
    issue: &Issue,
    rules: &RuleSet,
    comments: Option<&[String]>,
    default_label: &str,
) -> Vec<String> {
    let mut labels: Vec<String> = rules
        .iter()
        .filter(|rule| rule.is_match(&issue.title) || rule.is_match(issue.body_text()))
        .map(|rule| rule.label().to_string())
        .collect();

    for comment in comments.unwrap_or_default() {
        labels.extend(
            rules
                .iter()
                .filter(|rule| rule.is_match(comment))
                .map(|rule| rule.label().to_string()),
        );
    }

    if labels.is_empty() {
        labels.push(default_label.to_string());
    }
    labels
}
