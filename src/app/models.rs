use crate::app::pattern::{GlobPattern, MatchOptions};
use serde::{Deserialize, Serialize};

/// Represents the final configuration after merging CLI args and the Actions environment.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub api_url: String,
    pub config_path: String,
    pub config_source: ConfigSource,
    /// Commit the config document is read at. `None` means the default branch.
    pub git_ref: Option<String>,
    pub issue_number: Option<u64>,
    pub dry_run: bool,
    pub json_output: bool,
}

/// Where the triage config document lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Fetched through the repository contents API.
    Repository,
    /// Read from the local filesystem, e.g. an actions/checkout workspace.
    Local,
}

/// One candidate classification.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LabelRule {
    pub label: String,
    pub glob: GlobPattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// The triage config document.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TriageConfig {
    pub labels: Vec<LabelRule>,
    /// Posted first whenever at least one rule matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Posted alone when no rule matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_label_comment: Option<String>,
    #[serde(default)]
    pub options: MatchOptions,
}

/// Outcome of running every rule against one issue body.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    /// Matched labels in rule order, without duplicates.
    pub labels: Vec<String>,
    pub comments: Vec<String>,
}

impl MatchResult {
    /// The comment body to post, if any.
    pub fn comment(&self) -> Option<String> {
        if self.comments.is_empty() {
            None
        } else {
            Some(self.comments.join("\n\n"))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.comments.is_empty()
    }
}

/// The subset of a GitHub issue the triage run needs.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    pub body: Option<String>,
}

impl Issue {
    /// Issue text to match against; a missing body is treated as empty.
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}
