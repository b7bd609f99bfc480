use clap::Parser;
use std::path::PathBuf;

/// Every flag falls back to the variable GitHub Actions sets for it, so the
/// binary runs unchanged as an action step.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Label newly opened issues by matching their body against glob rules"
)]
pub struct Cli {
    /// Token used to authenticate against the GitHub API
    #[arg(long, env = "INPUT_REPO-TOKEN", hide_env_values = true)]
    pub repo_token: String,

    /// Path of the triage config document (JSON, or TOML when it ends in .toml).
    ///
    /// Only `labels`, `comment`, `no_label_comment` and `options` are accepted
    /// at the top level; any other key (including `$schema`) is rejected.
    #[arg(long, env = "INPUT_CONFIG-PATH")]
    pub config_path: String,

    /// Read the config from the local filesystem instead of the repository
    #[arg(long)]
    pub local_config: bool,

    /// Repository in owner/name form
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: String,

    /// Commit to read the config document at
    #[arg(long, env = "GITHUB_SHA")]
    pub sha: Option<String>,

    /// Issue to triage; defaults to the issue in the triggering event
    #[arg(long)]
    pub issue: Option<u64>,

    /// Path to the JSON payload of the triggering event
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub api_url: String,

    /// Evaluate the rules and report, without adding labels or comments
    #[arg(long)]
    pub dry_run: bool,

    /// Print the match result as JSON
    #[arg(long)]
    pub json: bool,
}
