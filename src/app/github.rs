use crate::app::models::{Issue, RuntimeConfig};
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{header, Url};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const USER_AGENT: &str = concat!("issue-triage/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

/// The hosting-platform operations a triage run needs.
pub trait IssueTracker {
    fn issue(&self, number: u64) -> Result<Issue>;
    /// Text of a file in the repository, at `git_ref` or the default branch.
    fn file_contents(&self, path: &str, git_ref: Option<&str>) -> Result<String>;
    fn add_labels(&self, number: u64, labels: &[String]) -> Result<()>;
    fn create_comment(&self, number: u64, body: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: String,
    #[serde(default)]
    encoding: String,
}

/// GitHub REST client scoped to one repository.
pub struct GitHubClient {
    http: Client,
    base_url: Url,
    token: String,
    owner: String,
    repo: String,
}

impl GitHubClient {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        let base_url = Url::parse(&config.api_url)
            .with_context(|| format!("Invalid API URL '{}'", config.api_url))?;

        Ok(Self {
            http,
            base_url,
            token: config.token.clone(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
        })
    }

    /// `{base}/repos/{owner}/{repo}/{segments...}`, each segment percent-encoded.
    fn repo_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("API URL '{}' cannot be a base", self.base_url))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }
}

impl IssueTracker for GitHubClient {
    fn issue(&self, number: u64) -> Result<Issue> {
        let number = number.to_string();
        let url = self.repo_url(["issues", number.as_str()])?;
        log::debug!("GET {}", url);

        let issue = self
            .authorized(self.http.get(url))
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("Failed to fetch issue #{}", number))?
            .json::<Issue>()
            .with_context(|| format!("Failed to decode issue #{}", number))?;
        Ok(issue)
    }

    fn file_contents(&self, path: &str, git_ref: Option<&str>) -> Result<String> {
        let mut url = self.repo_url(
            std::iter::once("contents").chain(path.split('/').filter(|s| !s.is_empty())),
        )?;
        if let Some(git_ref) = git_ref {
            url.query_pairs_mut().append_pair("ref", git_ref);
        }
        log::debug!("GET {}", url);

        let response: ContentResponse = self
            .authorized(self.http.get(url))
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("Failed to fetch {}", path))?
            .json()
            .with_context(|| format!("{} is not a file", path))?;

        decode_content(&response)
    }

    fn add_labels(&self, number: u64, labels: &[String]) -> Result<()> {
        let number_str = number.to_string();
        let url = self.repo_url(["issues", number_str.as_str(), "labels"])?;

        self.authorized(self.http.post(url))
            .json(&json!({ "labels": labels }))
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("Failed to add labels to issue #{}", number))?;

        log::info!("Added labels [{}] to issue #{}", labels.join(", "), number);
        Ok(())
    }

    fn create_comment(&self, number: u64, body: &str) -> Result<()> {
        let number_str = number.to_string();
        let url = self.repo_url(["issues", number_str.as_str(), "comments"])?;

        self.authorized(self.http.post(url))
            .json(&json!({ "body": body }))
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("Failed to comment on issue #{}", number))?;

        log::info!("Commented on issue #{}", number);
        Ok(())
    }
}

fn decode_content(response: &ContentResponse) -> Result<String> {
    if !response.encoding.is_empty() && response.encoding != "base64" {
        anyhow::bail!("Unsupported content encoding '{}'", response.encoding);
    }
    // The API wraps base64 payloads at 60 columns.
    let compact: String = response
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .context("File content is not valid base64")?;
    String::from_utf8(bytes).context("File content is not valid UTF-8")
}
