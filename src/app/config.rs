use crate::app::cli::Cli;
use crate::app::error::ConfigError;
use crate::app::github::IssueTracker;
use crate::app::models::{ConfigSource, RuntimeConfig, TriageConfig};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// The part of an `issues` event payload we care about.
#[derive(Deserialize, Debug)]
struct EventPayload {
    issue: Option<EventIssue>,
}

#[derive(Deserialize, Debug)]
struct EventIssue {
    number: u64,
}

fn split_repository(repository: &str) -> Result<(String, String)> {
    match repository.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => anyhow::bail!("Invalid repository '{}', expected owner/name", repository),
    }
}

/// Reads the issue number out of the triggering event, if the event has one.
fn read_event_issue(path: &Path) -> Result<Option<u64>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read event payload at {}", path.display()))?;
    let payload: EventPayload =
        serde_json::from_str(&content).context("Failed to parse event payload")?;
    Ok(payload.issue.map(|issue| issue.number))
}

pub fn resolve_config(cli: Cli) -> Result<RuntimeConfig> {
    let (owner, repo) = split_repository(&cli.repository)?;

    // Explicit flag > event payload > nothing
    let issue_number = match (cli.issue, &cli.event_path) {
        (Some(number), _) => Some(number),
        (None, Some(path)) => read_event_issue(path)?,
        (None, None) => None,
    };

    let config_source = if cli.local_config {
        ConfigSource::Local
    } else {
        ConfigSource::Repository
    };

    Ok(RuntimeConfig {
        token: cli.repo_token,
        owner,
        repo,
        api_url: cli.api_url.trim_end_matches('/').to_string(),
        config_path: cli.config_path,
        config_source,
        git_ref: cli.sha.filter(|sha| !sha.is_empty()),
        issue_number,
        dry_run: cli.dry_run,
        json_output: cli.json,
    })
}

/// Parses and validates a triage config document. `path` picks the format
/// and labels error messages.
pub fn parse_triage_config(path: &str, content: &str) -> Result<TriageConfig, ConfigError> {
    let config: TriageConfig = if path.ends_with(".toml") {
        toml::from_str(content).map_err(|source| ConfigError::Toml {
            path: path.to_string(),
            source,
        })?
    } else {
        serde_json::from_str(content).map_err(|source| ConfigError::Json {
            path: path.to_string(),
            source,
        })?
    };

    validate(path, normalize(config))
}

/// Empty comment strings behave as if they were not set.
fn normalize(mut config: TriageConfig) -> TriageConfig {
    fn non_empty(value: Option<String>) -> Option<String> {
        value.filter(|s| !s.is_empty())
    }

    config.comment = non_empty(config.comment);
    config.no_label_comment = non_empty(config.no_label_comment);
    for rule in &mut config.labels {
        rule.comment = non_empty(rule.comment.take());
    }
    config
}

fn validate(path: &str, config: TriageConfig) -> Result<TriageConfig, ConfigError> {
    if let Some(index) = config
        .labels
        .iter()
        .position(|rule| rule.label.trim().is_empty())
    {
        return Err(ConfigError::Invalid {
            path: path.to_string(),
            reason: format!("rule #{} has an empty label name", index + 1),
        });
    }
    Ok(config)
}

pub fn read_local_config(path: &Path) -> Result<TriageConfig, ConfigError> {
    let display = path.to_string_lossy();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.to_string(),
        source,
    })?;
    parse_triage_config(&display, &content)
}

/// Loads the triage config from wherever the runtime config says it lives.
pub fn load_triage_config(
    tracker: &dyn IssueTracker,
    runtime: &RuntimeConfig,
) -> Result<TriageConfig> {
    let config = match runtime.config_source {
        ConfigSource::Local => read_local_config(Path::new(&runtime.config_path))?,
        ConfigSource::Repository => {
            let content = tracker
                .file_contents(&runtime.config_path, runtime.git_ref.as_deref())
                .with_context(|| format!("Failed to fetch config at {}", runtime.config_path))?;
            parse_triage_config(&runtime.config_path, &content)?
        }
    };

    log::debug!(
        "Loaded {} label rule(s) from {}",
        config.labels.len(),
        runtime.config_path
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pattern::MatchOptions;
    use std::io::Write;

    fn cli(extra: &[&str]) -> Cli {
        use clap::Parser;
        let mut args = vec![
            "issue_triage",
            "--repo-token",
            "secret",
            "--config-path",
            "triage.json",
            "--repository",
            "octo/widgets",
            "--api-url",
            "https://ghe.example.com/api/v3/",
        ];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn parses_json_document() {
        let config = parse_triage_config(
            "triage.json",
            r#"{
                "labels": [
                    {"label": "bug", "glob": "*ERROR*", "comment": "Tagged as bug."},
                    {"label": "no-template", "glob": "!*GENERATED_BY_TEMPLATE*"}
                ],
                "comment": "Thanks for reporting.",
                "no_label_comment": "Please add detail."
            }"#,
        )
        .unwrap();

        assert_eq!(config.labels.len(), 2);
        assert_eq!(config.labels[0].comment.as_deref(), Some("Tagged as bug."));
        assert!(config.labels[1].glob.negated());
        assert_eq!(config.labels[1].glob.base(), "*GENERATED_BY_TEMPLATE*");
        assert_eq!(config.comment.as_deref(), Some("Thanks for reporting."));
        assert_eq!(config.no_label_comment.as_deref(), Some("Please add detail."));
        assert_eq!(config.options, MatchOptions::default());
    }

    #[test]
    fn parses_toml_document() {
        let config = parse_triage_config(
            "triage.toml",
            r#"
                comment = "Thanks!"

                [options]
                case_insensitive = true

                [[labels]]
                label = "bug"
                glob = "*error*"
            "#,
        )
        .unwrap();

        assert_eq!(config.labels[0].label, "bug");
        assert!(config.options.case_insensitive);
        assert!(config.options.backslash_escape);
    }

    #[test]
    fn missing_labels_is_invalid() {
        let err = parse_triage_config("triage.json", r#"{"comment": "hi"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_triage_config(
            "triage.json",
            r#"{"labels": [], "no_labels_comment": "typo"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }

    #[test]
    fn empty_label_name_is_invalid() {
        let err = parse_triage_config(
            "triage.json",
            r#"{"labels": [{"label": "ok", "glob": "*"}, {"label": " ", "glob": "*"}]}"#,
        )
        .unwrap_err();
        match err {
            ConfigError::Invalid { reason, .. } => assert!(reason.contains("#2")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_comments_are_absent() {
        let config = parse_triage_config(
            "triage.json",
            r#"{"labels": [{"label": "bug", "glob": "*", "comment": ""}], "comment": "", "no_label_comment": ""}"#,
        )
        .unwrap();

        assert_eq!(config.comment, None);
        assert_eq!(config.no_label_comment, None);
        assert_eq!(config.labels[0].comment, None);
    }

    #[test]
    fn invalid_glob_is_not_a_config_error() {
        let config = parse_triage_config(
            "triage.json",
            r#"{"labels": [{"label": "broken", "glob": "[abc"}]}"#,
        )
        .unwrap();
        assert_eq!(config.labels[0].glob.base(), "[abc");
    }

    #[test]
    fn reads_local_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"labels": [{{"label": "bug", "glob": "*ERROR*"}}]}}"#).unwrap();

        let config = read_local_config(file.path()).unwrap();
        assert_eq!(config.labels[0].label, "bug");

        let missing = read_local_config(Path::new("/nonexistent/triage.json")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }

    #[test]
    fn resolves_issue_from_event_payload() {
        let mut event = tempfile::NamedTempFile::new().unwrap();
        write!(event, r#"{{"action": "opened", "issue": {{"number": 17, "title": "x"}}}}"#)
            .unwrap();
        let path = event.path().to_string_lossy().into_owned();

        let runtime = resolve_config(cli(&["--event-path", &path, "--sha", "abc123"])).unwrap();

        assert_eq!(runtime.owner, "octo");
        assert_eq!(runtime.repo, "widgets");
        assert_eq!(runtime.issue_number, Some(17));
        assert_eq!(runtime.git_ref.as_deref(), Some("abc123"));
        assert_eq!(runtime.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(runtime.config_source, ConfigSource::Repository);
    }

    #[test]
    fn explicit_issue_wins_over_event() {
        let mut event = tempfile::NamedTempFile::new().unwrap();
        write!(event, r#"{{"issue": {{"number": 17}}}}"#).unwrap();
        let path = event.path().to_string_lossy().into_owned();

        let runtime =
            resolve_config(cli(&["--event-path", &path, "--issue", "3", "--local-config"]))
                .unwrap();

        assert_eq!(runtime.issue_number, Some(3));
        assert_eq!(runtime.config_source, ConfigSource::Local);
    }

    #[test]
    fn event_without_issue_yields_none() {
        let mut event = tempfile::NamedTempFile::new().unwrap();
        write!(event, r#"{{"pull_request": {{"number": 5}}}}"#).unwrap();
        let path = event.path().to_string_lossy().into_owned();

        let runtime = resolve_config(cli(&["--event-path", &path])).unwrap();
        assert_eq!(runtime.issue_number, None);
    }

    #[test]
    fn rejects_malformed_repository() {
        assert!(split_repository("widgets").is_err());
        assert!(split_repository("/widgets").is_err());
        assert!(split_repository("octo/widgets/extra").is_err());
        assert_eq!(
            split_repository("octo/widgets").unwrap(),
            ("octo".to_string(), "widgets".to_string())
        );
    }
}
