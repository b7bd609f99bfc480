// Declare modules
pub mod cli;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod formatter;
pub mod github;
pub mod models;
pub mod pattern;

use anyhow::{Context, Result};
use clap::Parser;

use self::cli::Cli;
use self::config::{load_triage_config, resolve_config};
use self::evaluator::RuleEvaluator;
use self::formatter::OutputGenerator;
use self::github::{GitHubClient, IssueTracker};
use self::models::{MatchResult, TriageConfig};

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    // 1. Parse Args
    let args = Cli::parse();

    // 2. Resolve Configuration
    let config = resolve_config(args)?;

    // 3. Identify the issue
    let Some(issue_number) = config.issue_number else {
        log::error!("No issue context found. This action can only run on issue creation.");
        return Ok(());
    };

    // 4. Connect & load rules
    log::info!("Starting GitHub client for {}/{}", config.owner, config.repo);
    let client = GitHubClient::new(&config)?;

    log::info!("Loading config file at {}", config.config_path);
    let triage = load_triage_config(&client, &config)?;

    // 5. Match & apply
    let result = process_issue(&client, &triage, issue_number, config.dry_run)?;

    // 6. Report
    if config.json_output {
        println!(
            "{}",
            OutputGenerator::generate_json(issue_number, &result, config.dry_run)?
        );
    } else if config.dry_run {
        println!(
            "{}",
            OutputGenerator::generate_summary(issue_number, &result, config.dry_run)
        );
    }

    Ok(())
}

/// Fetches the issue, evaluates the rules against its body and writes the
/// resulting labels and comment back, unless `dry_run` is set.
pub fn process_issue(
    tracker: &dyn IssueTracker,
    config: &TriageConfig,
    issue_number: u64,
    dry_run: bool,
) -> Result<MatchResult> {
    let issue = tracker
        .issue(issue_number)
        .with_context(|| format!("Failed to load issue #{}", issue_number))?;
    log::info!("Triaging issue #{} \"{}\"", issue.number, issue.title);
    log::debug!("Issue #{} body: {:?}", issue.number, issue.body_text());

    let evaluator = RuleEvaluator::new(config);
    let disabled: Vec<&str> = evaluator.invalid_rules().collect();
    if !disabled.is_empty() {
        log::warn!(
            "{} rule(s) skipped for issue #{} because of invalid globs: {}",
            disabled.len(),
            issue.number,
            disabled.join(", ")
        );
    }
    let result = evaluator.evaluate(issue.body_text());

    if dry_run {
        log::info!("Dry run, leaving issue #{} untouched", issue.number);
        return Ok(result);
    }

    if !result.labels.is_empty() {
        log::debug!(
            "Adding labels {} to issue #{}",
            result.labels.join(", "),
            issue.number
        );
        tracker.add_labels(issue.number, &result.labels)?;
    } else if result.comment().is_some() {
        log::debug!(
            "Adding comment to issue #{}, because no labels match",
            issue.number
        );
    } else {
        log::info!("No rules matched issue #{}", issue.number);
    }

    if let Some(comment) = result.comment() {
        tracker.create_comment(issue.number, &comment)?;
    }

    Ok(result)
}
