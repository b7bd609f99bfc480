use crate::app::models::MatchResult;
use anyhow::Result;
use serde::Serialize;

pub struct OutputGenerator;

#[derive(Serialize)]
struct JsonReport<'a> {
    issue: u64,
    labels: &'a [String],
    comment: Option<String>,
    dry_run: bool,
}

impl OutputGenerator {
    /// Human-readable description of what the run does (or would do) to the issue.
    pub fn generate_summary(issue: u64, result: &MatchResult, dry_run: bool) -> String {
        let verb = if dry_run { "Would" } else { "Will" };
        let mut output = format!("Issue #{}\n", issue);

        if result.labels.is_empty() {
            output.push_str("No rules matched.\n");
        } else {
            output.push_str(&format!(
                "{} add labels: {}\n",
                verb,
                result.labels.join(", ")
            ));
        }

        match result.comment() {
            Some(comment) => {
                output.push_str(&format!("{} post comment:\n", verb));
                for line in comment.lines() {
                    output.push_str(&format!("    {}\n", line));
                }
            }
            None => output.push_str("No comment to post.\n"),
        }

        output.trim_end().to_string()
    }

    pub fn generate_json(issue: u64, result: &MatchResult, dry_run: bool) -> Result<String> {
        let report = JsonReport {
            issue,
            labels: &result.labels,
            comment: result.comment(),
            dry_run,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}
