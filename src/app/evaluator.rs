use crate::app::models::{MatchResult, TriageConfig};
use crate::app::pattern::CompiledGlob;

struct CompiledRule {
    label: String,
    comment: Option<String>,
    /// `None` when the glob failed to compile; such a rule never matches.
    glob: Option<CompiledGlob>,
}

/// A [`TriageConfig`] with every glob compiled up front.
pub struct RuleEvaluator {
    rules: Vec<CompiledRule>,
    comment: Option<String>,
    no_label_comment: Option<String>,
}

impl RuleEvaluator {
    pub fn new(config: &TriageConfig) -> Self {
        let rules = config
            .labels
            .iter()
            .map(|rule| {
                let glob = match rule.glob.compile(&config.options) {
                    Ok(glob) => Some(glob),
                    Err(err) => {
                        log::warn!("Rule for label '{}' will never match: {}", rule.label, err);
                        None
                    }
                };
                CompiledRule {
                    label: rule.label.clone(),
                    comment: rule.comment.clone(),
                    glob,
                }
            })
            .collect();

        Self {
            rules,
            comment: config.comment.clone(),
            no_label_comment: config.no_label_comment.clone(),
        }
    }

    /// Labels of rules whose glob could not be compiled.
    pub fn invalid_rules(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(|rule| rule.glob.is_none())
            .map(|rule| rule.label.as_str())
    }

    pub fn evaluate(&self, target: &str) -> MatchResult {
        let mut labels: Vec<String> = Vec::new();
        let mut comments: Vec<String> = self.comment.iter().cloned().collect();

        for rule in &self.rules {
            let Some(glob) = &rule.glob else {
                continue;
            };
            if !glob.is_match(target) {
                continue;
            }
            log::debug!("Rule for label '{}' matched", rule.label);
            if !labels.contains(&rule.label) {
                labels.push(rule.label.clone());
            }
            if let Some(comment) = &rule.comment {
                comments.push(comment.clone());
            }
        }

        if labels.is_empty() {
            comments = self.no_label_comment.iter().cloned().collect();
        }

        MatchResult { labels, comments }
    }
}

/// Compiles `config` and evaluates it against `target` in one go.
pub fn evaluate(config: &TriageConfig, target: &str) -> MatchResult {
    RuleEvaluator::new(config).evaluate(target)
}
