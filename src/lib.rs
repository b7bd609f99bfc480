//! Labels newly opened GitHub issues by matching their body against glob rules.

pub mod app;

pub use app::evaluator::{evaluate, RuleEvaluator};
pub use app::models::{LabelRule, MatchResult, TriageConfig};
pub use app::pattern::{matches, GlobPattern, MatchOptions};
