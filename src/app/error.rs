use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Invalid glob pattern `{pattern}`: {source}")]
    Invalid {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("Glob pattern `{pattern}` could not be compiled: {source}")]
    Translate {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// The triage configuration document could not be turned into a usable
/// [`TriageConfig`](crate::app::models::TriageConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Config {path} is not valid JSON for a triage config: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Config {path} is not valid TOML for a triage config: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid config {path}: {reason}")]
    Invalid { path: String, reason: String },
}
