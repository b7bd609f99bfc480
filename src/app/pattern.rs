use crate::app::error::PatternError;
use globset::GlobBuilder;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Knobs that pin the glob dialect used against issue text.
///
/// Different glob engines disagree on these defaults, so every one of them is
/// spelled out here and passed to the engine explicitly.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct MatchOptions {
    /// Fold case when comparing literals and classes.
    pub case_insensitive: bool,
    /// Stop `*` and `?` from matching `/`. Issue bodies are not paths, so off.
    pub literal_separator: bool,
    /// Treat `\` as an escape for the next character.
    pub backslash_escape: bool,
    /// Allow empty branches in `{a,}` alternations.
    pub empty_alternates: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            literal_separator: false,
            backslash_escape: true,
            empty_alternates: false,
        }
    }
}

/// A glob as written in the config, split into its negation flag and the
/// pattern proper.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub struct GlobPattern {
    negated: bool,
    base: String,
}

impl GlobPattern {
    /// Splits off leading `!`s. Each one flips the sense of the match, so
    /// `!!foo` is the same as `foo`.
    pub fn parse(raw: &str) -> Self {
        let base = raw.trim_start_matches('!');
        let bangs = raw.len() - base.len();
        Self {
            negated: bangs % 2 == 1,
            base: base.to_string(),
        }
    }

    pub fn negated(&self) -> bool {
        self.negated
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn compile(&self, options: &MatchOptions) -> Result<CompiledGlob, PatternError> {
        let glob = GlobBuilder::new(&self.base)
            .case_insensitive(options.case_insensitive)
            .literal_separator(options.literal_separator)
            .backslash_escape(options.backslash_escape)
            .empty_alternates(options.empty_alternates)
            .build()
            .map_err(|source| PatternError::Invalid {
                pattern: self.to_string(),
                source,
            })?;

        let regex = RegexBuilder::new(&unicode_regex(glob.regex()))
            .dot_matches_new_line(true)
            .case_insensitive(options.case_insensitive)
            .build()
            .map_err(|source| PatternError::Translate {
                pattern: self.to_string(),
                source,
            })?;

        Ok(CompiledGlob {
            negated: self.negated,
            regex,
        })
    }
}

/// Rewrites globset's byte-oriented regex so it runs on characters.
///
/// globset emits `(?-u)` and spells every non-ASCII literal as its UTF-8
/// bytes (`\xc3\xa9`). Dropping the flag and folding each run of escaped
/// bytes back into the characters they encode lets `?` and classes consume
/// whole characters.
fn unicode_regex(byte_regex: &str) -> String {
    let body = byte_regex.strip_prefix("(?-u)").unwrap_or(byte_regex);
    let mut out = String::with_capacity(body.len());
    let mut pending: Vec<u8> = Vec::new();
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_bytes(&mut pending, &mut out);
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            flush_bytes(&mut pending, &mut out);
            out.push(c);
            break;
        };
        if next == 'x' {
            let hex = chars.as_str().get(..2).unwrap_or_default();
            if let Ok(byte) = u8::from_str_radix(hex, 16) {
                if byte >= 0x80 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                    pending.push(byte);
                    chars.nth(1);
                    continue;
                }
            }
        }
        flush_bytes(&mut pending, &mut out);
        out.push(c);
        out.push(next);
    }
    flush_bytes(&mut pending, &mut out);
    out
}

fn flush_bytes(pending: &mut Vec<u8>, out: &mut String) {
    if pending.is_empty() {
        return;
    }
    out.push_str(&regex::escape(&String::from_utf8_lossy(pending)));
    pending.clear();
}

impl From<String> for GlobPattern {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<GlobPattern> for String {
    fn from(pattern: GlobPattern) -> Self {
        pattern.to_string()
    }
}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("!")?;
        }
        f.write_str(&self.base)
    }
}

/// A ready-to-run glob. Matching is a pure function of the target.
#[derive(Debug, Clone)]
pub struct CompiledGlob {
    negated: bool,
    regex: Regex,
}

impl CompiledGlob {
    /// True iff the whole of `target` matches (or, when negated, does not).
    pub fn is_match(&self, target: &str) -> bool {
        // Compiled with dot-matches-newline, so `*` runs across `\r\n`.
        self.regex.is_match(target) != self.negated
    }
}

/// One-shot helper: parse, compile and match in a single call.
pub fn matches(target: &str, pattern: &str, options: &MatchOptions) -> Result<bool, PatternError> {
    let compiled = GlobPattern::parse(pattern).compile(options)?;
    Ok(compiled.is_match(target))
}
