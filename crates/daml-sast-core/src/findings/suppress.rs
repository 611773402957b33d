// daml-sast-core/src/findings/suppress.rs
// ============================================================================
// Module: Suppressions
// Description: Glob-based suppression rules and the suppression file format.
// Purpose: Silence accepted findings without touching the rules.
// Dependencies: globset, thiserror
// ============================================================================

//! ## Overview
//! A suppression file holds one rule per line:
//!
//! ```text
//! # rule      module      definition                  fingerprint
//! DAML-AUTH-* Main.*      "Choice Main.Iou:Transfer"  *
//! ```
//!
//! Every field is a glob; `*` (or an omitted trailing field) matches
//! anything. Tokens containing whitespace are double-quoted. A finding is
//! suppressed when any rule matches all of its fields. Applying a list is a
//! pure filter, so applying it twice equals applying it once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use globset::Glob;
use globset::GlobMatcher;
use thiserror::Error;

use crate::findings::model::Finding;
use crate::findings::read_text_bounded;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum suppression file size in bytes.
pub const MAX_SUPPRESSION_FILE_BYTES: u64 = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Suppression file failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuppressionError {
    /// The file could not be read.
    #[error("suppression file io error: {0}")]
    Io(String),
    /// A line is malformed.
    #[error("suppression syntax error on line {line}: {message}")]
    Syntax {
        /// One-based line number.
        line: usize,
        /// Failure detail.
        message: String,
    },
    /// A glob pattern is invalid.
    #[error("invalid suppression pattern {pattern:?}: {message}")]
    Pattern {
        /// Offending pattern.
        pattern: String,
        /// Failure detail.
        message: String,
    },
}

// ============================================================================
// SECTION: Rules
// ============================================================================

/// One suppression rule.
#[derive(Debug, Clone)]
pub struct SuppressionRule {
    /// Rule id pattern.
    rule_id: GlobMatcher,
    /// Module pattern; `None` matches any module.
    module: Option<GlobMatcher>,
    /// Definition pattern; `None` matches any definition.
    definition: Option<GlobMatcher>,
    /// Fingerprint pattern; `None` matches any fingerprint.
    fingerprint: Option<GlobMatcher>,
}

impl SuppressionRule {
    /// Builds a rule from patterns; `None` or `*` match anything.
    ///
    /// # Errors
    ///
    /// Returns [`SuppressionError::Pattern`] when a pattern is not a valid glob.
    pub fn new(
        rule_id: &str,
        module: Option<&str>,
        definition: Option<&str>,
        fingerprint: Option<&str>,
    ) -> Result<Self, SuppressionError> {
        Ok(Self {
            rule_id: compile(rule_id)?,
            module: optional_pattern(module)?,
            definition: optional_pattern(definition)?,
            fingerprint: optional_pattern(fingerprint)?,
        })
    }

    /// Returns true when the rule matches every field of the finding.
    #[must_use]
    pub fn matches(&self, finding: &Finding) -> bool {
        self.rule_id.is_match(&finding.rule_id)
            && field_matches(self.module.as_ref(), &finding.location.module)
            && field_matches(self.definition.as_ref(), &finding.location.definition)
            && field_matches(self.fingerprint.as_ref(), &finding.fingerprint)
    }
}

/// Ordered list of suppression rules.
#[derive(Debug, Clone, Default)]
pub struct SuppressionList {
    /// Rules in file order.
    rules: Vec<SuppressionRule>,
}

impl SuppressionList {
    /// Builds a list from rules.
    #[must_use]
    pub const fn new(rules: Vec<SuppressionRule>) -> Self {
        Self {
            rules,
        }
    }

    /// Parses the suppression file format.
    ///
    /// # Errors
    ///
    /// Returns [`SuppressionError`] on malformed lines or invalid globs.
    pub fn parse(text: &str) -> Result<Self, SuppressionError> {
        let mut rules = Vec::new();
        for (index, raw_line) in text.lines().enumerate() {
            let line = strip_comment(raw_line);
            let tokens = tokenize(line).map_err(|message| SuppressionError::Syntax {
                line: index + 1,
                message,
            })?;
            match tokens.as_slice() {
                [] => {}
                [rule_id, rest @ ..] if rest.len() <= 3 => {
                    rules.push(SuppressionRule::new(
                        rule_id,
                        rest.first().map(String::as_str),
                        rest.get(1).map(String::as_str),
                        rest.get(2).map(String::as_str),
                    )?);
                }
                _ => {
                    return Err(SuppressionError::Syntax {
                        line: index + 1,
                        message: format!("expected at most 4 fields, found {}", tokens.len()),
                    });
                }
            }
        }
        Ok(Self::new(rules))
    }

    /// Reads and parses a suppression file.
    ///
    /// # Errors
    ///
    /// Returns [`SuppressionError`] when the file cannot be read, exceeds
    /// [`MAX_SUPPRESSION_FILE_BYTES`], or cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, SuppressionError> {
        let text =
            read_text_bounded(path, MAX_SUPPRESSION_FILE_BYTES).map_err(SuppressionError::Io)?;
        Self::parse(&text)
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true when the list holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns true when any rule matches the finding.
    #[must_use]
    pub fn is_suppressed(&self, finding: &Finding) -> bool {
        self.rules.iter().any(|rule| rule.matches(finding))
    }

    /// Returns the findings no rule matches, in their original order.
    #[must_use]
    pub fn apply(&self, findings: Vec<Finding>) -> Vec<Finding> {
        findings.into_iter().filter(|finding| !self.is_suppressed(finding)).collect()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Compiles a glob pattern.
fn compile(pattern: &str) -> Result<GlobMatcher, SuppressionError> {
    Glob::new(pattern).map(|glob| glob.compile_matcher()).map_err(|err| {
        SuppressionError::Pattern {
            pattern: pattern.to_string(),
            message: err.to_string(),
        }
    })
}

/// Compiles an optional pattern, treating `*` as absent.
fn optional_pattern(pattern: Option<&str>) -> Result<Option<GlobMatcher>, SuppressionError> {
    match pattern {
        None | Some("*") => Ok(None),
        Some(pattern) => compile(pattern).map(Some),
    }
}

/// Matches a field against an optional pattern.
fn field_matches(pattern: Option<&GlobMatcher>, value: &str) -> bool {
    pattern.is_none_or(|pattern| pattern.is_match(value))
}

/// Drops a `#` comment that starts outside quotes.
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            '#' if !quoted => return &line[.. index],
            _ => {}
        }
    }
    line
}

/// Splits a line on whitespace, keeping double-quoted tokens whole.
fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_token = false;
    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            ch if ch.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            ch => {
                current.push(ch);
                in_token = true;
            }
        }
    }
    if quoted {
        return Err("unterminated quote".to_string());
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
