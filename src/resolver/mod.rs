//! Daemon name resolution: inspector output line → canonical unit name.
//!
//! Resolution walks an ordered pattern table and stops at the first entry
//! whose pattern matches the start of the command descriptor. Authors list
//! more specific patterns before more general ones, so the table must never be
//! reordered or replaced by a hash map.

mod table;

use regex::Regex;

use crate::core::errors::{DrError, Result};

/// How a table entry's pattern is compared with a command descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Literal string prefix.
    Prefix,
    /// Regular expression; must be anchored with `^` to behave like a prefix.
    Regex,
}

#[derive(Debug, Clone)]
enum Matcher {
    Prefix(String),
    Regex(Regex),
}

impl Matcher {
    fn matches(&self, command: &str) -> bool {
        match self {
            Self::Prefix(prefix) => command.starts_with(prefix.as_str()),
            Self::Regex(re) => re.is_match(command),
        }
    }
}

/// One `(pattern, daemon)` entry of the mapping table.
#[derive(Debug, Clone)]
pub struct ProcessMapping {
    matcher: Matcher,
    daemon: String,
}

impl ProcessMapping {
    /// Literal prefix entry.
    pub fn prefix(pattern: impl Into<String>, daemon: impl Into<String>) -> Self {
        Self {
            matcher: Matcher::Prefix(pattern.into()),
            daemon: daemon.into(),
        }
    }

    /// Regular-expression entry.
    pub fn regex(pattern: &str, daemon: impl Into<String>) -> Result<Self> {
        let re = Regex::new(pattern).map_err(|err| DrError::InvalidPattern {
            pattern: pattern.to_string(),
            details: err.to_string(),
        })?;
        Ok(Self {
            matcher: Matcher::Regex(re),
            daemon: daemon.into(),
        })
    }

    fn new(kind: PatternKind, pattern: &str, daemon: &str) -> Result<Self> {
        match kind {
            PatternKind::Prefix => Ok(Self::prefix(pattern, daemon)),
            PatternKind::Regex => Self::regex(pattern, daemon),
        }
    }

    /// Daemon this entry maps to; empty for recognized-but-unmanaged processes.
    pub fn daemon(&self) -> &str {
        &self.daemon
    }
}

/// Result of resolving one inspector line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// A restartable daemon.
    Daemon(&'a str),
    /// Recognized process with no unit to restart.
    Unmanaged,
    /// No table entry matched the descriptor.
    NotFound,
    /// The line had no `:` separator.
    Malformed,
}

/// Ordered process → daemon lookup.
#[derive(Debug, Clone)]
pub struct DaemonResolver {
    table: Vec<ProcessMapping>,
}

impl DaemonResolver {
    /// Resolver over an explicit table, in the given order.
    #[must_use]
    pub fn new(table: Vec<ProcessMapping>) -> Self {
        Self { table }
    }

    /// Resolver over the built-in mapping shipped with this release.
    pub fn builtin() -> Result<Self> {
        let table = table::BUILTIN_MAPPING
            .iter()
            .map(|&(kind, pattern, daemon)| ProcessMapping::new(kind, pattern, daemon))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { table })
    }

    /// Number of table entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Resolve a full `<descriptor>: <command>` inspector line.
    pub fn resolve_line<'a>(&'a self, line: &str) -> Resolution<'a> {
        match command_descriptor(line) {
            Some(command) => self.resolve_command(command),
            None => Resolution::Malformed,
        }
    }

    /// Resolve an already extracted command descriptor.
    pub fn resolve_command<'a>(&'a self, command: &str) -> Resolution<'a> {
        let command = command.trim();
        match self.table.iter().find(|entry| entry.matcher.matches(command)) {
            Some(entry) if entry.daemon.is_empty() => Resolution::Unmanaged,
            Some(entry) => Resolution::Daemon(&entry.daemon),
            None => Resolution::NotFound,
        }
    }
}

/// Text after the first `:` of an inspector line, trimmed.
pub fn command_descriptor(line: &str) -> Option<&str> {
    line.split_once(':').map(|(_, command)| command.trim())
}
