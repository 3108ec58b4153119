//! Filename pattern matching.
//!
//! Only `*` (any run of characters) and `?` (exactly one character) are
//! special. Everything else is literal, comparison ignores case, and a
//! pattern is matched against a single file name, never a path.

use std::ffi::OsStr;

use regex::{Regex, RegexBuilder};

/// A compiled search pattern such as `*.txt`.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    source: String,
    kind: PatternKind,
}

#[derive(Debug, Clone)]
enum PatternKind {
    /// `*` or the empty pattern.
    Everything,
    Wildcard(Regex),
    /// Invalid patterns match no file.
    Nothing,
}

impl SearchPattern {
    /// Compile a pattern. Invalid patterns are accepted and match nothing.
    pub fn new(pattern: &str) -> Self {
        let kind = compile(pattern);
        if matches!(kind, PatternKind::Nothing) {
            tracing::debug!(target: "fswalk::pattern", pattern, "invalid search pattern matches nothing");
        }
        Self {
            source: pattern.to_string(),
            kind,
        }
    }

    /// Pattern that accepts every name.
    pub fn any() -> Self {
        Self::new("*")
    }

    /// Test a single file name.
    pub fn is_match(&self, name: impl AsRef<OsStr>) -> bool {
        match &self.kind {
            PatternKind::Everything => true,
            PatternKind::Wildcard(regex) => regex.is_match(&name.as_ref().to_string_lossy()),
            PatternKind::Nothing => false,
        }
    }

    /// Whether the pattern compiled.
    pub fn is_valid(&self) -> bool {
        !matches!(self.kind, PatternKind::Nothing)
    }

    /// The pattern as given.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Default for SearchPattern {
    fn default() -> Self {
        Self::any()
    }
}

impl From<&str> for SearchPattern {
    fn from(pattern: &str) -> Self {
        Self::new(pattern)
    }
}

fn compile(pattern: &str) -> PatternKind {
    if pattern.is_empty() || pattern.chars().all(|c| c == '*') {
        return PatternKind::Everything;
    }
    let Some(source) = translate(pattern) else {
        return PatternKind::Nothing;
    };

    // Unicode case folding, and `.` matches one scalar value, not one byte.
    match RegexBuilder::new(&source)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
    {
        Ok(regex) => PatternKind::Wildcard(regex),
        Err(_) => PatternKind::Nothing,
    }
}

/// Rewrite a wildcard pattern into an anchored regex with every literal
/// character escaped.
fn translate(pattern: &str) -> Option<String> {
    let mut source = String::with_capacity(pattern.len() * 2 + 4);
    source.push_str(r"\A");
    let mut prev_star = false;

    for c in pattern.chars() {
        if is_separator(c) || c == '\0' {
            return None;
        }
        match c {
            '*' if prev_star => continue,
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            _ => {
                let mut buf = [0u8; 4];
                source.push_str(&regex::escape(c.encode_utf8(&mut buf)));
            }
        }
        prev_star = c == '*';
    }
    source.push_str(r"\z");
    Some(source)
}

fn is_separator(c: char) -> bool {
    c == '/' || (cfg!(windows) && c == '\\')
}
