//! Before/after line classification
//!
//! Marks which lines of a pre-clean report are absent from the post-clean report.
//! This is a classification of `before`, not a set difference: output has the same
//! length and order as `before`, and identical lines always share a classification.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::models::MetadataReport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightedLine {
    pub line: String,
    pub removed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HighlightedReport {
    lines: Vec<HighlightedLine>,
}

impl HighlightedReport {
    pub fn lines(&self) -> &[HighlightedLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn removed_lines(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|l| l.removed)
            .map(|l| l.line.as_str())
    }

    pub fn removed_count(&self) -> usize {
        self.lines.iter().filter(|l| l.removed).count()
    }
}

impl fmt::Display for HighlightedReport {
    /// Plain-text rendering: `- ` marks a removed line, two spaces a kept one.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, l) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            let marker = if l.removed { "- " } else { "  " };
            write!(f, "{}{}", marker, l.line)?;
        }
        Ok(())
    }
}

/// Classify every line of `before` as removed (non-blank and not in `after`) or kept.
///
/// Equality is exact: no whitespace normalization, no case folding.
pub fn highlight_lines<'a, B, A>(before: B, after: A) -> HighlightedReport
where
    B: IntoIterator<Item = &'a str>,
    A: IntoIterator<Item = &'a str>,
{
    let after: HashSet<&str> = after.into_iter().collect();

    let lines = before
        .into_iter()
        .map(|line| HighlightedLine {
            line: line.to_string(),
            removed: !line.trim().is_empty() && !after.contains(line),
        })
        .collect();

    HighlightedReport { lines }
}

pub fn highlight_removed(before: &MetadataReport, after: &MetadataReport) -> HighlightedReport {
    highlight_lines(before.lines(), after.lines())
}
