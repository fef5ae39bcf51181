// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! File and directory classification.
//!
//! Every entry copied into a distribution is first run through a classifier
//! that decides whether the entry is ignorable, and if not, whether it counts
//! as source, documentation, both, or neither. The release variant then picks
//! which of those buckets survive.
//!
//! # Matching Rules
//!
//! Classification only ever looks at names. File content is never read, so
//! classifying the same name twice always yields the same answer.
//!
//! - Ignore rules are checked in order and the first match wins. A rule may
//!   be scoped to a parent directory name, e.g., `bin` only under `doc`.
//! - Source and documentation patterns are independent. A name may match
//!   both tables, or neither.
//! - `CMakeLists.txt` never counts as documentation, even though the `*.txt`
//!   doc pattern would otherwise claim it.
//!
//! All patterns are case-sensitive globs.

use crate::config::{IgnoreRule, PatternTable, ReleaseVariant};

use glob::{MatchOptions, Pattern};
use std::path::Path;

const CMAKE_LISTS: &str = "CMakeLists.txt";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Category a name can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileClassification {
    /// Build files, sources, scripts, licenses.
    Source,

    /// Rendered documentation and its assets.
    Doc,

    /// Never copied.
    Ignored,

    /// Matches no table, only kept by the full variant.
    Unclassified,
}

/// Result of classifying one name.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    ignored: bool,
    source: bool,
    doc: bool,
}

impl Classification {
    /// Classification of an ignored entry.
    pub const fn ignored() -> Self {
        Self {
            ignored: true,
            source: false,
            doc: false,
        }
    }

    /// Classification of a kept entry.
    pub const fn kept(source: bool, doc: bool) -> Self {
        Self {
            ignored: false,
            source,
            doc,
        }
    }

    pub const fn is_ignored(&self) -> bool {
        self.ignored
    }

    pub const fn is_source(&self) -> bool {
        self.source
    }

    pub const fn is_doc(&self) -> bool {
        self.doc
    }

    /// List every category the entry belongs to.
    pub fn tags(&self) -> Vec<FileClassification> {
        if self.ignored {
            return vec![FileClassification::Ignored];
        }

        let mut tags = Vec::new();
        if self.source {
            tags.push(FileClassification::Source);
        }

        if self.doc {
            tags.push(FileClassification::Doc);
        }

        if tags.is_empty() {
            tags.push(FileClassification::Unclassified);
        }

        tags
    }

    /// Check if a file with this classification belongs in a release variant.
    pub const fn admits(&self, variant: ReleaseVariant) -> bool {
        if self.ignored {
            return false;
        }

        if variant.is_full() {
            return true;
        }

        (variant.include_source && self.source) || (variant.include_docs && self.doc)
    }
}

/// Classify entry names.
pub trait Classify: Send + Sync + 'static {
    /// Classify an entry by its name and the directory containing it.
    fn classify(&self, name: &str, parent: &Path) -> Classification;

    /// Report which ignore rule claims an entry, if any.
    fn ignore_rule(&self, _name: &str, _parent: &Path) -> Option<&str> {
        None
    }
}

/// Classifier driven by glob pattern tables.
#[derive(Debug, Clone)]
pub struct PatternClassifier {
    ignore: Vec<CompiledIgnoreRule>,
    source: Vec<Pattern>,
    doc: Vec<Pattern>,
}

#[derive(Debug, Clone)]
struct CompiledIgnoreRule {
    name: Pattern,
    parent: Option<Pattern>,
}

impl PatternClassifier {
    /// Compile classifier from pattern table.
    ///
    /// # Errors
    ///
    /// - Return [`ClassifyError::Pattern`] if any pattern is not a valid glob.
    pub fn try_new(table: &PatternTable) -> Result<Self> {
        let ignore = table
            .ignore
            .iter()
            .map(|IgnoreRule { pattern, parent }| {
                Ok(CompiledIgnoreRule {
                    name: compile(pattern)?,
                    parent: parent.as_deref().map(compile).transpose()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let source = table
            .source
            .iter()
            .map(|pattern| compile(pattern))
            .collect::<Result<Vec<_>>>()?;
        let doc = table
            .doc
            .iter()
            .map(|pattern| compile(pattern))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            ignore,
            source,
            doc,
        })
    }

    pub fn is_source(&self, name: &str) -> bool {
        self.source
            .iter()
            .any(|pattern| pattern.matches_with(name, MATCH_OPTIONS))
    }

    pub fn is_doc(&self, name: &str) -> bool {
        name != CMAKE_LISTS
            && self
                .doc
                .iter()
                .any(|pattern| pattern.matches_with(name, MATCH_OPTIONS))
    }
}

impl Classify for PatternClassifier {
    /// Find first ignore rule matching entry.
    ///
    /// Returns the name pattern of the matching rule.
    fn ignore_rule(&self, name: &str, parent: &Path) -> Option<&str> {
        let parent_name = parent
            .file_name()
            .map(|parent| parent.to_string_lossy())
            .unwrap_or_default();

        self.ignore
            .iter()
            .find(|rule| {
                rule.name.matches_with(name, MATCH_OPTIONS)
                    && rule
                        .parent
                        .as_ref()
                        .is_none_or(|parent| parent.matches_with(&parent_name, MATCH_OPTIONS))
            })
            .map(|rule| rule.name.as_str())
    }

    fn classify(&self, name: &str, parent: &Path) -> Classification {
        if self.ignore_rule(name, parent).is_some() {
            return Classification::ignored();
        }

        Classification::kept(self.is_source(name), self.is_doc(name))
    }
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|err| ClassifyError::Pattern {
        source: err,
        pattern: pattern.to_owned(),
    })
}

/// Classification error types.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// Pattern table holds an invalid glob.
    #[error("invalid classifier pattern {pattern:?}")]
    Pattern {
        #[source]
        source: glob::PatternError,
        pattern: String,
    },
}

/// Friendly result alias :3
pub type Result<T, E = ClassifyError> = std::result::Result<T, E>;
