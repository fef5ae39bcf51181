// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the distribution definition that drives assembly,
//! along with the release variant selected by the caller. File I/O is left to
//! the caller to figure out.
//!
//! # General Layout
//!
//! A distribution definition is composed of two parts: settings and pattern
//! tables. The settings section names the folders that make up the release
//! tree. The pattern tables feed the file classifier. Every field falls back
//! to the stock Boost layout, so a definition file only needs to list what it
//! wants to change.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Which buckets of classified files make it into the distribution.
///
/// Four combinations exist. The full variant copies every file that is not
/// ignored. Source-only and docs-only keep files matching their respective
/// pattern tables. The degenerate variant that includes neither is legal, and
/// simply produces a tree that pruning empties out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ReleaseVariant {
    /// Keep files classified as source.
    pub include_source: bool,

    /// Keep files classified as documentation.
    pub include_docs: bool,
}

impl ReleaseVariant {
    /// Source and documentation.
    pub const FULL: Self = Self::new(true, true);

    /// Source without documentation.
    pub const SOURCE_ONLY: Self = Self::new(true, false);

    /// Documentation without source.
    pub const DOCS_ONLY: Self = Self::new(false, true);

    /// Neither source nor documentation.
    pub const NEITHER: Self = Self::new(false, false);

    /// Construct new release variant.
    pub const fn new(include_source: bool, include_docs: bool) -> Self {
        Self {
            include_source,
            include_docs,
        }
    }

    /// Variant keeps everything that is not ignored.
    pub const fn is_full(&self) -> bool {
        self.include_source && self.include_docs
    }

    /// Variant keeps documentation but drops source.
    pub const fn is_docs_only(&self) -> bool {
        self.include_docs && !self.include_source
    }
}

impl Default for ReleaseVariant {
    fn default() -> Self {
        Self::FULL
    }
}

impl Display for ReleaseVariant {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let name = match (self.include_source, self.include_docs) {
            (true, true) => "full",
            (true, false) => "source-only",
            (false, true) => "docs-only",
            (false, false) => "empty",
        };

        fmt.write_str(name)
    }
}

/// Distribution definition layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DistroDefinition {
    /// Folder layout of the release tree.
    pub settings: DistroSettings,

    /// Pattern tables used for file classification.
    pub patterns: PatternTable,
}

impl FromStr for DistroDefinition {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        toml::de::from_str(data).map_err(ConfigError::Deserialize)
    }
}

impl Display for DistroDefinition {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Folder layout of the release tree.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DistroSettings {
    /// Name of the merged header tree, also the namespace directory expected
    /// under each unit's `include/`.
    pub headers_dir: String,

    /// Name of the directory holding library units.
    pub libs_dir: String,

    /// Top-level folders copied into every variant.
    pub always_folders: Vec<String>,

    /// Top-level folders copied only when documentation is included.
    pub doc_folders: Vec<String>,

    /// Unit directories that never land in the libs tree.
    pub unit_skip_dirs: Vec<String>,

    /// Glob patterns, relative to the source root, that are never copied.
    pub excludes: Vec<String>,

    /// Replacement content for build files during test-tree redaction.
    pub cmake_placeholder: String,
}

impl Default for DistroSettings {
    fn default() -> Self {
        Self {
            headers_dir: "boost".into(),
            libs_dir: "libs".into(),
            always_folders: vec!["tools".into()],
            doc_folders: vec!["doc".into(), "more".into(), "status".into()],
            unit_skip_dirs: vec!["include".into(), "antora".into()],
            excludes: vec!["libs/config/checks/architecture/bin".into()],
            cmake_placeholder: "# Placeholder: test sources are not part of this distribution"
                .into(),
        }
    }
}

/// Ignore rule for the classifier.
///
/// Matches a file or directory name, optionally only when its parent
/// directory name matches as well.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct IgnoreRule {
    /// Glob pattern matched against the entry name.
    pub pattern: String,

    /// Glob pattern matched against the name of the parent directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl IgnoreRule {
    /// Construct new ignore rule that applies under any parent.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            parent: None,
        }
    }

    /// Restrict ignore rule to entries whose parent matches pattern.
    pub fn under(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// Ordered pattern tables for file classification.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PatternTable {
    /// Ignore rules, first match wins.
    pub ignore: Vec<IgnoreRule>,

    /// Names that count as source files.
    pub source: Vec<String>,

    /// Names that count as documentation files.
    pub doc: Vec<String>,
}

impl Default for PatternTable {
    fn default() -> Self {
        let ignore = vec![
            IgnoreRule::new(".*"),
            IgnoreRule::new("appveyor.yml"),
            IgnoreRule::new("azure-pipelines.yml"),
            IgnoreRule::new("codecov.yml"),
            IgnoreRule::new("bin").under("doc"),
        ];

        let source = [
            "CMakeLists.txt",
            "*.cmake",
            "Jamfile",
            "Jamfile.v2",
            "Jamfile.jam",
            "Jamroot",
            "*.jam",
            "Makefile",
            "*.in",
            "*.hpp",
            "*.h",
            "*.hxx",
            "*.ipp",
            "*.inl",
            "*.inc",
            "*.cpp",
            "*.cxx",
            "*.cc",
            "*.c",
            "*.asm",
            "*.S",
            "*.py",
            "*.sh",
            "*.bat",
            "*.cmd",
            "*.pl",
            "*.json",
            "LICENSE*",
            "COPYING*",
        ];

        let doc = [
            "*.html", "*.htm", "*.css", "*.js", "*.txt", "*.md", "*.adoc", "*.pdf", "*.png",
            "*.jpg", "*.jpeg", "*.gif", "*.svg", "*.ico", "*.xml", "*.xsl",
        ];

        Self {
            ignore,
            source: source.into_iter().map(Into::into).collect(),
            doc: doc.into_iter().map(Into::into).collect(),
        }
    }
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
