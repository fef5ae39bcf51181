// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Tree copying and merging.
//!
//! Everything that lands in a distribution goes through [`TreeCopier`]. It
//! never clears a destination directory. Directories are merged into whatever
//! already exists, and a file that is already present is overwritten with a
//! diagnostic. Header trees contributed by different units rely on this to
//! flatten into a single namespace.

use crate::{
    classify::{Classification, Classify},
    config::ReleaseVariant,
    distro::{DistroError, Overwrite, Result},
};

use glob::{MatchOptions, Pattern};
use std::{
    borrow::Cow,
    fs::{self, DirEntry},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Which files a copy lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyFilter {
    /// Files must be admitted by release variant.
    Variant(ReleaseVariant),

    /// Every file that is not ignored.
    Unfiltered,
}

impl CopyFilter {
    fn admits(&self, class: Classification) -> bool {
        match self {
            Self::Variant(variant) => class.admits(*variant),
            Self::Unfiltered => !class.is_ignored(),
        }
    }
}

/// Glob patterns of source-relative paths that are never copied.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    patterns: Vec<Pattern>,
}

impl ExcludeSet {
    /// Compile exclude patterns.
    ///
    /// # Errors
    ///
    /// - Return [`DistroError::Exclude`] if a pattern is not a valid glob.
    pub fn try_new(patterns: impl IntoIterator<Item = impl AsRef<str>>) -> Result<Self> {
        let patterns = patterns
            .into_iter()
            .map(|pattern| {
                Pattern::new(pattern.as_ref()).map_err(|err| DistroError::Exclude {
                    source: err,
                    pattern: pattern.as_ref().to_owned(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Match path relative to source root.
    pub fn matches(&self, relative: impl AsRef<Path>) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_path_with(relative.as_ref(), MATCH_OPTIONS))
    }
}

/// Classify-and-copy engine.
///
/// Tracks how many files it wrote and every overwrite it performed.
#[derive(Debug)]
pub(crate) struct TreeCopier<'a, C>
where
    C: Classify,
{
    classifier: &'a C,
    excludes: &'a ExcludeSet,
    source_root: &'a Path,
    files_copied: usize,
    overwrites: Vec<Overwrite>,
}

impl<'a, C> TreeCopier<'a, C>
where
    C: Classify,
{
    pub(crate) fn new(classifier: &'a C, excludes: &'a ExcludeSet, source_root: &'a Path) -> Self {
        Self {
            classifier,
            excludes,
            source_root,
            files_copied: 0,
            overwrites: Vec::new(),
        }
    }

    /// Hand back tally of copied files and overwrites.
    pub(crate) fn finish(self) -> (usize, Vec<Overwrite>) {
        (self.files_copied, self.overwrites)
    }

    pub(crate) fn classify(&self, path: &Path) -> Classification {
        let (name, parent) = split_name(path);
        self.classifier.classify(&name, parent)
    }

    /// Check if entry is ignored, or excluded by source-relative path.
    pub(crate) fn is_skipped(&self, path: &Path) -> bool {
        if self.classify(path).is_ignored() {
            return true;
        }

        path.strip_prefix(self.source_root)
            .is_ok_and(|relative| self.excludes.matches(relative))
    }

    /// Copy a single file, overwriting anything already there.
    pub(crate) fn copy_file(&mut self, src: &Path, dst: &Path) -> Result<()> {
        if dst.exists() {
            warn!("## Overwriting file {} with {}", dst.display(), src.display());
            self.overwrites.push(Overwrite {
                source: src.to_path_buf(),
                dest: dst.to_path_buf(),
            });
        }

        fs::copy(src, dst).map_err(|err| DistroError::Copy {
            source: err,
            from: src.to_path_buf(),
            to: dst.to_path_buf(),
        })?;
        self.files_copied += 1;

        Ok(())
    }

    /// Copy one file or directory through the classifier.
    ///
    /// Ignored and excluded entries are skipped. Directories are merged
    /// recursively, files are copied if the filter admits them.
    pub(crate) fn copy_entry(&mut self, src: &Path, dst: &Path, filter: CopyFilter) -> Result<()> {
        if self.is_skipped(src) {
            let (name, parent) = split_name(src);
            match self.classifier.ignore_rule(&name, parent) {
                Some(rule) => debug!("skip {:?}, ignored by {rule:?}", src.display()),
                None => debug!("skip {:?}, excluded", src.display()),
            }
            return Ok(());
        }

        if src.is_dir() {
            return self.merge_tree(src, dst, filter);
        }

        let class = self.classify(src);
        if filter.admits(class) {
            self.copy_file(src, dst)?;
        } else {
            debug!("filter out {:?} tagged {:?}", src.display(), class.tags());
        }

        Ok(())
    }

    /// Merge contents of source directory into destination directory.
    ///
    /// Creates destination if it does not exist yet.
    pub(crate) fn merge_tree(&mut self, src: &Path, dst: &Path, filter: CopyFilter) -> Result<()> {
        make_dir(dst)?;
        for entry in sorted_entries(src)? {
            self.copy_entry(&entry.path(), &dst.join(entry.file_name()), filter)?;
        }

        Ok(())
    }

    /// Copy only the plain files directly inside a directory.
    ///
    /// Entries whose name appears in `skip` are left behind.
    pub(crate) fn copy_loose_files(
        &mut self,
        src: &Path,
        dst: &Path,
        filter: CopyFilter,
        skip: &[&str],
    ) -> Result<()> {
        for entry in sorted_entries(src)? {
            let path = entry.path();
            if !path.is_file() || skip.iter().any(|name| entry.file_name() == *name) {
                continue;
            }

            self.copy_entry(&path, &dst.join(entry.file_name()), filter)?;
        }

        Ok(())
    }
}

fn split_name(path: &Path) -> (Cow<'_, str>, &Path) {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    (name, path.parent().unwrap_or(Path::new("")))
}

/// List directory entries sorted by name.
pub(crate) fn sorted_entries(dir: &Path) -> Result<Vec<DirEntry>> {
    let mut entries = fs::read_dir(dir)
        .and_then(|entries| entries.collect::<std::io::Result<Vec<_>>>())
        .map_err(|err| DistroError::ReadDir {
            source: err,
            path: dir.to_path_buf(),
        })?;
    entries.sort_by_key(DirEntry::file_name);

    Ok(entries)
}

/// Create directory and missing parents, doing nothing if it exists.
pub(crate) fn make_dir(path: &Path) -> Result<()> {
    mkdirp::mkdirp(path)
        .map(|_| ())
        .map_err(|err| DistroError::CreateDir {
            source: err,
            path: PathBuf::from(path),
        })
}
