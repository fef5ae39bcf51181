// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Distribution assembly.
//!
//! A __distribution__ is the release tree built out of a full Boost monorepo
//! checkout. Inside the checkout every library lives in its own directory
//! under `libs/`, with its public headers tucked under `include/boost/`. The
//! distribution flattens that layout:
//!
//! - Each library's payload, minus its `include/` directory, lands under the
//!   __libs tree__ at `<dest>/libs/<unit>`.
//! - Every library's headers are merged into one shared __header tree__ at
//!   `<dest>/boost`.
//!
//! # Release Variants
//!
//! Files are run through a [`Classify`] implementation and kept or dropped
//! according to the selected [`ReleaseVariant`]. A full release keeps
//! everything that is not ignored. Source-only and docs-only releases keep
//! their respective buckets, and then have empty directories pruned away.
//! Docs-only releases additionally get a backfill pass that copies back any
//! file a documentation page links to.
//!
//! # Header Collisions
//!
//! Two units may contribute the same header path. The unit processed last
//! wins, and the overwrite is logged. Units are always processed sorted by
//! their path under `libs/`, so the winner is the same on every run.
//!
//! # CMake Distributions
//!
//! In CMake mode the whole `libs/` tree is copied as-is instead of being
//! split into libs and header trees, and each unit's tests are redacted down
//! to placeholder build files.
//!
//! # See Also
//!
//! 1. [`discover`]
//! 2. [`tree`]

pub mod backfill;
pub mod discover;
pub mod prune;
pub mod redact;
pub mod tree;

use crate::{
    classify::{ClassifyError, Classify, PatternClassifier},
    config::{DistroDefinition, ReleaseVariant},
    distro::{
        backfill::backfill_doc_links,
        discover::{discover_units, LibraryUnit, UnitId},
        prune::prune_empty_dirs,
        redact::redact_test_tree,
        tree::{make_dir, sorted_entries, CopyFilter, ExcludeSet, TreeCopier},
    },
    path::backup_path,
};

use chrono::Local;
use indicatif::ProgressBar;
use serde::Serialize;
use std::{
    collections::HashSet,
    fmt::{Display, Formatter, Result as FmtResult},
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

const CMAKE_LISTS: &str = "CMakeLists.txt";
const INCLUDE_DIR: &str = "include";
const RESERVED_HEADER_DIRS: [&str; 2] = ["detail", "pending"];
const TEST_DIR: &str = "test";
const NESTED_TEST_DIR: &str = "docs";

/// Inputs of a single assembly run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyOptions {
    /// Root of monorepo checkout to read from.
    pub source_root: PathBuf,

    /// Root of distribution tree to produce.
    pub dest_root: PathBuf,

    /// Buckets of files to keep.
    pub variant: ReleaseVariant,

    /// Produce a CMake distribution.
    pub cmake_distro: bool,
}

impl AssemblyOptions {
    /// Construct new assembly options for a plain full release.
    pub fn new(source_root: impl Into<PathBuf>, dest_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            dest_root: dest_root.into(),
            variant: ReleaseVariant::default(),
            cmake_distro: false,
        }
    }

    /// Select release variant.
    pub fn variant(mut self, variant: ReleaseVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Toggle CMake distribution mode.
    pub fn cmake_distro(mut self, cmake_distro: bool) -> Self {
        self.cmake_distro = cmake_distro;
        self
    }
}

/// Ordered steps of an assembly run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyStep {
    Init,
    RootFiles,
    SpecialFolders,
    LibsRootFiles,
    UnitDiscovery,
    UnitMaterialization,
    DocLinkBackfill,
    Prune,
}

impl Display for AssemblyStep {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Init => "init",
            Self::RootFiles => "root-files",
            Self::SpecialFolders => "special-folders",
            Self::LibsRootFiles => "libs-root-files",
            Self::UnitDiscovery => "unit-discovery",
            Self::UnitMaterialization => "unit-materialization",
            Self::DocLinkBackfill => "doc-link-backfill",
            Self::Prune => "prune",
        };

        fmt.write_str(name)
    }
}

/// File overwritten during a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overwrite {
    /// File that won.
    pub source: PathBuf,

    /// Destination that already existed.
    pub dest: PathBuf,
}

/// Summary of a finished assembly run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssemblyReport {
    pub source_root: PathBuf,
    pub dest_root: PathBuf,
    pub variant: ReleaseVariant,
    pub cmake_distro: bool,

    /// Where a pre-existing destination was moved to.
    pub backup: Option<PathBuf>,

    /// Units in the order they were processed.
    pub units: Vec<String>,

    pub files_copied: usize,
    pub overwrites: Vec<Overwrite>,

    /// Destination-relative files restored for documentation links.
    pub backfilled: Vec<PathBuf>,

    /// Test build files replaced by placeholders.
    pub redacted_files: usize,

    /// Test files deleted during redaction.
    pub removed_files: usize,

    pub pruned_dirs: usize,
}

impl AssemblyReport {
    fn new(options: &AssemblyOptions, backup: Option<PathBuf>) -> Self {
        Self {
            source_root: options.source_root.clone(),
            dest_root: options.dest_root.clone(),
            variant: options.variant,
            cmake_distro: options.cmake_distro,
            backup,
            units: Vec::new(),
            files_copied: 0,
            overwrites: Vec::new(),
            backfilled: Vec::new(),
            redacted_files: 0,
            removed_files: 0,
            pruned_dirs: 0,
        }
    }
}

/// Distribution assembler.
///
/// Owns the distribution definition and the classifier compiled from it.
/// Every path it touches is handed in through [`AssemblyOptions`], so one
/// assembler can run any number of assemblies.
#[derive(Debug)]
pub struct Assembler<C = PatternClassifier>
where
    C: Classify,
{
    definition: DistroDefinition,
    classifier: C,
    progress: ProgressBar,
}

impl Assembler<PatternClassifier> {
    /// Construct new assembler with classifier built from definition patterns.
    ///
    /// # Errors
    ///
    /// - Return [`DistroError::Classify`] if pattern tables are invalid.
    pub fn try_new(definition: DistroDefinition) -> Result<Self> {
        let classifier = PatternClassifier::try_new(&definition.patterns)?;
        Ok(Self::with_classifier(definition, classifier))
    }
}

impl<C> Assembler<C>
where
    C: Classify,
{
    /// Construct new assembler with custom classifier.
    pub fn with_classifier(definition: DistroDefinition, classifier: C) -> Self {
        Self {
            definition,
            classifier,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report unit materialization progress through progress bar.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Discover library units of a source tree.
    ///
    /// # Errors
    ///
    /// - Return [`DistroError::MissingSource`] if source root does not exist.
    /// - Return [`DistroError::ReadDir`] if libs directory cannot be listed.
    pub fn discover(&self, source_root: impl AsRef<Path>) -> Result<Vec<LibraryUnit>> {
        let source_root = source_root.as_ref();
        require_source(source_root)?;
        discover_units(source_root.join(&self.definition.settings.libs_dir))
    }

    /// Assemble distribution tree.
    ///
    /// Runs every step in order. The first failure aborts the run and leaves
    /// whatever was written so far in place.
    ///
    /// # Errors
    ///
    /// - Return [`DistroError::MissingSource`] if source root does not exist.
    ///   Nothing is written in that case.
    /// - Return [`DistroError::MissingFolder`] if a special folder is absent.
    /// - Return any filesystem error raised while copying.
    #[instrument(skip(self, options), level = "debug")]
    pub fn assemble(&self, options: &AssemblyOptions) -> Result<AssemblyReport> {
        let settings = &self.definition.settings;
        let source_root = options.source_root.as_path();
        let dest_root = options.dest_root.as_path();
        let variant = options.variant;
        let filter = CopyFilter::Variant(variant);

        info!(
            "{}: assemble {variant} distribution of {:?} into {:?}",
            AssemblyStep::Init,
            source_root.display(),
            dest_root.display()
        );
        require_source(source_root)?;
        let excludes = ExcludeSet::try_new(&settings.excludes)?;
        let backup = move_aside(dest_root)?;
        make_dir(dest_root)?;

        let mut report = AssemblyReport::new(options, backup);
        let mut copier = TreeCopier::new(&self.classifier, &excludes, source_root);

        info!("{}: copy top-level files", AssemblyStep::RootFiles);
        let skip: &[&str] = if options.cmake_distro {
            &[]
        } else {
            &[CMAKE_LISTS]
        };
        copier.copy_loose_files(source_root, dest_root, filter, skip)?;

        info!("{}: copy special folders", AssemblyStep::SpecialFolders);
        for folder in self.special_folders(options) {
            let src = source_root.join(folder);
            if !src.is_dir() {
                return Err(DistroError::MissingFolder { path: src });
            }

            copier.copy_entry(&src, &dest_root.join(folder), filter)?;
        }

        let source_libs = source_root.join(&settings.libs_dir);
        let dest_libs = dest_root.join(&settings.libs_dir);
        let dest_headers = dest_root.join(&settings.headers_dir);
        if !options.cmake_distro {
            info!("{}: copy loose files of libs", AssemblyStep::LibsRootFiles);
            make_dir(&dest_libs)?;
            copier.copy_loose_files(&source_libs, &dest_libs, filter, &[])?;
        }

        info!("{}: scan {:?}", AssemblyStep::UnitDiscovery, source_libs.display());
        let units = discover_units(&source_libs)?;
        report.units = units.iter().map(|unit| unit.id.to_string()).collect();
        info!("found {} library units", units.len());

        info!("{}: process library units", AssemblyStep::UnitMaterialization);
        if !options.cmake_distro {
            make_dir(&dest_headers)?;
        }
        self.progress.set_length(units.len() as u64);
        let mut parents = HashSet::new();
        for unit in &units {
            self.progress.set_message(unit.id.to_string());
            if options.cmake_distro {
                let tests = if unit.id.is_nested() {
                    NESTED_TEST_DIR
                } else {
                    TEST_DIR
                };
                let redaction = redact_test_tree(
                    dest_libs.join(unit.id.relative_path()).join(tests),
                    &settings.cmake_placeholder,
                )?;
                report.redacted_files += redaction.rewritten;
                report.removed_files += redaction.removed;
            } else {
                // INVARIANT: Loose files of a nested unit parent land before its first unit.
                if let UnitId::Nested { parent, .. } = &unit.id {
                    if parents.insert(parent.as_str()) {
                        debug!("copy loose files of parent {parent}");
                        let dest = dest_libs.join(parent);
                        make_dir(&dest)?;
                        copier.copy_loose_files(&source_libs.join(parent), &dest, filter, &[])?;
                    }
                }

                self.materialize_unit(&mut copier, unit, &dest_libs, &dest_headers, filter)?;
            }
            self.progress.inc(1);
        }
        self.progress.finish_and_clear();

        if variant.is_docs_only() {
            info!("{}: restore files linked from documentation", AssemblyStep::DocLinkBackfill);
            report.backfilled = backfill_doc_links(&mut copier, source_root, dest_root)?;
        }

        if !variant.is_full() {
            info!("{}: remove empty directories", AssemblyStep::Prune);
            report.pruned_dirs = prune_empty_dirs(dest_root)?;
        }

        let (files_copied, overwrites) = copier.finish();
        report.files_copied = files_copied;
        report.overwrites = overwrites;
        info!(
            "assembled {} units, {} files copied, {} overwritten",
            report.units.len(),
            report.files_copied,
            report.overwrites.len()
        );

        Ok(report)
    }

    fn special_folders<'a>(&'a self, options: &AssemblyOptions) -> Vec<&'a str> {
        let settings = &self.definition.settings;
        let mut folders: Vec<&str> = settings.always_folders.iter().map(String::as_str).collect();
        if options.variant.include_docs {
            folders.extend(settings.doc_folders.iter().map(String::as_str));
        }

        if options.cmake_distro {
            folders.push(settings.libs_dir.as_str());
        }

        folders
    }

    /// Copy one unit into libs tree and merge its headers into header tree.
    #[instrument(skip_all, fields(unit = %unit.id), level = "debug")]
    fn materialize_unit(
        &self,
        copier: &mut TreeCopier<'_, C>,
        unit: &LibraryUnit,
        dest_libs: &Path,
        dest_headers: &Path,
        filter: CopyFilter,
    ) -> Result<()> {
        let settings = &self.definition.settings;

        let dest = dest_libs.join(unit.id.relative_path());
        make_dir(&dest)?;
        for entry in sorted_entries(&unit.source_path)? {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if path.is_dir() && settings.unit_skip_dirs.contains(&name) {
                continue;
            }

            copier.copy_entry(&path, &dest.join(&name), filter)?;
        }

        let namespace = unit
            .source_path
            .join(INCLUDE_DIR)
            .join(&settings.headers_dir);
        if !namespace.is_dir() {
            debug!("unit {} has no headers to merge", unit.id);
            return Ok(());
        }

        for entry in sorted_entries(&namespace)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if RESERVED_HEADER_DIRS.contains(&name.as_str()) {
                continue;
            }

            copier.copy_entry(&entry.path(), &dest_headers.join(&name), filter)?;
        }

        // INVARIANT: Reserved header directories bypass the release variant.
        for reserved in RESERVED_HEADER_DIRS {
            let src = namespace.join(reserved);
            if src.is_dir() {
                copier.merge_tree(&src, &dest_headers.join(reserved), CopyFilter::Unfiltered)?;
            }
        }

        Ok(())
    }
}

fn require_source(source_root: &Path) -> Result<()> {
    if !source_root.exists() {
        return Err(DistroError::MissingSource {
            path: source_root.to_path_buf(),
        });
    }

    Ok(())
}

/// Rename existing destination to timestamped backup location.
fn move_aside(dest_root: &Path) -> Result<Option<PathBuf>> {
    if !dest_root.exists() {
        return Ok(None);
    }

    let backup = backup_path(dest_root, Local::now().naive_local());
    warn!(
        "destination {:?} exists, moving it to {:?}",
        dest_root.display(),
        backup.display()
    );
    fs::rename(dest_root, &backup).map_err(|err| DistroError::Backup {
        source: err,
        from: dest_root.to_path_buf(),
        to: backup.clone(),
    })?;

    Ok(Some(backup))
}

/// All possible error types for distribution assembly.
#[derive(Debug, thiserror::Error)]
pub enum DistroError {
    /// Source tree does not exist.
    #[error("## Error: {} does not exist", path.display())]
    MissingSource { path: PathBuf },

    /// Special folder required by definition does not exist.
    #[error("special folder {:?} does not exist", path.display())]
    MissingFolder { path: PathBuf },

    /// Existing destination cannot be moved aside.
    #[error("failed to move {:?} to {:?}", from.display(), to.display())]
    Backup {
        #[source]
        source: std::io::Error,
        from: PathBuf,
        to: PathBuf,
    },

    /// Directory cannot be created.
    #[error("failed to create directory {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Directory cannot be listed.
    #[error("failed to read directory {:?}", path.display())]
    ReadDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File cannot be read.
    #[error("failed to read {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File cannot be copied.
    #[error("failed to copy {:?} to {:?}", from.display(), to.display())]
    Copy {
        #[source]
        source: std::io::Error,
        from: PathBuf,
        to: PathBuf,
    },

    /// File cannot be written.
    #[error("failed to write {:?}", path.display())]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File or directory cannot be removed.
    #[error("failed to remove {:?}", path.display())]
    Remove {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Exclude pattern is not a valid glob.
    #[error("invalid exclude pattern {pattern:?}")]
    Exclude {
        #[source]
        source: glob::PatternError,
        pattern: String,
    },

    /// Tree traversal fails.
    #[error(transparent)]
    Walk(#[from] ignore::Error),

    /// Classifier cannot be built.
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

/// Friendly result alias :3
pub type Result<T, E = DistroError> = std::result::Result<T, E>;
