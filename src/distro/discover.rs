// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Library unit discovery.
//!
//! Library units are found purely by the shape of their directories under
//! `libs/`. No list of known libraries is consulted. A top-level directory
//! counts as a unit if it has any of the following:
//!
//! 1. A `meta/libraries.json` file.
//! 2. An `include/` directory.
//! 3. The literal name `headers`, the umbrella package.
//!
//! Failing those, a directory holding a `sublibs` marker file is a parent of
//! __nested units__. Each of its immediate subdirectories that carries
//! signal 1 or 2 becomes a unit keyed by parent and child name. Discovery
//! never looks deeper than that one extra level.
//!
//! Directories matching nothing are skipped without complaint, since `libs/`
//! also holds utility directories that are not libraries.

use crate::distro::{tree::sorted_entries, Result};

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

const META_DIR: &str = "meta";
const LIBRARIES_JSON: &str = "libraries.json";
const INCLUDE_DIR: &str = "include";
const SUBLIBS_MARKER: &str = "sublibs";
const UMBRELLA_UNIT: &str = "headers";

/// Identity of a library unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnitId {
    /// Unit directly under `libs/`.
    Plain(String),

    /// Unit under a parent marked with `sublibs`.
    Nested { parent: String, child: String },
}

impl UnitId {
    /// Location of unit relative to `libs/`.
    pub fn relative_path(&self) -> PathBuf {
        match self {
            Self::Plain(name) => PathBuf::from(name),
            Self::Nested { parent, child } => Path::new(parent).join(child),
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, Self::Nested { .. })
    }
}

impl Display for UnitId {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Plain(name) => write!(fmt, "{name}"),
            Self::Nested { parent, child } => write!(fmt, "{parent}/{child}"),
        }
    }
}

/// A discovered library package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryUnit {
    /// Identity of unit.
    pub id: UnitId,

    /// Absolute location of unit in source tree.
    pub source_path: PathBuf,

    /// Unit carries an `include/` directory.
    pub has_include_dir: bool,
}

impl LibraryUnit {
    fn new(id: UnitId, source_path: PathBuf) -> Self {
        let has_include_dir = source_path.join(INCLUDE_DIR).is_dir();
        Self {
            id,
            source_path,
            has_include_dir,
        }
    }
}

/// Discover every library unit under a libs directory.
///
/// Units come back sorted by their path relative to `libs`, so callers that
/// merge in this order get the same result on every run.
///
/// # Errors
///
/// - Return [`DistroError::ReadDir`] if the libs directory, or a parent of
///   nested units, cannot be listed.
///
/// [`DistroError::ReadDir`]: crate::distro::DistroError::ReadDir
#[instrument(skip(libs), level = "debug")]
pub fn discover_units(libs: impl AsRef<Path>) -> Result<Vec<LibraryUnit>> {
    let mut units = Vec::new();
    for entry in sorted_entries(libs.as_ref())? {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if has_unit_signal(&path) || name == UMBRELLA_UNIT {
            debug!("found unit {name}");
            units.push(LibraryUnit::new(UnitId::Plain(name), path));
        } else if path.join(SUBLIBS_MARKER).exists() {
            for child in sorted_entries(&path)? {
                let child_path = child.path();
                if !child_path.is_dir() || !has_unit_signal(&child_path) {
                    continue;
                }

                let id = UnitId::Nested {
                    parent: name.clone(),
                    child: child.file_name().to_string_lossy().into_owned(),
                };
                debug!("found nested unit {id}");
                units.push(LibraryUnit::new(id, child_path));
            }
        } else {
            debug!("{name} is not a library unit");
        }
    }

    units.sort_by_key(|unit| unit.id.relative_path());

    Ok(units)
}

fn has_unit_signal(path: &Path) -> bool {
    path.join(META_DIR).join(LIBRARIES_JSON).is_file() || path.join(INCLUDE_DIR).is_dir()
}
