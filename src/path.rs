// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine absolute locations for the trees being read and written, and
//! name the backup location of a destination tree that already exists.

use chrono::NaiveDateTime;
use std::{
    ffi::OsString,
    path::{Component, Path, PathBuf},
};

/// Resolve user supplied path to an absolute path.
///
/// Performs shell expansion first, so `~` and `$VAR` work the same way they
/// would on a command line. Does not check if the path returned actually
/// exists.
///
/// # Errors
///
/// - Return [`PathError::ShellExpansion`] if an environment variable in the
///   path cannot be looked up.
/// - Return [`PathError::Absolute`] if the current directory cannot be
///   determined for a relative path.
pub fn resolve_root(raw: impl AsRef<str>) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw.as_ref())?.into_owned();
    std::path::absolute(&expanded).map_err(|err| PathError::Absolute {
        source: err,
        path: PathBuf::from(expanded),
    })
}

/// Determine where an existing destination tree is moved aside to.
///
/// Appends `_bck_<YYYY_MM_DD_HH_MM_SS>` to the final component of the
/// destination path.
pub fn backup_path(dest: impl AsRef<Path>, now: NaiveDateTime) -> PathBuf {
    let dest = dest.as_ref();
    let mut name = dest
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(format!("_bck_{}", now.format("%Y_%m_%d_%H_%M_%S")));
    dest.with_file_name(name)
}

/// Lexically normalize a relative path.
///
/// Folds `.` and `..` components away. Returns [`None`] if the path is
/// absolute or climbs above its starting point.
pub fn normalize_relative(path: impl AsRef<Path>) -> Option<PathBuf> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => continue,
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::Normal(part) => parts.push(part),
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    Some(parts.into_iter().collect())
}

/// Path resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Failed to perform shell expansion on path.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Failed to make path absolute.
    #[error("failed to make {:?} absolute", path.display())]
    Absolute {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = PathError> = std::result::Result<T, E>;
