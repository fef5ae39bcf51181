// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Test-tree redaction for CMake distributions.
//!
//! A CMake distribution keeps the shape of every unit's build graph, but not
//! the bodies of its tests. Build files inside the redacted directory keep
//! their names with a placeholder comment as content. Every other file is
//! removed.

use crate::distro::{DistroError, Result};

use ignore::WalkBuilder;
use std::{fs, path::Path};
use tracing::{debug, instrument};

const CMAKE_LISTS: &str = "CMakeLists.txt";
const CMAKE_EXTENSION: &str = "cmake";

/// Tally of a redaction pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Redaction {
    /// Build files replaced by placeholder.
    pub rewritten: usize,

    /// Files deleted.
    pub removed: usize,
}

/// Redact every file below directory.
///
/// Missing directories are not an error, not every unit ships tests.
///
/// # Errors
///
/// - Return [`DistroError::Walk`] if directory cannot be traversed.
/// - Return [`DistroError::Write`] if placeholder cannot be written.
/// - Return [`DistroError::Remove`] if a file cannot be deleted.
#[instrument(skip(dir, placeholder), level = "debug")]
pub fn redact_test_tree(dir: impl AsRef<Path>, placeholder: &str) -> Result<Redaction> {
    let dir = dir.as_ref();
    let mut redaction = Redaction::default();
    if !dir.is_dir() {
        return Ok(redaction);
    }

    let mut files = Vec::new();
    for entry in WalkBuilder::new(dir)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
    {
        let entry = entry?;
        if entry.file_type().is_some_and(|kind| kind.is_file()) {
            files.push(entry.into_path());
        }
    }

    for file in files {
        if is_build_file(&file) {
            debug!("redact {:?}", file.display());
            fs::write(&file, format!("{placeholder}\n")).map_err(|err| DistroError::Write {
                source: err,
                path: file.clone(),
            })?;
            redaction.rewritten += 1;
        } else {
            debug!("remove {:?}", file.display());
            fs::remove_file(&file).map_err(|err| DistroError::Remove {
                source: err,
                path: file.clone(),
            })?;
            redaction.removed += 1;
        }
    }

    Ok(redaction)
}

fn is_build_file(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == CMAKE_LISTS)
        || path
            .extension()
            .is_some_and(|extension| extension == CMAKE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn redact_keeps_build_graph_shape() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let test = tmp.path().join("test");
        fs::create_dir_all(test.join("cmake_subdir_test"))?;
        fs::write(test.join("CMakeLists.txt"), "add_executable(check check.cpp)\n")?;
        fs::write(test.join("check_basic.cpp"), "int main() {}\n")?;
        fs::write(test.join("Jamfile"), "run check_basic.cpp ;\n")?;
        fs::write(test.join("cmake_subdir_test/deps.cmake"), "set(X 1)\n")?;

        let result = redact_test_tree(&test, "# placeholder")?;
        assert_eq!(
            result,
            Redaction {
                rewritten: 2,
                removed: 2
            }
        );
        assert_eq!(fs::read_to_string(test.join("CMakeLists.txt"))?, "# placeholder\n");
        assert_eq!(
            fs::read_to_string(test.join("cmake_subdir_test/deps.cmake"))?,
            "# placeholder\n"
        );
        assert!(!test.join("check_basic.cpp").exists());
        assert!(!test.join("Jamfile").exists());

        Ok(())
    }

    #[test]
    fn missing_directory_is_noop() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let result = redact_test_tree(tmp.path().join("test"), "# placeholder")?;
        assert_eq!(result, Redaction::default());

        Ok(())
    }
}
