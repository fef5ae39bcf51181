// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Empty directory pruning.

use crate::distro::{tree::sorted_entries, DistroError, Result};

use std::{fs, path::Path};
use tracing::debug;

/// Remove empty directories below root, bottom-up.
///
/// A directory that only held empty directories is removed as well. The root
/// itself is kept. Returns number of directories removed.
///
/// # Errors
///
/// - Return [`DistroError::ReadDir`] if a directory cannot be listed.
/// - Return [`DistroError::Remove`] if an empty directory cannot be removed.
pub fn prune_empty_dirs(root: impl AsRef<Path>) -> Result<usize> {
    let mut pruned = 0;
    for entry in sorted_entries(root.as_ref())? {
        let path = entry.path();
        if !entry.file_type().is_ok_and(|kind| kind.is_dir()) {
            continue;
        }

        pruned += prune_empty_dirs(&path)?;
        if sorted_entries(&path)?.is_empty() {
            debug!("prune {:?}", path.display());
            fs::remove_dir(&path).map_err(|err| DistroError::Remove {
                source: err,
                path: path.clone(),
            })?;
            pruned += 1;
        }
    }

    Ok(pruned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn prune_bottom_up() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let root = tmp.path();
        fs::create_dir_all(root.join("libs/any/test/compile_fail"))?;
        fs::create_dir_all(root.join("libs/any/doc"))?;
        fs::write(root.join("libs/any/doc/index.html"), "<html/>")?;
        fs::create_dir_all(root.join("boost/detail"))?;

        let pruned = prune_empty_dirs(root)?;
        assert_eq!(pruned, 4);
        assert!(root.join("libs/any/doc/index.html").is_file());
        assert!(!root.join("libs/any/test").exists());
        assert!(!root.join("boost").exists());
        assert!(root.exists());

        Ok(())
    }
}
