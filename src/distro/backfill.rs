// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Documentation link backfill.
//!
//! A docs-only distribution drops source files, yet documentation pages
//! routinely link to examples and headers. After the main copy, every emitted
//! HTML page is scanned for relative `href` targets. Any target that exists in
//! the source tree but is missing from the destination gets copied over, so
//! the links keep working.

use crate::{
    classify::Classify,
    distro::{
        tree::{make_dir, TreeCopier},
        DistroError, Result,
    },
    path::normalize_relative,
};

use ignore::WalkBuilder;
use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};
use tracing::{debug, info, instrument};

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href\s*=\s*"([^"]*)""#).unwrap());

/// Copy link targets that documentation pages need but the destination lacks.
///
/// Returns the destination-relative paths of every file copied in.
#[instrument(skip(copier, source_root, dest_root), level = "debug")]
pub(crate) fn backfill_doc_links<C>(
    copier: &mut TreeCopier<'_, C>,
    source_root: &Path,
    dest_root: &Path,
) -> Result<Vec<PathBuf>>
where
    C: Classify,
{
    let mut pages = Vec::new();
    for entry in WalkBuilder::new(dest_root)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
    {
        let entry = entry?;
        if entry.file_type().is_some_and(|kind| kind.is_file()) && is_html(entry.path()) {
            pages.push(entry.into_path());
        }
    }

    let mut backfilled = Vec::new();
    for page in pages {
        let content = fs::read(&page).map_err(|err| DistroError::Read {
            source: err,
            path: page.clone(),
        })?;
        let content = String::from_utf8_lossy(&content);
        let page_dir = page
            .parent()
            .and_then(|parent| parent.strip_prefix(dest_root).ok())
            .unwrap_or(Path::new(""));

        for capture in HREF_RE.captures_iter(&content) {
            let Some(target) = link_target(&capture[1]) else {
                continue;
            };

            let Some(relative) = normalize_relative(page_dir.join(target)) else {
                debug!("link {target:?} in {:?} leaves the tree", page.display());
                continue;
            };

            let src = source_root.join(&relative);
            let dst = dest_root.join(&relative);
            if !src.is_file() || dst.exists() || copier.is_skipped(&src) {
                continue;
            }

            info!("backfill {:?} linked from {:?}", relative.display(), page.display());
            if let Some(parent) = dst.parent() {
                make_dir(parent)?;
            }
            copier.copy_file(&src, &dst)?;
            backfilled.push(relative);
        }
    }

    Ok(backfilled)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension == "html" || extension == "htm")
}

/// Extract local file target of an href.
///
/// Returns [`None`] for fragments, absolute paths, and anything with a
/// scheme. Query strings and fragments are stripped from the result.
fn link_target(href: &str) -> Option<&str> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with('/') {
        return None;
    }

    // INVARIANT: A scheme can only appear before the first path, query, or fragment delimiter.
    let head = href.find(['/', '?', '#']).unwrap_or(href.len());
    if href[..head].contains(':') {
        return None;
    }

    let end = href.find(['#', '?']).unwrap_or(href.len());
    let target = &href[..end];
    (!target.is_empty()).then_some(target)
}
