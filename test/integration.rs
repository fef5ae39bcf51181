// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{list_files, SourceFixture};

use boost_distro::{
    Assembler, AssemblyOptions, AssemblyReport, DistroDefinition, DistroError, ReleaseVariant,
};

use anyhow::Result;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

fn assemble(fixture: &SourceFixture, options: AssemblyOptions) -> Result<AssemblyReport> {
    let assembler = Assembler::try_new(DistroDefinition::default())?;
    let options = AssemblyOptions {
        source_root: fixture.source_root().to_path_buf(),
        dest_root: fixture.dest_root(),
        ..options
    };

    Ok(assembler.assemble(&options)?)
}

fn options() -> AssemblyOptions {
    AssemblyOptions::new("", "")
}

fn assert_files(root: &Path, present: &[&str], absent: &[&str]) {
    for path in present {
        assert!(root.join(path).is_file(), "expected {path} in distribution");
    }

    for path in absent {
        assert!(!root.join(path).exists(), "unexpected {path} in distribution");
    }
}

#[test]
fn full_distribution_layout() -> Result<()> {
    let fixture = SourceFixture::boost_like()?;
    let report = assemble(&fixture, options())?;
    let dest = fixture.dest_root();

    assert_eq!(report.units, vec!["bar", "foo", "headers", "numeric/odeint"]);
    assert_eq!(report.backup, None);
    assert_eq!(report.pruned_dirs, 0);
    assert_files(
        &dest,
        &[
            "index.html",
            "LICENSE_1_0.txt",
            "boost-build.jam",
            "README.md",
            "tools/build/src/build.jam",
            "tools/inspect/index.html",
            "doc/html/index.html",
            "more/getting_started.html",
            "status/explicit-failures-markup.xml",
            "libs/libraries.htm",
            "libs/maintainers.txt",
            "libs/foo/CMakeLists.txt",
            "libs/foo/src/foo.cpp",
            "libs/foo/doc/foo.qbk",
            "libs/foo/meta/libraries.json",
            "libs/foo/test/check_basic.cpp",
            "libs/headers/build/Jamfile",
            "libs/numeric/odeint/doc/index.html",
            "libs/numeric/sublibs",
            "libs/numeric/index.html",
            "libs/numeric/CMakeLists.txt",
            "boost/foo.hpp",
            "boost/bar.hpp",
            "boost/detail/foo_detail.hpp",
            "boost/pending/queue.hpp",
            "boost/numeric/odeint.hpp",
        ],
        &[
            "CMakeLists.txt",
            ".gitmodules",
            "libs/foo/.travis.yml",
            "libs/foo/include",
            "libs/foo/antora",
            "libs/bar/include",
            "libs/numeric/odeint/include",
            "libs/not-a-lib",
        ],
    );

    Ok(())
}

#[test]
fn header_collision_goes_to_last_unit() -> Result<()> {
    let fixture = SourceFixture::boost_like()?;
    let report = assemble(&fixture, options())?;
    let dest = fixture.dest_root();

    let content = fs::read_to_string(dest.join("boost/foo/bar.hpp"))?;
    assert_eq!(content, "// bar from foo\n");
    assert_eq!(report.overwrites.len(), 1);
    assert_eq!(report.overwrites[0].dest, dest.join("boost/foo/bar.hpp"));
    assert_eq!(
        report.overwrites[0].source,
        fixture.source_root().join("libs/foo/include/boost/foo/bar.hpp")
    );

    Ok(())
}

#[test]
fn nested_unit_parent_keeps_loose_files() -> Result<()> {
    let fixture = SourceFixture::boost_like()?;
    fixture.write("libs/numeric/index.html", r#"<a href="odeint/index.html">odeint</a>"#)?;
    assemble(&fixture, options().variant(ReleaseVariant::SOURCE_ONLY))?;
    let dest = fixture.dest_root();

    assert_eq!(
        fs::read_to_string(dest.join("libs/numeric/CMakeLists.txt"))?,
        "add_subdirectory(odeint)\n"
    );
    assert_files(
        &dest,
        &["libs/numeric/CMakeLists.txt", "boost/numeric/odeint.hpp"],
        &["libs/numeric/index.html", "libs/numeric/odeint/doc"],
    );

    Ok(())
}

#[test]
fn source_only_distribution() -> Result<()> {
    let fixture = SourceFixture::boost_like()?;
    let report = assemble(&fixture, options().variant(ReleaseVariant::SOURCE_ONLY))?;
    let dest = fixture.dest_root();

    assert!(report.pruned_dirs > 0);
    assert!(report.backfilled.is_empty());
    assert_files(
        &dest,
        &[
            "LICENSE_1_0.txt",
            "boost-build.jam",
            "tools/build/src/build.jam",
            "libs/foo/CMakeLists.txt",
            "libs/foo/extra.cpp",
            "libs/foo/src/foo.cpp",
            "libs/foo/example/demo.cpp",
            "libs/foo/test/Jamfile",
            "libs/foo/test/check_basic.cpp",
            "boost/foo.hpp",
            "boost/foo/bar.hpp",
            "boost/detail/foo_detail.hpp",
            "boost/detail/notes.qbk",
            "boost/numeric/odeint.hpp",
        ],
        &[
            "index.html",
            "README.md",
            "doc",
            "more",
            "status",
            "tools/inspect",
            "libs/libraries.htm",
            "libs/foo/doc",
            "libs/numeric/odeint/doc",
        ],
    );

    Ok(())
}

#[test]
fn docs_only_distribution_backfills_linked_files() -> Result<()> {
    let fixture = SourceFixture::boost_like()?;
    let report = assemble(&fixture, options().variant(ReleaseVariant::DOCS_ONLY))?;
    let dest = fixture.dest_root();

    let mut backfilled = report.backfilled.clone();
    backfilled.sort();
    assert_eq!(
        backfilled,
        vec![
            PathBuf::from("libs/foo/example/demo.cpp"),
            PathBuf::from("libs/foo/extra.cpp"),
        ]
    );
    assert_files(
        &dest,
        &[
            "index.html",
            "README.md",
            "doc/html/index.html",
            "tools/inspect/index.html",
            "libs/libraries.htm",
            "libs/foo/doc/index.html",
            "libs/foo/extra.cpp",
            "libs/foo/example/demo.cpp",
            "boost/detail/foo_detail.hpp",
            "boost/pending/queue.hpp",
        ],
        &[
            "boost-build.jam",
            "tools/build",
            "libs/foo/src",
            "libs/foo/test",
            "libs/foo/doc/foo.qbk",
            "boost/foo.hpp",
            "boost/numeric",
        ],
    );

    Ok(())
}

#[test]
fn empty_variant_keeps_reserved_headers_only() -> Result<()> {
    let fixture = SourceFixture::boost_like()?;
    assemble(&fixture, options().variant(ReleaseVariant::NEITHER))?;

    let result = list_files(fixture.dest_root())?;
    let expect = vec![
        PathBuf::from("boost/detail/foo_detail.hpp"),
        PathBuf::from("boost/detail/notes.qbk"),
        PathBuf::from("boost/pending/queue.hpp"),
    ];
    assert_eq!(result, expect);

    Ok(())
}

#[test]
fn existing_destination_moved_aside() -> Result<()> {
    let fixture = SourceFixture::boost_like()?;
    let dest = fixture.dest_root();
    fs::create_dir_all(&dest)?;
    fs::write(dest.join("stale.txt"), "left over from last run")?;

    let report = assemble(&fixture, options())?;
    let backup = report.backup.expect("backup location reported");

    assert!(!dest.join("stale.txt").exists());
    assert_eq!(
        fs::read_to_string(backup.join("stale.txt"))?,
        "left over from last run"
    );
    assert_eq!(backup.parent(), Some(fixture.output_root()));
    assert!(backup
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("boost_1_90_0_bck_")));

    Ok(())
}

#[test]
fn missing_source_writes_nothing() -> Result<()> {
    let fixture = SourceFixture::new()?;
    let assembler = Assembler::try_new(DistroDefinition::default())?;
    let options = AssemblyOptions::new(fixture.output_root().join("missing"), fixture.dest_root());

    let result = assembler.assemble(&options);
    assert!(matches!(result, Err(DistroError::MissingSource { .. })));
    assert!(!fixture.dest_root().exists());

    Ok(())
}

#[test]
fn missing_special_folder_is_fatal() -> Result<()> {
    let fixture = SourceFixture::new()?;
    fs::remove_dir(fixture.source_root().join("more"))?;

    let result = assemble(&fixture, options());
    let error = result.expect_err("full release needs more/");
    assert!(matches!(
        error.downcast_ref::<DistroError>(),
        Some(DistroError::MissingFolder { .. })
    ));

    // INVARIANT: Source-only releases never look at documentation folders.
    assemble(&fixture, options().variant(ReleaseVariant::SOURCE_ONLY))?;

    Ok(())
}

#[test]
fn cmake_distribution_redacts_tests() -> Result<()> {
    let fixture = SourceFixture::boost_like()?;
    let report = assemble(&fixture, options().cmake_distro(true))?;
    let dest = fixture.dest_root();
    let placeholder = format!("{}\n", DistroDefinition::default().settings.cmake_placeholder);

    assert_eq!(report.redacted_files, 2);
    assert_eq!(report.removed_files, 3);
    assert_eq!(
        fs::read_to_string(dest.join("libs/foo/test/CMakeLists.txt"))?,
        placeholder
    );
    assert_eq!(
        fs::read_to_string(dest.join("libs/numeric/odeint/docs/CMakeLists.txt"))?,
        placeholder
    );
    assert_files(
        &dest,
        &[
            "CMakeLists.txt",
            "libs/foo/CMakeLists.txt",
            "libs/foo/include/boost/foo.hpp",
            "libs/foo/src/foo.cpp",
            "libs/numeric/sublibs",
        ],
        &[
            "boost",
            "libs/foo/.travis.yml",
            "libs/foo/test/Jamfile",
            "libs/foo/test/check_basic.cpp",
            "libs/numeric/odeint/docs/tutorial.cpp",
        ],
    );

    Ok(())
}

#[test]
fn definition_file_changes_layout() -> Result<()> {
    let fixture = SourceFixture::boost_like()?;
    let definition: DistroDefinition = indoc::indoc! {r#"
        [settings]
        always_folders = ["tools", "status"]
        doc_folders = []
    "#}
    .parse()?;
    let assembler = Assembler::try_new(definition)?;
    let options = AssemblyOptions::new(fixture.source_root(), fixture.dest_root());
    assembler.assemble(&options)?;

    let dest = fixture.dest_root();
    assert!(dest.join("status/explicit-failures-markup.xml").is_file());
    assert!(!dest.join("doc").exists());
    assert!(!dest.join("more").exists());

    Ok(())
}

fn boost_distro() -> Result<Command> {
    Ok(Command::cargo_bin("boost-distro")?)
}

#[test]
fn cli_missing_source_exits_with_error() -> Result<()> {
    let fixture = SourceFixture::new()?;
    boost_distro()?
        .arg("assemble")
        .arg(fixture.output_root().join("missing"))
        .arg(fixture.dest_root())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("does not exist"));

    Ok(())
}

#[test]
fn cli_assemble_writes_report() -> Result<()> {
    let fixture = SourceFixture::boost_like()?;
    let report = fixture.output_root().join("report.json");
    boost_distro()?
        .arg("assemble")
        .arg(fixture.source_root())
        .arg(fixture.dest_root())
        .arg("--no-docs")
        .arg("--report")
        .arg(&report)
        .assert()
        .success();

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(report)?)?;
    assert_eq!(report["variant"]["include_source"], true);
    assert_eq!(report["variant"]["include_docs"], false);
    assert_eq!(report["cmake_distro"], false);
    assert_eq!(report["units"].as_array().map(Vec::len), Some(4));
    assert!(fixture.dest_root().join("boost/foo.hpp").is_file());
    assert!(!fixture.dest_root().join("index.html").exists());

    Ok(())
}

#[test]
fn cli_lists_units() -> Result<()> {
    let fixture = SourceFixture::boost_like()?;
    boost_distro()?
        .arg("units")
        .arg(fixture.source_root())
        .assert()
        .success()
        .stdout(predicate::str::contains("foo\n"))
        .stdout(predicate::str::contains("headers [no include]"))
        .stdout(predicate::str::contains("numeric/odeint (nested)"));

    Ok(())
}

#[test]
fn cli_prints_defaults() -> Result<()> {
    boost_distro()?
        .arg("defaults")
        .assert()
        .success()
        .stdout(predicate::str::contains("[settings]"))
        .stdout(predicate::str::contains("headers_dir = \"boost\""));

    Ok(())
}
