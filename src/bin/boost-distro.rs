// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use boost_distro::{
    path::resolve_root, Assembler, AssemblyOptions, DistroDefinition, ReleaseVariant,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::{fs, path::PathBuf, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "boost-distro [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        match self.command {
            Command::Assemble(opts) => run_assemble(opts),
            Command::Units(opts) => run_units(opts),
            Command::Defaults => run_defaults(),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Assemble release distribution from monorepo checkout.
    #[command(override_usage = "boost-distro assemble [options] <source_root> <dest_root>")]
    Assemble(AssembleOptions),

    /// List library units found in monorepo checkout.
    #[command(override_usage = "boost-distro units [options] <source_root>")]
    Units(UnitsOptions),

    /// Print built-in distribution definition.
    #[command(override_usage = "boost-distro defaults")]
    Defaults,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct AssembleOptions {
    /// Root of monorepo checkout.
    #[arg(required = true, value_name = "source_root")]
    pub source_root: String,

    /// Root of distribution tree to create.
    #[arg(required = true, value_name = "dest_root")]
    pub dest_root: String,

    /// Include source files (default).
    #[arg(long, overrides_with = "no_source")]
    pub source: bool,

    /// Leave source files out.
    #[arg(long, overrides_with = "source")]
    pub no_source: bool,

    /// Include documentation files (default).
    #[arg(long, overrides_with = "no_docs")]
    pub docs: bool,

    /// Leave documentation files out.
    #[arg(long, overrides_with = "docs")]
    pub no_docs: bool,

    /// Produce CMake distribution with redacted test trees.
    #[arg(long, overrides_with = "no_cmake")]
    pub cmake: bool,

    /// Produce regular distribution (default).
    #[arg(long, overrides_with = "cmake")]
    pub no_cmake: bool,

    /// Distribution definition file to use instead of built-in layout.
    #[arg(short, long, value_name = "path")]
    pub config: Option<String>,

    /// Write JSON assembly report to path.
    #[arg(short, long, value_name = "path")]
    pub report: Option<PathBuf>,

    /// Show progress bar while processing library units.
    #[arg(short, long)]
    pub progress: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct UnitsOptions {
    /// Root of monorepo checkout.
    #[arg(required = true, value_name = "source_root")]
    pub source_root: String,

    /// Distribution definition file to use instead of built-in layout.
    #[arg(short, long, value_name = "path")]
    pub config: Option<String>,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn load_definition(config: Option<&str>) -> Result<DistroDefinition> {
    let Some(config) = config else {
        return Ok(DistroDefinition::default());
    };

    let path = resolve_root(config)?;
    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read definition {:?}", path.display()))?;
    let definition = data
        .parse()
        .with_context(|| format!("failed to parse definition {:?}", path.display()))?;

    Ok(definition)
}

fn run_assemble(opts: AssembleOptions) -> Result<()> {
    let definition = load_definition(opts.config.as_deref())?;
    let mut assembler = Assembler::try_new(definition)?;
    if opts.progress {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{elapsed_precise:.green}  {msg:<30}  [{wide_bar:.yellow/blue}] {pos}/{len}",
            )?
            .progress_chars("-Cco."),
        );
        assembler = assembler.with_progress(bar);
    }

    let options = AssemblyOptions::new(
        resolve_root(&opts.source_root)?,
        resolve_root(&opts.dest_root)?,
    )
    .variant(ReleaseVariant::new(!opts.no_source, !opts.no_docs))
    .cmake_distro(opts.cmake);
    let report = assembler.assemble(&options)?;

    if let Some(path) = opts.report {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write report {:?}", path.display()))?;
        info!("wrote assembly report to {:?}", path.display());
    }

    Ok(())
}

fn run_units(opts: UnitsOptions) -> Result<()> {
    let definition = load_definition(opts.config.as_deref())?;
    let assembler = Assembler::try_new(definition)?;
    for unit in assembler.discover(resolve_root(&opts.source_root)?)? {
        let nested = if unit.id.is_nested() { " (nested)" } else { "" };
        let include = if unit.has_include_dir {
            ""
        } else {
            " [no include]"
        };
        println!("{}{nested}{include}", unit.id);
    }

    Ok(())
}

fn run_defaults() -> Result<()> {
    print!("{}", DistroDefinition::default());
    Ok(())
}
