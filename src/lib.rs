// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Boost release tree assembly.
//!
//! Turn a full Boost monorepo checkout into a release __distribution__: a
//! `libs/` tree holding each library's payload, and a single `boost/` header
//! tree holding the merged public headers of every library. Which files make
//! it in depends on the selected [`ReleaseVariant`], so the same checkout can
//! yield a full, source-only, or docs-only release.
//!
//! Library units are discovered from the shape of their directories, never
//! from a fixed list. See [`distro::discover`] for the exact rules.
//!
//! # Example
//!
//! ```rust,ignore
//! use boost_distro::{Assembler, AssemblyOptions, DistroDefinition, ReleaseVariant};
//!
//! let assembler = Assembler::try_new(DistroDefinition::default())?;
//! let options = AssemblyOptions::new("boost", "boost_1_90_0")
//!     .variant(ReleaseVariant::SOURCE_ONLY);
//! let report = assembler.assemble(&options)?;
//! println!("{} units", report.units.len());
//! ```

pub mod classify;
pub mod config;
pub mod distro;
pub mod path;

pub use classify::{Classification, Classify, FileClassification, PatternClassifier};
pub use config::{DistroDefinition, ReleaseVariant};
pub use distro::{
    discover::{LibraryUnit, UnitId},
    Assembler, AssemblyOptions, AssemblyReport, DistroError,
};
