//! Finding a snapshot and the largest package set it can build.
//!
//! # Process
//! 1. [`select_snapshot`] checks the full package set against each ranked candidate, taking the first that works.
//! 1. When no candidate works and packages may be omitted, [`converge`] is run per candidate instead.
//! 1. [`converge`] repeatedly asks the oracle about the current set and drops every package blamed by a failure,
//! so the set strictly shrinks until the oracle is satisfied or nothing is left.
//!
//! An explicit snapshot skips selection and goes straight to [`converge`].

use std::path::PathBuf;

use crate::build_plan::*;
use crate::cancellation::CancellationToken;
use crate::error::InitFailure;
use crate::package::{CandidatePackageSet, PackageName};
use crate::snapshot::Snapshot;

mod convergence;
pub use convergence::converge;

mod selection;
pub use selection::select_snapshot;

/// How a resolve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceOutcome {
	/// The snapshot alone satisfies every remaining package.
	Complete,
	/// Extra dependencies are needed on top of the snapshot.
	Partial,
	/// Every package was dropped. Not an error, the project simply has no buildable packages.
	NoWorkingPlan,
}

/// The result of a successful resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Convergence {
	pub snapshot: Snapshot,
	/// Packages that remain.
	pub packages: CandidatePackageSet,
	/// Flag assignments for packages that remain.
	pub flags: PackageFlags,
	pub extra_deps: Vec<ExtraDependency>,
	/// Packages dropped due to unsatisfiable dependencies, in the order they were dropped.
	pub removed: Vec<(PackageName, PathBuf)>,
	pub outcome: ConvergenceOutcome,
	/// Number of oracle answers the resolve went through.
	pub iterations: usize,
}

impl Convergence {
	fn satisfied(snapshot: &Snapshot, packages: CandidatePackageSet, mut flags: PackageFlags, extra_deps: Vec<ExtraDependency>, removed: Vec<(PackageName, PathBuf)>, iterations: usize) -> Self {
		log::info!("Snapshot {} satisfies {} packages after {} checks", snapshot, packages.len(), iterations);
		flags.retain(|name, _| packages.contains(name));
		let outcome = if extra_deps.is_empty() { ConvergenceOutcome::Complete } else { ConvergenceOutcome::Partial };

		Self {
			snapshot: snapshot.clone(),
			packages,
			flags,
			extra_deps,
			removed,
			outcome,
			iterations,
		}
	}
}
