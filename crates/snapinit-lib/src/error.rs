//! Library error types.
//!
//! [`Error`] covers the low level failures of collaborators (IO, HTTP, parsing).
//! [`InitFailure`] is what a resolution run reports to its caller.

use std::path::PathBuf;

use crate::build_plan::DepErrors;
use crate::package::PackageName;
use crate::snapshot::Snapshot;

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("reqwest error: {0}")]
	Reqwest(#[from] reqwest::Error),
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
	#[error("bincode error: {0}")]
	Bincode(#[from] bincode::Error),
	#[error("error walking directory: {0}")]
	WalkDir(#[from] walkdir::Error),
	#[error("parsing error: {0}")]
	Parse(String),
	#[error("operation cancelled")]
	Cancelled,
}

/// Reasons a resolution run can be abandoned.
///
/// Every variant is fatal, no [`ProjectConfigDraft`](crate::project_config::ProjectConfigDraft) is produced.
/// Running out of working packages is not listed here, see
/// [`ProjectConfigDraft::no_working_plan`](crate::project_config::ProjectConfigDraft::no_working_plan).
#[derive(Debug, Error)]
pub enum InitFailure {
	/// Descriptor files whose name does not match the package they declare.
	#[error("{}", format_name_mismatches(.0))]
	NameMismatch(Vec<(PathBuf, PackageName)>),
	#[error("no descriptor files found under {0:?}")]
	NoPackagesFound(Vec<PathBuf>),
	#[error("{} already exists, use the overwrite option to replace it", .0.display())]
	ConfigExists(PathBuf),
	/// Every candidate snapshot failed for the full package set.
	#[error("no snapshot satisfies the packages, tried: {}", format_snapshots(.tried))]
	NoMatchingSnapshot { tried: Vec<(Snapshot, DepErrors)> },
	#[error("snapshot {snapshot} does not satisfy the packages:\n{unsatisfied}")]
	PlanFailure { snapshot: Snapshot, unsatisfied: DepErrors },
	/// A bug either in the oracle or in the resolver.
	#[error("invariant violated: {0}")]
	InvariantViolation(String),
	#[error("snapshot listing unavailable: {0}")]
	SnapshotSourceUnavailable(#[source] Error),
	#[error("resolution cancelled")]
	Cancelled,
	#[error(transparent)]
	Other(Error),
}

impl From<Error> for InitFailure {
	fn from(e: Error) -> Self {
		match e {
			Error::Cancelled => InitFailure::Cancelled,
			e => InitFailure::Other(e),
		}
	}
}

fn format_name_mismatches(mismatches: &[(PathBuf, PackageName)]) -> String {
	let mut s = String::from("descriptor file names do not match their declared package names:");
	for (path, name) in mismatches {
		s.push_str(&format!("\n- {} declares `{}`", path.display(), name));
	}
	s
}

fn format_snapshots(tried: &[(Snapshot, DepErrors)]) -> String {
	tried.iter()
		.map(|(snapshot, errors)| format!("{} ({} unmet)", snapshot, errors.len()))
		.collect::<Vec<_>>()
		.join(", ")
}
