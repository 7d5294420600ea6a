//! The build plan oracle decides whether a set of packages can be built against a snapshot.
//!
//! The resolver only ever sees a [`BuildPlanResult`], never how the answer was reached.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Serialize, Deserialize};

use crate::package::PackageName;
use crate::snapshot::Snapshot;

mod snapshot_oracle;
pub use snapshot_oracle::SnapshotPlanOracle;

/// Flag assignments, per package.
pub type PackageFlags = BTreeMap<PackageName, BTreeMap<String, bool>>;

/// A dependency that has to be added on top of the snapshot.
///
/// Serialized in its `name-version` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExtraDependency {
	pub name: PackageName,
	pub version: String,
}

impl std::fmt::Display for ExtraDependency {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}-{}", self.name, self.version)
	}
}

impl Serialize for ExtraDependency {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

/// Why a single dependency could not be satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepError {
	/// Version the snapshot offers, if it has the package at all.
	pub available: Option<String>,
	/// Packages requiring the dependency.
	pub needed_by: BTreeSet<PackageName>,
}

/// Unsatisfied dependencies keyed by the dependency's name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepErrors(BTreeMap<PackageName, DepError>);

impl DepErrors {
	pub fn new() -> Self {
		Default::default()
	}

	/// Records that `needed_by` requires `dependency`.
	pub fn add(&mut self, dependency: PackageName, needed_by: PackageName) {
		self.0.entry(dependency).or_default().needed_by.insert(needed_by);
	}

	pub fn get(&self, dependency: &PackageName) -> Option<&DepError> {
		self.0.get(dependency)
	}

	pub fn get_mut(&mut self, dependency: &PackageName) -> Option<&mut DepError> {
		self.0.get_mut(dependency)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&PackageName, &DepError)> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Every package named as requiring an unsatisfied dependency.
	pub fn implicated_packages(&self) -> BTreeSet<PackageName> {
		self.0.values().flat_map(|e| e.needed_by.iter().cloned()).collect()
	}
}

impl FromIterator<(PackageName, DepError)> for DepErrors {
	fn from_iter<I: IntoIterator<Item = (PackageName, DepError)>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl std::fmt::Display for DepErrors {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for (i, (dependency, error)) in self.0.iter().enumerate() {
			if i > 0 { writeln!(f)?; }
			let needed_by = error.needed_by.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(", ");
			match &error.available {
				Some(version) => write!(f, "- {} (snapshot has {}) needed by {}", dependency, version, needed_by)?,
				None => write!(f, "- {} (not in snapshot) needed by {}", dependency, needed_by)?,
			}
		}
		Ok(())
	}
}

/// The three possible answers of an oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildPlanResult {
	/// Every package is satisfied by the snapshot.
	Ok(PackageFlags),
	/// Every package is satisfied once the extra dependencies are added.
	Partial(PackageFlags, Vec<ExtraDependency>),
	/// Some dependencies can't be satisfied.
	Fail(DepErrors),
}

/// Checks package sets against snapshots.
pub trait BuildPlanOracle {
	/// # Parameters
	/// - `snapshot` - The snapshot to check against.
	/// - `package_dirs` - Directories of the local packages to be built together.
	///
	/// # Errors
	/// Failure to reach an answer at all, for example [`Cancelled`](crate::Error::Cancelled) or a failed download.
	/// An unsatisfiable plan is not an error, it's [`BuildPlanResult::Fail`].
	fn check_plan(&mut self, snapshot: &Snapshot, package_dirs: &[PathBuf]) -> crate::Result<BuildPlanResult>;
}

impl<F> BuildPlanOracle for F
where F: FnMut(&Snapshot, &[PathBuf]) -> crate::Result<BuildPlanResult>
{
	fn check_plan(&mut self, snapshot: &Snapshot, package_dirs: &[PathBuf]) -> crate::Result<BuildPlanResult> {
		self(snapshot, package_dirs)
	}
}
