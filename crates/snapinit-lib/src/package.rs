//! Various types associated with local packages.

use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};

mod basic_loader;
pub use basic_loader::BasicDescriptorLoader;

/// The name a package declares for itself.
///
/// Compared and ordered by its string value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageName(String);

impl PackageName {
	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for PackageName {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for PackageName {
	fn from(s: &str) -> Self {
		Self::new(s)
	}
}

impl AsRef<str> for PackageName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

/// Location of a descriptor file found during discovery.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageDescriptorRef {
	file: PathBuf,
	dir: PathBuf,
}

impl PackageDescriptorRef {
	/// Returns `None` when `file` has no parent directory.
	pub fn new(file: impl Into<PathBuf>) -> Option<Self> {
		let file = file.into();
		let dir = file.parent()?.to_path_buf();
		Some(Self { file, dir })
	}

	pub fn file(&self) -> &Path {
		&self.file
	}

	/// The directory containing the descriptor, this is the package's directory.
	pub fn dir(&self) -> &Path {
		&self.dir
	}
}

/// Information from a descriptor beyond its name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
	/// Names of every package this one depends on, in declaration order without repeats.
	pub dependencies: Vec<PackageName>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDescriptor {
	pub name: PackageName,
	pub metadata: PackageMetadata,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
	/// The descriptor's file name does not correspond to the name it declares.
	#[error("{} declares package `{}`", .path.display(), .declared)]
	NameMismatch { path: PathBuf, declared: PackageName },
	#[error(transparent)]
	Other(#[from] crate::Error),
}

/// Reads descriptor files.
pub trait DescriptorLoader {
	/// Loads the descriptor at `path`.
	///
	/// # Errors
	/// - [`LoadError::NameMismatch`] when the descriptor declares a name its file name disagrees with.
	/// - [`LoadError::Other`] for anything else, these abort the run.
	fn load(&self, path: &Path) -> Result<LoadedDescriptor, LoadError>;
}

impl<T: DescriptorLoader + ?Sized> DescriptorLoader for &T {
	fn load(&self, path: &Path) -> Result<LoadedDescriptor, LoadError> {
		(**self).load(path)
	}
}

/// The packages currently considered, one directory per name.
///
/// Only built by [`dedupe`](crate::dedupe::dedupe), afterwards entries can only be removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePackageSet {
	packages: std::collections::BTreeMap<PackageName, PathBuf>,
}

impl CandidatePackageSet {
	pub(crate) fn from_map(packages: std::collections::BTreeMap<PackageName, PathBuf>) -> Self {
		Self { packages }
	}

	pub fn len(&self) -> usize {
		self.packages.len()
	}

	pub fn is_empty(&self) -> bool {
		self.packages.is_empty()
	}

	pub fn contains(&self, name: &PackageName) -> bool {
		self.packages.contains_key(name)
	}

	pub fn dir(&self, name: &PackageName) -> Option<&Path> {
		self.packages.get(name).map(|p| p.as_path())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&PackageName, &Path)> {
		self.packages.iter().map(|(n, p)| (n, p.as_path()))
	}

	pub fn names(&self) -> impl Iterator<Item = &PackageName> {
		self.packages.keys()
	}

	/// Package directories ordered by package name.
	pub fn dirs(&self) -> Vec<PathBuf> {
		self.packages.values().cloned().collect()
	}

	/// Removes the named packages, returning what was actually removed.
	pub fn remove_all<'a>(&mut self, names: impl IntoIterator<Item = &'a PackageName>) -> Vec<(PackageName, PathBuf)> {
		names.into_iter()
			.filter_map(|n| self.packages.remove_entry(n))
			.collect()
	}
}
