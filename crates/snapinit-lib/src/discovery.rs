//! Locating local packages.
//!
//! Descriptor files are found by walking each search root, skipping hidden and build artifact directories.
//! Each directory contributes at most one descriptor, see [`preferred_descriptor`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::cancellation::CancellationToken;
use crate::config::DiscoveryConfig;
use crate::error::InitFailure;
use crate::package::*;

/// A successfully loaded package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPackage {
	pub descriptor: PackageDescriptorRef,
	pub name: PackageName,
	pub metadata: PackageMetadata,
}

/// Picks the descriptor representing a directory from all descriptor files in it.
///
/// The hand-written form wins over generated ones since those are produced from it.
/// If there is no hand-written descriptor the lexicographically first generated one is used.
pub(crate) fn preferred_descriptor(mut files: Vec<PathBuf>, config: &DiscoveryConfig) -> Option<PathBuf> {
	files.sort();
	if let Some(i) = files.iter().position(|f| config.is_hand_written_descriptor(f)) {
		return Some(files.swap_remove(i));
	}
	let generated: Vec<_> = files.into_iter().filter(|f| config.is_generated_descriptor(f)).collect();
	if generated.len() > 1 {
		log::warn!("Multiple descriptors found in {}, using {}",
			generated[0].parent().map(|p| p.display().to_string()).unwrap_or_default(),
			generated[0].display()
		);
	}
	generated.into_iter().next()
}

/// Finds the descriptor files below each root.
///
/// # Parameters
/// - `recurse` - When `false` only files directly inside a root are considered.
///
/// # Errors
/// Any walking error other than permission problems, which only hide the affected directory.
pub fn find_descriptors(roots: &[impl AsRef<Path>], recurse: bool, config: &DiscoveryConfig) -> crate::Result<Vec<PackageDescriptorRef>> {
	/* Roots may overlap so collect into a set first */
	let mut files = BTreeSet::<PathBuf>::new();
	for root in roots {
		let found = crate::filesystem::find_files(
			root,
			|p| config.is_descriptor(p),
			|d| recurse && config.is_searchable_dir(d),
		)?;
		files.extend(found);
	}

	let mut by_dir = BTreeMap::<PathBuf, Vec<PathBuf>>::new();
	for file in files {
		if let Some(dir) = file.parent() {
			by_dir.entry(dir.to_path_buf()).or_default().push(file);
		}
	}

	let mut descriptors: Vec<_> = by_dir.into_values()
		.filter_map(|files| preferred_descriptor(files, config))
		.filter_map(|file| PackageDescriptorRef::new(file))
		.collect();
	descriptors.sort_by(|a, b| a.file().cmp(b.file()));
	Ok(descriptors)
}

/// Finds and loads every package below `roots`.
///
/// The result is ordered by descriptor path.
///
/// # Errors
/// - [`InitFailure::NameMismatch`] listing every descriptor whose file name disagrees with its declared name.
/// This is only reported after all descriptors have been loaded.
/// - [`InitFailure::Cancelled`] when `cancel` trips between loads.
/// - [`InitFailure::Other`] for walking and any other loader error.
pub fn discover<L>(roots: &[impl AsRef<Path>], recurse: bool, config: &DiscoveryConfig, loader: &L, cancel: &CancellationToken) -> Result<Vec<DiscoveredPackage>, InitFailure>
where L: DescriptorLoader + ?Sized
{
	let descriptors = find_descriptors(roots, recurse, config)?;
	log::debug!("Found {} descriptor files", descriptors.len());

	let mut packages = Vec::with_capacity(descriptors.len());
	let mut mismatches = Vec::<(PathBuf, PackageName)>::new();

	for descriptor in descriptors {
		cancel.check()?;
		match loader.load(descriptor.file()) {
			Ok(loaded) => {
				log::trace!("Found package {} at {}", loaded.name, descriptor.dir().display());
				packages.push(DiscoveredPackage { descriptor, name: loaded.name, metadata: loaded.metadata });
			},
			Err(LoadError::NameMismatch { path, declared }) => {
				log::error!("{} declares package `{}`", path.display(), declared);
				mismatches.push((path, declared));
			},
			Err(LoadError::Other(e)) => return Err(e.into()),
		}
	}

	if !mismatches.is_empty() {
		return Err(InitFailure::NameMismatch(mismatches));
	}

	Ok(packages)
}
