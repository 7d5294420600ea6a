//! Choosing one directory per package name.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::discovery::DiscoveredPackage;
use crate::package::{CandidatePackageSet, PackageDescriptorRef, PackageName};

/// Groups packages by declared name and keeps the shallowest directory of each group.
///
/// Depth is the number of path components of the package directory. Equally shallow entries
/// are decided by input order so the caller must supply a deterministic order, [`discover`](crate::discovery::discover)
/// orders by path.
///
/// # Returns
/// The canonical set and the descriptors excluded as duplicates, in input order.
pub fn dedupe(packages: &[DiscoveredPackage]) -> (CandidatePackageSet, Vec<PackageDescriptorRef>) {
	let mut groups = BTreeMap::<&PackageName, Vec<usize>>::new();
	for (index, package) in packages.iter().enumerate() {
		groups.entry(&package.name).or_default().push(index);
	}

	let mut canonical = BTreeMap::<PackageName, PathBuf>::new();
	let mut chosen = BTreeSet::<usize>::new();
	for (name, group) in groups {
		/* `min_by_key` keeps the first of equal elements */
		if let Some(&index) = group.iter().min_by_key(|&&i| packages[i].descriptor.dir().components().count()) {
			canonical.insert(name.clone(), packages[index].descriptor.dir().to_path_buf());
			chosen.insert(index);
		}
	}

	let duplicates: Vec<PackageDescriptorRef> = packages.iter().enumerate()
		.filter(|(index, _)| !chosen.contains(index))
		.map(|(_, p)| p.descriptor.clone())
		.collect();

	for duplicate in &duplicates {
		log::warn!("Ignoring {} as another package with the same name was found", duplicate.file().display());
	}

	(CandidatePackageSet::from_map(canonical), duplicates)
}
