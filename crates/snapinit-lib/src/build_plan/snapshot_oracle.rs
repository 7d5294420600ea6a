use std::collections::HashMap;
use std::path::Path;

use super::*;
use crate::config::DiscoveryConfig;
use crate::package::{DescriptorLoader, LoadError, LoadedDescriptor};
use crate::snapshot::{SnapshotContents, SnapshotSource};

/// An oracle checking declared dependencies against the packages pinned by a snapshot.
///
/// A dependency is satisfied when it is another package of the checked set or is pinned by the snapshot.
/// Versions are not compared and flags are never assigned, so this never reports [`BuildPlanResult::Partial`].
///
/// Snapshot contents and descriptors are loaded once and reused for later checks.
pub struct SnapshotPlanOracle<S, L> {
	source: S,
	loader: L,
	discovery: DiscoveryConfig,
	contents: HashMap<Snapshot, SnapshotContents>,
	packages: HashMap<PathBuf, LoadedDescriptor>,
}

impl<S: SnapshotSource, L: DescriptorLoader> SnapshotPlanOracle<S, L> {
	pub fn new(source: S, loader: L, discovery: DiscoveryConfig) -> Self {
		Self {
			source,
			loader,
			discovery,
			contents: Default::default(),
			packages: Default::default(),
		}
	}

	fn load_package(&mut self, dir: &Path) -> crate::Result<()> {
		if self.packages.contains_key(dir) {
			return Ok(());
		}

		let files = crate::filesystem::find_files(dir, |p| self.discovery.is_descriptor(p), |_| false)?;
		let file = crate::discovery::preferred_descriptor(files, &self.discovery)
			.ok_or_else(|| crate::Error::Parse(format!("no descriptor found in {}", dir.display())))?;

		let loaded = self.loader.load(&file).map_err(|e| match e {
			LoadError::NameMismatch { .. } => crate::Error::Parse(e.to_string()),
			LoadError::Other(e) => e,
		})?;
		self.packages.insert(dir.to_path_buf(), loaded);
		Ok(())
	}
}

impl<S: SnapshotSource, L: DescriptorLoader> BuildPlanOracle for SnapshotPlanOracle<S, L> {
	fn check_plan(&mut self, snapshot: &Snapshot, package_dirs: &[PathBuf]) -> crate::Result<BuildPlanResult> {
		for dir in package_dirs {
			self.load_package(dir)?;
		}

		if !self.contents.contains_key(snapshot) {
			log::debug!("Loading contents of snapshot {}", snapshot);
			let contents = self.source.load_contents(snapshot)?;
			self.contents.insert(snapshot.clone(), contents);
		}
		let contents = &self.contents[snapshot];

		let locals: Vec<&LoadedDescriptor> = package_dirs.iter().filter_map(|d| self.packages.get(d)).collect();
		let local_names: BTreeSet<&PackageName> = locals.iter().map(|p| &p.name).collect();

		let mut errors = DepErrors::new();
		for package in &locals {
			for dependency in &package.metadata.dependencies {
				if local_names.contains(dependency) || contents.contains(dependency) {
					continue;
				}
				errors.add(dependency.clone(), package.name.clone());
			}
		}

		if errors.is_empty() {
			Ok(BuildPlanResult::Ok(Default::default()))
		} else {
			log::debug!("Snapshot {} leaves {} dependencies unsatisfied", snapshot, errors.len());
			Ok(BuildPlanResult::Fail(errors))
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::package::BasicDescriptorLoader;
	use crate::snapshot::AvailableSnapshots;
	use std::cell::Cell;

	struct FixedSource {
		loads: Cell<usize>,
	}

	impl SnapshotSource for FixedSource {
		fn list_available(&self) -> crate::Result<AvailableSnapshots> {
			unimplemented!("not used by the oracle")
		}

		fn load_contents(&self, _: &Snapshot) -> crate::Result<SnapshotContents> {
			self.loads.set(self.loads.get() + 1);
			SnapshotContents::from_cabal_config("constraints: any.base installed, any.text ==2.0")
		}
	}

	fn package(root: &Path, name: &str, deps: &str) -> PathBuf {
		let dir = root.join(name);
		std::fs::create_dir_all(&dir).unwrap();
		std::fs::write(dir.join(format!("{}.cabal", name)), format!("name: {}\nlibrary\n  build-depends: {}\n", name, deps)).unwrap();
		dir
	}

	#[test]
	fn local_and_snapshot_dependencies_are_satisfied() {
		let root = tempfile::tempdir().unwrap();
		let a = package(root.path(), "a", "base, text");
		let b = package(root.path(), "b", "base, a");

		let source = FixedSource { loads: Cell::new(0) };
		let mut oracle = SnapshotPlanOracle::new(&source, BasicDescriptorLoader::default(), Default::default());
		let snapshot = Snapshot::Lts { major: 22, minor: 1 };

		assert_eq!(oracle.check_plan(&snapshot, &[a.clone(), b.clone()]).unwrap(), BuildPlanResult::Ok(Default::default()));
		/* Without `a` in the set, `b` is missing a dependency */
		let BuildPlanResult::Fail(errors) = oracle.check_plan(&snapshot, &[b]).unwrap() else { panic!("expected failure") };
		assert_eq!(errors.implicated_packages(), [PackageName::from("b")].into_iter().collect());
		assert_eq!(source.loads.get(), 1);
	}

	#[test]
	fn unknown_dependency_fails() {
		let root = tempfile::tempdir().unwrap();
		let c = package(root.path(), "c", "base, lens");

		let source = FixedSource { loads: Cell::new(0) };
		let mut oracle = SnapshotPlanOracle::new(&source, BasicDescriptorLoader::default(), Default::default());
		let result = oracle.check_plan(&Snapshot::Nightly { date: "2024-01-01".into() }, &[c]).unwrap();

		let BuildPlanResult::Fail(errors) = result else { panic!("expected failure") };
		assert!(errors.get(&PackageName::from("lens")).is_some());
	}
}
