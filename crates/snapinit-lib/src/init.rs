//! Running a whole initialization, from searching the project tree to the configuration draft.
//!
//! # Usage
//! ```no_run
//! # use snapinit::*;
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_from_disk()?;
//! let source = snapshot::HttpSnapshotSource::new(&config)?;
//! let oracle = build_plan::SnapshotPlanOracle::new(
//! 	snapshot::HttpSnapshotSource::new(&config)?,
//! 	package::BasicDescriptorLoader::default(),
//! 	config.discovery.clone(),
//! );
//! let draft = ProjectResolverBuilder::new(&config, package::BasicDescriptorLoader::default(), source, oracle)
//! 	.build()
//! 	.resolve_project("my-project", &InitOptions::default())?;
//! println!("{}", serde_json::to_string_pretty(&draft)?);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use crate::build_plan::BuildPlanOracle;
use crate::cancellation::CancellationToken;
use crate::error::InitFailure;
use crate::package::DescriptorLoader;
use crate::project_config::ProjectConfigDraft;
use crate::snapshot::{Snapshot, SnapshotSource};
use crate::Config;

/// Options for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOptions {
	/// Where to look for packages. When empty the project root is searched.
	pub search_roots: Vec<PathBuf>,
	/// Search subdirectories of the roots.
	pub recurse: bool,
	/// Drop packages with unsatisfiable dependencies instead of failing.
	pub omit_incompatible: bool,
	/// Allow replacing an existing project configuration.
	pub overwrite_existing: bool,
}

impl Default for InitOptions {
	fn default() -> Self {
		Self {
			search_roots: Vec::new(),
			recurse: true,
			omit_incompatible: false,
			overwrite_existing: false,
		}
	}
}

pub struct ProjectResolverBuilder<'c, L, S, O> {
	config: &'c Config,
	loader: L,
	source: S,
	oracle: O,
	explicit_snapshot: Option<Snapshot>,
	cancel: CancellationToken,
}

impl<'c, L, S, O> ProjectResolverBuilder<'c, L, S, O>
where
	L: DescriptorLoader,
	S: SnapshotSource,
	O: BuildPlanOracle,
{
	/// # Parameters
	/// - `loader` - Reads descriptors found during discovery.
	/// - `source` - Lists published snapshots when none is given explicitly.
	/// - `oracle` - Decides whether packages can be built with a snapshot.
	pub fn new(config: &'c Config, loader: L, source: S, oracle: O) -> Self {
		Self {
			config,
			loader,
			source,
			oracle,
			explicit_snapshot: None,
			cancel: CancellationToken::new(),
		}
	}

	/// Use this snapshot instead of ranking the published ones.
	pub fn explicit_snapshot(mut self, snapshot: Option<Snapshot>) -> Self {
		self.explicit_snapshot = snapshot;
		self
	}

	pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
		self.cancel = cancel;
		self
	}

	pub fn build(self) -> ProjectResolver<'c, L, S, O> {
		ProjectResolver {
			config: self.config,
			loader: self.loader,
			source: self.source,
			oracle: self.oracle,
			explicit_snapshot: self.explicit_snapshot,
			cancel: self.cancel,
		}
	}
}

pub struct ProjectResolver<'c, L, S, O> {
	config: &'c Config,
	loader: L,
	source: S,
	oracle: O,
	explicit_snapshot: Option<Snapshot>,
	cancel: CancellationToken,
}

impl<'c, L, S, O> ProjectResolver<'c, L, S, O>
where
	L: DescriptorLoader,
	S: SnapshotSource,
	O: BuildPlanOracle,
{
	/// Finds the packages of the project at `project_root` and a snapshot to build them with.
	///
	/// # Errors
	/// - [`InitFailure::ConfigExists`] when a project configuration exists and `overwrite_existing` is not set.
	/// - [`InitFailure::NoPackagesFound`] when the search roots contain no descriptors.
	/// - [`InitFailure::SnapshotSourceUnavailable`] when no snapshot was given and none can be listed.
	/// - Anything returned by [`discover`](crate::discovery::discover), [`converge`](crate::resolver::converge)
	/// or [`select_snapshot`](crate::resolver::select_snapshot).
	pub fn resolve_project(&mut self, project_root: impl AsRef<Path>, options: &InitOptions) -> Result<ProjectConfigDraft, InitFailure> {
		let project_root = std::fs::canonicalize(project_root.as_ref()).map_err(crate::Error::from)?;

		let existing = project_root.join(self.config.project_file_name());
		if existing.exists() && !options.overwrite_existing {
			return Err(InitFailure::ConfigExists(existing));
		}

		let roots = if options.search_roots.is_empty() {
			vec![project_root.clone()]
		} else {
			options.search_roots.iter()
				.map(|r| std::fs::canonicalize(project_root.join(r)))
				.collect::<Result<Vec<_>, _>>()
				.map_err(crate::Error::from)?
		};

		log::info!("Looking for packages in {} search roots", roots.len());
		let discovered = crate::discovery::discover(&roots, options.recurse, &self.config.discovery, &self.loader, &self.cancel)?;
		if discovered.is_empty() {
			return Err(InitFailure::NoPackagesFound(roots));
		}

		let (packages, duplicates) = crate::dedupe::dedupe(&discovered);
		log::info!("Found {} packages, {} duplicates ignored", packages.len(), duplicates.len());

		let convergence = match &self.explicit_snapshot {
			Some(snapshot) => {
				log::info!("Using snapshot {}", snapshot);
				crate::resolver::converge(&mut self.oracle, snapshot, packages, options.omit_incompatible, &self.cancel)?
			},
			None => {
				self.cancel.check()?;
				let available = self.source.list_available().map_err(|e| match e {
					crate::Error::Cancelled => InitFailure::Cancelled,
					e => InitFailure::SnapshotSourceUnavailable(e),
				})?;
				let candidates = crate::snapshot::rank_snapshots(&available, &self.config.ranking);
				log::debug!("Candidate snapshots: {}", candidates.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", "));
				crate::resolver::select_snapshot(&mut self.oracle, &candidates, &packages, options.omit_incompatible, &self.cancel)?
			},
		};

		log::info!("Selected snapshot {}", convergence.snapshot);
		Ok(crate::project_config::assemble(&project_root, convergence, &duplicates))
	}
}

/// Shorthand for a [`ProjectResolverBuilder`] with default cancellation.
///
/// # Parameters
/// - `explicit_snapshot` - When `None` the best published snapshot is searched for.
pub fn resolve_project<L, S, O>(
	config: &Config,
	project_root: impl AsRef<Path>,
	options: &InitOptions,
	explicit_snapshot: Option<Snapshot>,
	loader: L,
	source: S,
	oracle: O,
) -> Result<ProjectConfigDraft, InitFailure>
where
	L: DescriptorLoader,
	S: SnapshotSource,
	O: BuildPlanOracle,
{
	ProjectResolverBuilder::new(config, loader, source, oracle)
		.explicit_snapshot(explicit_snapshot)
		.build()
		.resolve_project(project_root, options)
}
