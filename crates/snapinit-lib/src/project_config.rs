//! Assembling the outcome of a resolve into a project configuration.
//!
//! Nothing here touches the disk, writing the configuration out is up to the caller.

use std::path::{Component, Path};

use serde::Serialize;

use crate::build_plan::{ExtraDependency, PackageFlags};
use crate::package::PackageDescriptorRef;
use crate::resolver::{Convergence, ConvergenceOutcome};
use crate::snapshot::Snapshot;

/// A project configuration ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConfigDraft {
	pub snapshot: Snapshot,
	/// Package directories relative to the project root, `"."` being the root itself. Sorted.
	pub packages: Vec<String>,
	#[serde(skip_serializing_if = "PackageFlags::is_empty")]
	pub flags: PackageFlags,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub extra_deps: Vec<ExtraDependency>,
	/// Directories excluded because a shallower package has the same name.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub duplicates: Vec<String>,
	/// Directories excluded because their dependencies can't be satisfied.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub incompatible: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	/// Set when every package had to be excluded.
	/// `packages` is then empty and the configuration only fixes the snapshot.
	pub no_working_plan: bool,
}

/// Builds the draft for `convergence`.
///
/// # Parameters
/// - `project_root` - Paths are made relative to this.
/// - `duplicates` - Descriptors excluded by deduplication.
pub fn assemble(project_root: impl AsRef<Path>, convergence: Convergence, duplicates: &[PackageDescriptorRef]) -> ProjectConfigDraft {
	let project_root = project_root.as_ref();

	let mut packages: Vec<String> = convergence.packages.iter().map(|(_, dir)| relative_dir(project_root, dir)).collect();
	packages.sort();

	let mut duplicates: Vec<String> = duplicates.iter().map(|d| relative_dir(project_root, d.dir())).collect();
	duplicates.sort();
	duplicates.dedup();

	let mut incompatible: Vec<String> = convergence.removed.iter().map(|(_, dir)| relative_dir(project_root, dir)).collect();
	incompatible.sort();

	let mut extra_deps = convergence.extra_deps;
	extra_deps.sort();

	let message = synthesize_message(&duplicates, &incompatible, &extra_deps);

	ProjectConfigDraft {
		snapshot: convergence.snapshot,
		packages,
		flags: convergence.flags,
		extra_deps,
		duplicates,
		incompatible,
		message,
		no_working_plan: convergence.outcome == ConvergenceOutcome::NoWorkingPlan,
	}
}

/// `dir` relative to `root` using `/` separators, `"."` for the root itself.
///
/// Falls back to the full path of `dir` when no relative path exists.
pub fn relative_dir(root: &Path, dir: &Path) -> String {
	let relative = pathdiff::diff_paths(dir, root).unwrap_or_else(|| dir.to_path_buf());
	let parts: Vec<_> = relative.components()
		.filter(|c| !matches!(c, Component::CurDir))
		.map(|c| c.as_os_str().to_string_lossy().into_owned())
		.collect();
	if parts.is_empty() {
		".".to_string()
	} else {
		parts.join("/")
	}
}

/// Combines the three kinds of notable exclusions and additions into one message.
///
/// Returns `None` when there is nothing to report.
pub fn synthesize_message(duplicates: &[String], incompatible: &[String], extra_deps: &[ExtraDependency]) -> Option<String> {
	let mut sections = Vec::<String>::new();

	if !duplicates.is_empty() {
		sections.push(section(
			"These packages share a name with a package closer to the project root and were left out:",
			duplicates.iter(),
		));
	}
	if !incompatible.is_empty() {
		sections.push(section(
			"These packages have dependencies the snapshot can't satisfy and were left out:",
			incompatible.iter(),
		));
	}
	if !extra_deps.is_empty() {
		sections.push(section(
			"The snapshot does not satisfy every dependency, these were added as extra dependencies:",
			extra_deps.iter(),
		));
	}

	if sections.is_empty() {
		None
	} else {
		Some(sections.join("\n\n"))
	}
}

fn section<T: std::fmt::Display>(heading: &str, items: impl Iterator<Item = T>) -> String {
	let mut s = heading.to_string();
	for item in items {
		s.push_str(&format!("\n- {}", item));
	}
	s
}
