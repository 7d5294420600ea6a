//! Various helper functions for testing
//!
//! functions in this module should use results and not use any panics to avoid confusion in callers

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use snapinit::build_plan::{BuildPlanOracle, BuildPlanResult};
use snapinit::snapshot::{AvailableSnapshots, SnapshotContents, SnapshotSource};
use snapinit::Snapshot;

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("copy error: {0}")]
	Copy(#[from] fs_extra::error::Error),
	#[error("snapinit error: {0}")]
	Snapinit(#[from] snapinit::Error),
}

pub type Result<T> = std::result::Result<T, FixtureError>;

/// Directory of the checked in project trees.
pub fn test_data_dir() -> PathBuf {
	Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data")
}

/// A throwaway project directory, removed when dropped.
pub struct ProjectFixture {
	dir: tempfile::TempDir,
}

impl ProjectFixture {
	pub fn new() -> Result<Self> {
		Ok(Self { dir: tempfile::tempdir()? })
	}

	/// Creates a fixture holding a copy of `test-data/<name>`.
	pub fn from_test_data(name: &str) -> Result<Self> {
		let fixture = Self::new()?;
		let mut options = fs_extra::dir::CopyOptions::new();
		options.content_only = true;
		fs_extra::dir::copy(test_data_dir().join(name), fixture.root(), &options)?;
		Ok(fixture)
	}

	/// The canonical path of the project root.
	///
	/// Canonical so paths compare equal to those found by discovery, temporary directories are often behind symlinks.
	pub fn root(&self) -> PathBuf {
		self.dir.path().canonicalize().unwrap_or_else(|_| self.dir.path().to_path_buf())
	}

	/// Writes `contents` to `path` relative to the root, creating directories as needed.
	pub fn write(&self, path: impl AsRef<Path>, contents: &str) -> Result<PathBuf> {
		let path = self.root().join(path);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&path, contents)?;
		Ok(path)
	}

	/// Writes a generated descriptor `<dir>/<name>.cabal` with a library depending on `dependencies`.
	pub fn write_cabal(&self, dir: impl AsRef<Path>, name: &str, dependencies: &[&str]) -> Result<PathBuf> {
		let text = format!(
			"cabal-version: 2.4\nname: {}\nversion: 0.1.0.0\n\nlibrary\n  exposed-modules: Lib\n  build-depends: {}\n",
			name,
			dependencies.join(", "),
		);
		self.write(dir.as_ref().join(format!("{}.cabal", name)), &text)
	}

	/// Writes a hand-written descriptor `<dir>/package.yaml` depending on `dependencies`.
	pub fn write_package_yaml(&self, dir: impl AsRef<Path>, name: &str, dependencies: &[&str]) -> Result<PathBuf> {
		let mut text = format!("name: {}\nversion: 0.1.0.0\n\ndependencies:\n", name);
		for dependency in dependencies {
			text.push_str(&format!("- {}\n", dependency));
		}
		self.write(dir.as_ref().join("package.yaml"), &text)
	}
}

/// Every call made to a [`ScriptedOracle`], shared so it can be inspected after the oracle is moved.
pub type CallLog = Arc<Mutex<Vec<(Snapshot, Vec<PathBuf>)>>>;

/// An oracle answering from a queue of prepared results.
///
/// Running out of answers is reported as an error rather than a panic.
#[derive(Default)]
pub struct ScriptedOracle {
	responses: VecDeque<BuildPlanResult>,
	calls: CallLog,
}

impl ScriptedOracle {
	pub fn new(responses: impl IntoIterator<Item = BuildPlanResult>) -> Self {
		Self {
			responses: responses.into_iter().collect(),
			calls: Default::default(),
		}
	}

	pub fn call_log(&self) -> CallLog {
		self.calls.clone()
	}
}

impl BuildPlanOracle for ScriptedOracle {
	fn check_plan(&mut self, snapshot: &Snapshot, package_dirs: &[PathBuf]) -> snapinit::Result<BuildPlanResult> {
		if let Ok(mut calls) = self.calls.lock() {
			calls.push((snapshot.clone(), package_dirs.to_vec()));
		}
		self.responses.pop_front()
			.ok_or_else(|| snapinit::Error::Parse(format!("no scripted answer left for {}", snapshot)))
	}
}

/// A snapshot source serving fixed data.
#[derive(Debug, Default)]
pub struct StaticSnapshotSource {
	available: Option<AvailableSnapshots>,
	contents: BTreeMap<String, SnapshotContents>,
}

impl StaticSnapshotSource {
	/// A source without an index, listing fails as if offline.
	pub fn offline() -> Self {
		Default::default()
	}

	/// # Parameters
	/// - `index` - A published snapshot index, see [`AvailableSnapshots::from_json`].
	pub fn from_index(index: &str) -> Result<Self> {
		Ok(Self {
			available: Some(AvailableSnapshots::from_json(index.as_bytes())?),
			contents: Default::default(),
		})
	}

	/// Adds contents for `snapshot` in `cabal.config` form.
	pub fn with_contents(mut self, snapshot: &str, cabal_config: &str) -> Result<Self> {
		self.contents.insert(snapshot.to_string(), SnapshotContents::from_cabal_config(cabal_config)?);
		Ok(self)
	}
}

impl SnapshotSource for StaticSnapshotSource {
	fn list_available(&self) -> snapinit::Result<AvailableSnapshots> {
		self.available.clone().ok_or_else(|| {
			std::io::Error::new(std::io::ErrorKind::NotConnected, "snapshot index unavailable").into()
		})
	}

	fn load_contents(&self, snapshot: &Snapshot) -> snapinit::Result<SnapshotContents> {
		self.contents.get(&snapshot.to_string()).cloned()
			.ok_or_else(|| snapinit::Error::Parse(format!("no contents for snapshot {}", snapshot)))
	}
}
