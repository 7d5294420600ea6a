//! Settings shared by every resolution run.
//!
//! Values that influence discovery and ranking are kept in [`DiscoveryConfig`] and [`RankingConfig`]
//! and handed to those stages explicitly.

use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	data_dir: PathBuf,
	snapshots_url: String,
	snapshot_contents_url: String,
	https_only: bool,
	project_file_name: String,
	pub discovery: DiscoveryConfig,
	pub ranking: RankingConfig,
}

/// Controls which files are descriptors and which directories are never searched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
	/// Directories whose name starts with this are hidden and skipped.
	pub hidden_prefix: String,
	/// Build artifact directories that are skipped.
	pub ignored_dirs: Vec<String>,
	/// File name of the hand-written descriptor form.
	pub hand_written_descriptor: String,
	/// Extension of the generated descriptor form.
	pub generated_descriptor_extension: String,
}

impl Default for DiscoveryConfig {
	fn default() -> Self {
		Self {
			hidden_prefix: ".".to_string(),
			ignored_dirs: vec!["dist".to_string(), "dist-newstyle".to_string(), ".stack-work".to_string()],
			hand_written_descriptor: "package.yaml".to_string(),
			generated_descriptor_extension: "cabal".to_string(),
		}
	}
}

impl DiscoveryConfig {
	pub fn is_hand_written_descriptor(&self, path: &Path) -> bool {
		path.file_name().map_or(false, |n| n == self.hand_written_descriptor.as_str())
	}

	pub fn is_generated_descriptor(&self, path: &Path) -> bool {
		let has_stem = path.file_stem().map_or(false, |s| !s.is_empty());
		has_stem && path.extension().map_or(false, |e| e == self.generated_descriptor_extension.as_str())
	}

	pub fn is_descriptor(&self, path: &Path) -> bool {
		self.is_hand_written_descriptor(path) || self.is_generated_descriptor(path)
	}

	/// `true` when a directory may be searched.
	pub fn is_searchable_dir(&self, path: &Path) -> bool {
		match path.file_name().and_then(|n| n.to_str()) {
			Some(name) => {
				!name.starts_with(self.hidden_prefix.as_str())
					&& !self.ignored_dirs.iter().any(|i| i == name)
			},
			/* Non unicode names can't match anything we ignore */
			None => true,
		}
	}
}

/// Controls which stable snapshots are considered when ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
	/// Stable releases with a lower major version are never suggested.
	pub min_supported_major: u32,
}

impl Default for RankingConfig {
	fn default() -> Self {
		Self { min_supported_major: 3 }
	}
}

impl Default for Config {
	fn default() -> Self {
		Self {
			data_dir: default_data_dir(),
			snapshots_url: "https://www.stackage.org/download/snapshots.json".to_string(),
			snapshot_contents_url: "https://www.stackage.org".to_string(),
			https_only: true,
			project_file_name: "stack.yaml".to_string(),
			discovery: Default::default(),
			ranking: Default::default(),
		}
	}
}

fn default_data_dir() -> PathBuf {
	#[cfg(target_os = "windows")]
	let base = std::env::var_os("APPDATA").map(PathBuf::from);

	#[cfg(not(target_os = "windows"))]
	let base = if let Some(e) = std::env::var_os("XDG_DATA_HOME") {
		Some(PathBuf::from(e))
	} else {
		std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share"))
	};

	base.unwrap_or_else(std::env::temp_dir).join("snapinit")
}

impl Config {
	/// Loads the config file from the default data directory.
	///
	/// # Errors
	/// - [`IO`](crate::Error::IO) when the file is missing or unreadable.
	/// - [`SerdeJSON`](crate::Error::SerdeJSON) when the file can't be deserialized.
	pub fn load_from_disk() -> crate::Result<Self> {
		Self::load_from_file(default_data_dir().join(CONFIG_FILE_NAME))
	}

	pub fn load_from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
		let file = std::fs::File::open(path)?;
		Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
	}

	/// Saves the config into its data directory.
	pub fn save_to_disk(&self) -> crate::Result<()> {
		std::fs::create_dir_all(&self.data_dir)?;
		let file = std::fs::File::create(self.data_dir.join(CONFIG_FILE_NAME))?;
		serde_json::to_writer_pretty(file, self)?;
		Ok(())
	}

	pub fn data_dir(&self) -> &Path {
		&self.data_dir
	}
	pub fn set_data_dir(&mut self, data_dir: PathBuf) {
		self.data_dir = data_dir;
	}

	pub fn snapshots_url(&self) -> &str {
		&self.snapshots_url
	}
	pub fn set_snapshots_url(&mut self, url: impl Into<String>) {
		self.snapshots_url = url.into();
	}

	/// Base url, snapshot contents are found at `<base>/<snapshot>/cabal.config`.
	pub fn snapshot_contents_url(&self) -> &str {
		&self.snapshot_contents_url
	}
	pub fn set_snapshot_contents_url(&mut self, url: impl Into<String>) {
		self.snapshot_contents_url = url.into();
	}

	pub fn https_only(&self) -> bool {
		self.https_only
	}
	pub fn set_https_only(&mut self, https_only: bool) {
		self.https_only = https_only;
	}

	/// Name of the generated project configuration file.
	pub fn project_file_name(&self) -> &str {
		&self.project_file_name
	}
	pub fn set_project_file_name(&mut self, name: impl Into<String>) {
		self.project_file_name = name.into();
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn hidden_and_ignored_dirs_are_not_searchable() {
		let c = DiscoveryConfig::default();
		assert!(!c.is_searchable_dir(Path::new("/proj/.git")));
		assert!(!c.is_searchable_dir(Path::new("/proj/.stack-work")));
		assert!(!c.is_searchable_dir(Path::new("/proj/dist-newstyle")));
		assert!(c.is_searchable_dir(Path::new("/proj/lib")));
	}

	#[test]
	fn descriptor_forms_are_recognised() {
		let c = DiscoveryConfig::default();
		assert!(c.is_descriptor(Path::new("/proj/package.yaml")));
		assert!(c.is_descriptor(Path::new("/proj/foo.cabal")));
		assert!(!c.is_descriptor(Path::new("/proj/.cabal")));
		assert!(!c.is_descriptor(Path::new("/proj/cabal.project")));
		assert!(!c.is_descriptor(Path::new("/proj/other.yaml")));
	}

	#[test]
	fn config_round_trips_through_disk() {
		let dir = tempfile::tempdir().unwrap();
		let mut config = Config::default();
		config.set_data_dir(dir.path().to_path_buf());
		config.ranking.min_supported_major = 12;
		config.save_to_disk().unwrap();

		let loaded = Config::load_from_file(dir.path().join(CONFIG_FILE_NAME)).unwrap();
		assert_eq!(loaded, config);
	}

	#[test]
	fn missing_fields_take_defaults() {
		let c: Config = serde_json::from_str(r#"{ "https_only": false }"#).unwrap();
		assert!(!c.https_only());
		assert_eq!(c.project_file_name(), "stack.yaml");
		assert_eq!(c.ranking.min_supported_major, 3);
	}
}
