use std::path::{Path, PathBuf};

use super::*;

const CACHE_FILE_NAME: &str = "snapshots.bin";

/// Provides the list of published snapshots and their contents.
pub trait SnapshotSource {
	/// # Errors
	/// Usually a transport error, the caller decides whether this is fatal.
	fn list_available(&self) -> crate::Result<AvailableSnapshots>;

	fn load_contents(&self, snapshot: &Snapshot) -> crate::Result<SnapshotContents>;
}

impl<T: SnapshotSource + ?Sized> SnapshotSource for &T {
	fn list_available(&self) -> crate::Result<AvailableSnapshots> {
		(**self).list_available()
	}

	fn load_contents(&self, snapshot: &Snapshot) -> crate::Result<SnapshotContents> {
		(**self).load_contents(snapshot)
	}
}

/// Fetches snapshot information over HTTP.
///
/// The snapshot index is cached in the data directory and used when the index can't be downloaded.
pub struct HttpSnapshotSource {
	client: reqwest::blocking::Client,
	snapshots_url: String,
	contents_url: String,
	cache_path: PathBuf,
}

impl HttpSnapshotSource {
	/// # Errors
	/// - [`Reqwest`](crate::Error::Reqwest) when the HTTP client can't be created.
	pub fn new(config: &crate::Config) -> crate::Result<Self> {
		let client = reqwest::blocking::Client::builder()
			.https_only(config.https_only())
			.build()?;

		Ok(Self {
			client,
			snapshots_url: config.snapshots_url().to_string(),
			contents_url: config.snapshot_contents_url().trim_end_matches('/').to_string(),
			cache_path: config.data_dir().join(CACHE_FILE_NAME),
		})
	}

	fn get(&self, url: &str) -> crate::Result<Vec<u8>> {
		log::debug!("Downloading {}", url);
		let response = self.client.get(url).send()?.error_for_status()?;
		Ok(response.bytes()?.to_vec())
	}
}

impl SnapshotSource for HttpSnapshotSource {
	fn list_available(&self) -> crate::Result<AvailableSnapshots> {
		match self.get(&self.snapshots_url).and_then(|data| AvailableSnapshots::from_json(&data)) {
			Ok(available) => {
				if let Err(e) = available.save_to_file(&self.cache_path) {
					log::warn!("Failed to cache snapshot index at {}: {}", self.cache_path.display(), e);
				}
				Ok(available)
			},
			Err(e) => {
				log::warn!("Failed to download snapshot index: {}", e);
				match AvailableSnapshots::load_from_file(&self.cache_path) {
					Ok(cached) => {
						log::warn!("Using cached snapshot index from {}", self.cache_path.display());
						Ok(cached)
					},
					Err(_) => Err(e),
				}
			},
		}
	}

	fn load_contents(&self, snapshot: &Snapshot) -> crate::Result<SnapshotContents> {
		let text = match snapshot {
			Snapshot::Lts { .. } | Snapshot::Nightly { .. } => {
				let data = self.get(&format!("{}/{}/cabal.config", self.contents_url, snapshot))?;
				String::from_utf8_lossy(&data).into_owned()
			},
			Snapshot::Custom(location) if location.starts_with("http://") || location.starts_with("https://") => {
				String::from_utf8_lossy(&self.get(location)?).into_owned()
			},
			Snapshot::Custom(location) => std::fs::read_to_string(location)?,
		};
		SnapshotContents::from_cabal_config(&text)
	}
}

impl AvailableSnapshots {
	/// Loads a previously cached index.
	///
	/// # Errors
	/// - [`IO`](crate::Error::IO) when opening or reading from the file.
	/// - [`Bincode`](crate::Error::Bincode) when deserializing the file.
	pub fn load_from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
		let file = std::fs::File::open(path)?;
		Ok(bincode::deserialize_from(std::io::BufReader::new(file))?)
	}

	/// Caches the index, creating parent directories as needed.
	pub fn save_to_file(&self, path: impl AsRef<Path>) -> crate::Result<()> {
		let path = path.as_ref();
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		let file = std::fs::File::create(path)?;
		bincode::serialize_into(file, self)?;
		Ok(())
	}
}
