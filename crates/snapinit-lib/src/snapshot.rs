//! Dependency snapshots and where to get them.
//!
//! # Channels
//!
//! - The stable channel (`lts-<major>.<minor>`) is released periodically, each major line receiving minor updates.
//! - The rolling channel (`nightly-<date>`) is updated frequently and always ranked after the best stable release.
//!
//! Anything that doesn't parse as either is treated as a [`Snapshot::Custom`] location,
//! which is only ever used when given explicitly.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Serialize, Deserialize};

mod ranking;
pub use ranking::rank_snapshots;

mod contents;
pub use contents::SnapshotContents;

mod source;
pub use source::SnapshotSource;
pub use source::HttpSnapshotSource;

/// A reference to an immutable dependency snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Snapshot {
	Lts { major: u32, minor: u32 },
	Nightly { date: String },
	/// A url or path to a snapshot definition.
	Custom(String),
}

fn lts_regex() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"^lts-(\d+)\.(\d+)$").expect("lts pattern should compile."))
}

fn nightly_regex() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"^nightly-(\d{4}-\d{2}-\d{2})$").expect("nightly pattern should compile."))
}

impl Snapshot {
	/// Parses a snapshot identifier, unknown forms become [`Snapshot::Custom`].
	pub fn parse(s: impl AsRef<str>) -> Self {
		let s = s.as_ref().trim();
		if let Some(c) = lts_regex().captures(s) {
			if let (Ok(major), Ok(minor)) = (c[1].parse::<u32>(), c[2].parse::<u32>()) {
				return Snapshot::Lts { major, minor };
			}
		}
		if let Some(c) = nightly_regex().captures(s) {
			return Snapshot::Nightly { date: c[1].to_string() };
		}
		Snapshot::Custom(s.to_string())
	}

	pub fn is_stable(&self) -> bool {
		matches!(self, Snapshot::Lts { .. })
	}
}

impl std::fmt::Display for Snapshot {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Snapshot::Lts { major, minor } => write!(f, "lts-{}.{}", major, minor),
			Snapshot::Nightly { date } => write!(f, "nightly-{}", date),
			Snapshot::Custom(location) => f.write_str(location),
		}
	}
}

impl From<Snapshot> for String {
	fn from(s: Snapshot) -> Self {
		s.to_string()
	}
}

impl From<String> for Snapshot {
	fn from(s: String) -> Self {
		Snapshot::parse(s)
	}
}

impl std::str::FromStr for Snapshot {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Snapshot::parse(s))
	}
}

/// The snapshots currently published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSnapshots {
	/// Latest minor release of each stable major version.
	pub stable: BTreeMap<u32, u32>,
	/// Latest rolling snapshot.
	pub nightly: Snapshot,
}

impl AvailableSnapshots {
	/// Reads the published index, a JSON object such as
	/// `{"lts-22": "lts-22.43", "lts": "lts-22.43", "nightly": "nightly-2024-05-01"}`.
	///
	/// Keys other than `lts-<major>` and `nightly` are ignored.
	///
	/// # Errors
	/// - [`SerdeJSON`](crate::Error::SerdeJSON) when not a JSON object of strings.
	/// - [`Parse`](crate::Error::Parse) when the nightly entry is missing or a value is not the expected channel.
	pub fn from_json(data: &[u8]) -> crate::Result<Self> {
		use crate::Error::Parse;

		let index: BTreeMap<String, String> = serde_json::from_slice(data)?;
		let mut stable = BTreeMap::new();
		let mut nightly = None;

		for (key, value) in &index {
			if key == "nightly" {
				match Snapshot::parse(value) {
					s @ Snapshot::Nightly { .. } => nightly = Some(s),
					_ => return Err(Parse(format!("\"{}\" is not a nightly snapshot", value))),
				}
			} else if let Some(major) = key.strip_prefix("lts-") {
				let Ok(major) = major.parse::<u32>() else { continue };
				match Snapshot::parse(value) {
					Snapshot::Lts { major: m, minor } if m == major => { stable.insert(major, minor); },
					_ => return Err(Parse(format!("\"{}\" is not a release of lts-{}", value, major))),
				}
			}
		}

		let nightly = nightly.ok_or_else(|| Parse("snapshot index has no nightly entry".to_string()))?;
		Ok(Self { stable, nightly })
	}

	pub fn stable_snapshots(&self) -> impl DoubleEndedIterator<Item = Snapshot> + '_ {
		self.stable.iter().map(|(&major, &minor)| Snapshot::Lts { major, minor })
	}
}
