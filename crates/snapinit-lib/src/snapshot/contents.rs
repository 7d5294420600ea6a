use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::package::PackageName;

/// The packages a snapshot pins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotContents {
	/// Pinned version of each package, `None` for packages shipped with the compiler.
	pub packages: BTreeMap<PackageName, Option<String>>,
}

fn constraint_regex() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| {
		Regex::new(r"any\.([A-Za-z0-9][A-Za-z0-9-]*)\s+(?:==\s*([0-9][0-9.]*)|installed)")
			.expect("constraint pattern should compile.")
	})
}

impl SnapshotContents {
	/// Reads a `cabal.config` style constraint list.
	///
	/// ```text
	/// constraints: any.base installed,
	///              any.aeson ==2.1.2.1,
	/// ```
	///
	/// # Errors
	/// [`Parse`](crate::Error::Parse) when no constraint is found at all.
	pub fn from_cabal_config(text: &str) -> crate::Result<Self> {
		let packages: BTreeMap<_, _> = constraint_regex()
			.captures_iter(text)
			.map(|c| (PackageName::new(&c[1]), c.get(2).map(|v| v.as_str().to_string())))
			.collect();

		if packages.is_empty() {
			return Err(crate::Error::Parse("snapshot definition contains no constraints".to_string()));
		}
		Ok(Self { packages })
	}

	pub fn contains(&self, name: &PackageName) -> bool {
		self.packages.contains_key(name)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn constraints_are_read() {
		let text = "-- Stackage snapshot\nconstraints: any.aeson ==2.1.2.1,\n             any.base installed,\n             any.text ==2.0.2,\n";
		let contents = SnapshotContents::from_cabal_config(text).unwrap();
		assert_eq!(contents.packages.len(), 3);
		assert_eq!(contents.packages[&PackageName::new("aeson")], Some("2.1.2.1".to_string()));
		assert_eq!(contents.packages[&PackageName::new("base")], None);
		assert!(contents.contains(&PackageName::new("text")));
	}

	#[test]
	fn empty_definition_is_rejected() {
		assert!(SnapshotContents::from_cabal_config("<html>not found</html>").is_err());
	}
}
