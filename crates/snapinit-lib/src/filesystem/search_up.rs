use std::path::Path;

/// Applies `probe` to `start` then to each of its ancestors, returning the first result.
///
/// Stops with `None` once the filesystem root has been probed.
pub fn search_up<T, F>(start: impl AsRef<Path>, mut probe: F) -> Option<T>
where F: FnMut(&Path) -> Option<T>
{
	let mut current = Some(start.as_ref());
	while let Some(dir) = current {
		if let Some(found) = probe(dir) {
			return Some(found);
		}
		current = dir.parent();
	}
	None
}
