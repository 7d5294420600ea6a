use std::path::{Path, PathBuf};

/// Recursively collects the files below `root` accepted by `file_predicate`.
///
/// Subdirectories are only entered when `dir_predicate` accepts them, a rejected directory
/// contributes nothing. `root` itself is always entered.
///
/// - Symbolic links to directories are never followed, so link cycles can't occur.
/// - A directory that can't be read due to permissions is treated as empty.
///
/// The result is sorted so callers don't depend on the order entries are returned by the OS.
///
/// # Errors
/// Any IO error other than [`PermissionDenied`](std::io::ErrorKind::PermissionDenied),
/// including `root` not existing.
pub fn find_files<F, D>(root: impl AsRef<Path>, mut file_predicate: F, mut dir_predicate: D) -> crate::Result<Vec<PathBuf>>
where
	F: FnMut(&Path) -> bool,
	D: FnMut(&Path) -> bool,
{
	let root = root.as_ref();
	log::trace!("Searching for files in {}", root.display());

	let mut found = Vec::<PathBuf>::new();

	let walker = walkdir::WalkDir::new(root)
		.follow_links(false)
		.into_iter()
		/* Symlinks report as non-directories here so they are never pruned or entered */
		.filter_entry(|e| e.depth() == 0 || !e.file_type().is_dir() || dir_predicate(e.path()));

	for entry in walker {
		let entry = match entry {
			Ok(e) => e,
			Err(e) => {
				if is_unreadable(e.io_error().map(|io| io.kind())) {
					log::debug!("Skipping unreadable directory {}", e.path().map(|p| p.display().to_string()).unwrap_or_default());
					continue;
				}
				return Err(e.into());
			},
		};

		if entry.file_type().is_dir() {
			continue;
		}

		/* `is_file` follows the link so linked files are still found while linked directories are not */
		if entry.path().is_file() && file_predicate(entry.path()) {
			found.push(entry.into_path());
		}
	}

	found.sort();
	Ok(found)
}

/// Whether a walk error only means the entry can't be read and should be skipped.
fn is_unreadable(kind: Option<std::io::ErrorKind>) -> bool {
	kind == Some(std::io::ErrorKind::PermissionDenied)
}
