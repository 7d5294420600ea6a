//! A minimal reader for both descriptor forms.
//!
//! Only the package name and the names of dependencies are extracted, version ranges,
//! conditionals and every other field are ignored.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use super::*;
use crate::config::DiscoveryConfig;

#[derive(Debug, Clone, Default)]
pub struct BasicDescriptorLoader {
	discovery: DiscoveryConfig,
}

impl BasicDescriptorLoader {
	pub fn new(discovery: DiscoveryConfig) -> Self {
		Self { discovery }
	}
}

impl DescriptorLoader for BasicDescriptorLoader {
	fn load(&self, path: &Path) -> Result<LoadedDescriptor, LoadError> {
		log::trace!("Loading descriptor {}", path.display());
		let text = std::fs::read_to_string(path).map_err(crate::Error::from)?;

		let (name, dependencies) = if self.discovery.is_hand_written_descriptor(path) {
			(parse_hand_written_name(&text), parse_hand_written_dependencies(&text))
		} else {
			(parse_generated_name(&text), parse_generated_dependencies(&text))
		};

		let name = name.ok_or_else(|| crate::Error::Parse(format!("{} has no name field", path.display())))?;

		if self.discovery.is_generated_descriptor(path) {
			let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
			if stem != name.as_str() {
				return Err(LoadError::NameMismatch { path: path.to_path_buf(), declared: name });
			}
		}

		Ok(LoadedDescriptor { name, metadata: PackageMetadata { dependencies } })
	}
}

fn generated_name_regex() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"(?mi)^name\s*:\s*(\S+)\s*(?:--.*)?$").expect("name pattern should compile."))
}

fn hand_written_name_regex() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r#"(?m)^name\s*:\s*["']?([^"'\s]+)["']?(?:\s+#.*)?\s*$"#).expect("name pattern should compile."))
}

fn dependency_name_regex() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r#"^\s*["']?([A-Za-z0-9][A-Za-z0-9-]*)"#).expect("dependency pattern should compile."))
}

fn parse_generated_name(text: &str) -> Option<PackageName> {
	generated_name_regex().captures(text).map(|c| PackageName::new(&c[1]))
}

fn parse_hand_written_name(text: &str) -> Option<PackageName> {
	hand_written_name_regex().captures(text).map(|c| PackageName::new(&c[1]))
}

fn indent_of(line: &str) -> usize {
	line.len() - line.trim_start().len()
}

fn push_dependency(deps: &mut Vec<PackageName>, entry: &str) {
	if let Some(c) = dependency_name_regex().captures(entry) {
		let name = PackageName::new(&c[1]);
		if !deps.contains(&name) {
			deps.push(name);
		}
	}
}

/// Collects every `build-depends` field, including its indented continuation lines.
fn parse_generated_dependencies(text: &str) -> Vec<PackageName> {
	let mut deps = Vec::new();
	let mut lines = text.lines().peekable();

	while let Some(line) = lines.next() {
		let trimmed = line.trim_start();
		let Some((field, value)) = trimmed.split_once(':') else { continue };
		if !field.trim().eq_ignore_ascii_case("build-depends") {
			continue;
		}

		let field_indent = indent_of(line);
		let mut value = value.to_string();
		while let Some(next) = lines.peek() {
			if next.trim().is_empty() || next.trim_start().starts_with("--") {
				lines.next();
				continue;
			}
			if indent_of(next) <= field_indent {
				break;
			}
			value.push(',');
			value.push_str(next);
			lines.next();
		}

		for entry in split_top_level(&value) {
			push_dependency(&mut deps, entry);
		}
	}

	deps
}

/// Splits on commas outside of `{...}` version sets.
fn split_top_level(value: &str) -> Vec<&str> {
	let mut entries = Vec::new();
	let mut depth = 0usize;
	let mut start = 0;

	for (i, c) in value.char_indices() {
		match c {
			'{' => depth += 1,
			'}' => depth = depth.saturating_sub(1),
			',' if depth == 0 => {
				entries.push(&value[start..i]);
				start = i + 1;
			},
			_ => {},
		}
	}
	entries.push(&value[start..]);
	entries
}

/// Collects every `dependencies` key at any nesting level.
///
/// Handles block lists (`- base >= 4`), inline lists (`[base, text]`), single values and mappings (`base: ">= 4"`).
fn parse_hand_written_dependencies(text: &str) -> Vec<PackageName> {
	let mut deps = Vec::new();
	let mut lines = text.lines().peekable();

	while let Some(line) = lines.next() {
		let trimmed = line.trim_start();
		let Some(value) = trimmed.strip_prefix("dependencies:") else { continue };

		let value = value.trim();
		if !value.is_empty() {
			for entry in value.trim_start_matches('[').trim_end_matches(']').split(',') {
				push_dependency(&mut deps, entry);
			}
			continue;
		}

		let key_indent = indent_of(line);
		while let Some(next) = lines.peek() {
			let next_trimmed = next.trim_start();
			if next_trimmed.is_empty() || next_trimmed.starts_with('#') {
				lines.next();
				continue;
			}
			/* Block lists may sit at the same indentation as their key */
			let is_item = next_trimmed.starts_with('-');
			if indent_of(next) < key_indent || (indent_of(next) == key_indent && !is_item) {
				break;
			}
			let entry = next_trimmed.trim_start_matches('-');
			let entry = entry.split(':').next().unwrap_or_default();
			push_dependency(&mut deps, entry);
			lines.next();
		}
	}

	deps
}
