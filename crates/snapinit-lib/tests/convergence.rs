use std::collections::BTreeMap;

use snapinit::build_plan::*;
use snapinit::package::BasicDescriptorLoader;
use snapinit::{CancellationToken, Config, InitFailure, InitOptions, PackageName, ProjectConfigDraft, ProjectResolverBuilder, Snapshot};
use snapinit_test_utils::{CallLog, ProjectFixture, ScriptedOracle, StaticSnapshotSource};

fn fail(blame: &[(&str, &str)]) -> BuildPlanResult {
	let mut errors = DepErrors::new();
	for (dependency, package) in blame {
		errors.add((*dependency).into(), (*package).into());
	}
	BuildPlanResult::Fail(errors)
}

fn ok() -> BuildPlanResult {
	BuildPlanResult::Ok(Default::default())
}

/// Runs with `lts-22.43` and omitting enabled.
fn run(fixture: &ProjectFixture, oracle: ScriptedOracle) -> Result<ProjectConfigDraft, InitFailure> {
	run_with(fixture, oracle, CancellationToken::new())
}

fn run_with(fixture: &ProjectFixture, oracle: ScriptedOracle, cancel: CancellationToken) -> Result<ProjectConfigDraft, InitFailure> {
	let config = Config::default();
	let options = InitOptions { omit_incompatible: true, ..Default::default() };
	ProjectResolverBuilder::new(&config, BasicDescriptorLoader::default(), StaticSnapshotSource::offline(), oracle)
		.explicit_snapshot(Some(Snapshot::parse("lts-22.43")))
		.cancellation(cancel)
		.build()
		.resolve_project(fixture.root(), &options)
}

fn dir_names(calls: &CallLog, call: usize) -> Vec<String> {
	let calls = calls.lock().unwrap();
	calls[call].1.iter().map(|d| d.file_name().unwrap().to_string_lossy().into_owned()).collect()
}

#[test]
fn incompatible_package_is_omitted() {
	let _ = env_logger::builder().is_test(true).try_init();
	let fixture = ProjectFixture::new().unwrap();
	fixture.write_cabal("a", "a", &["base"]).unwrap();
	fixture.write_cabal("b", "b", &["base", "a"]).unwrap();
	fixture.write_cabal("c", "c", &["base", "lens"]).unwrap();

	let flags = BTreeMap::from([
		(PackageName::new("a"), BTreeMap::from([("dev".to_string(), false)])),
		(PackageName::new("c"), BTreeMap::from([("dev".to_string(), true)])),
	]);
	let oracle = ScriptedOracle::new([fail(&[("lens", "c")]), BuildPlanResult::Ok(flags)]);
	let calls = oracle.call_log();

	let draft = run(&fixture, oracle).unwrap();

	assert_eq!(draft.packages, vec!["a", "b"]);
	assert_eq!(draft.incompatible, vec!["c"]);
	assert_eq!(draft.flags.keys().map(|n| n.as_str()).collect::<Vec<_>>(), vec!["a"]);
	assert!(draft.message.as_deref().unwrap().contains("- c"));
	assert_eq!(calls.lock().unwrap().len(), 2);
	assert_eq!(dir_names(&calls, 0), vec!["a", "b", "c"]);
	assert_eq!(dir_names(&calls, 1), vec!["a", "b"]);
}

#[test]
fn total_incompatibility_gives_empty_draft() {
	let fixture = ProjectFixture::new().unwrap();
	fixture.write_cabal("a", "a", &["lens"]).unwrap();
	fixture.write_cabal("b", "b", &["lens"]).unwrap();

	let oracle = ScriptedOracle::new([fail(&[("lens", "a"), ("lens", "b")])]);
	let draft = run(&fixture, oracle).unwrap();

	assert!(draft.no_working_plan);
	assert!(draft.packages.is_empty());
	assert!(draft.flags.is_empty());
	assert_eq!(draft.snapshot.to_string(), "lts-22.43");
	assert_eq!(draft.incompatible, vec!["a", "b"]);
}

#[test]
fn extra_dependencies_are_reported() {
	let fixture = ProjectFixture::new().unwrap();
	fixture.write_package_yaml(".", "app", &["base", "acme-missiles"]).unwrap();

	let extra = vec![ExtraDependency { name: "acme-missiles".into(), version: "0.3".into() }];
	let oracle = ScriptedOracle::new([BuildPlanResult::Partial(Default::default(), extra.clone())]);
	let draft = run(&fixture, oracle).unwrap();

	assert_eq!(draft.packages, vec!["."]);
	assert_eq!(draft.extra_deps, extra);
	assert!(draft.message.as_deref().unwrap().contains("- acme-missiles-0.3"));

	let json = serde_json::to_value(&draft).unwrap();
	assert_eq!(json["extra-deps"], serde_json::json!(["acme-missiles-0.3"]));
}

#[test]
fn shallower_duplicate_is_kept() {
	let fixture = ProjectFixture::new().unwrap();
	fixture.write_cabal("foo", "foo", &["base"]).unwrap();
	fixture.write_cabal("x/y/foo", "foo", &["base"]).unwrap();

	let oracle = ScriptedOracle::new([ok()]);
	let calls = oracle.call_log();
	let draft = run(&fixture, oracle).unwrap();

	assert_eq!(draft.packages, vec!["foo"]);
	assert_eq!(draft.duplicates, vec!["x/y/foo"]);
	assert_eq!(calls.lock().unwrap()[0].1, vec![fixture.root().join("foo")]);
	assert!(draft.message.is_some());
}

#[test]
fn clean_project_has_no_message() {
	let fixture = ProjectFixture::new().unwrap();
	fixture.write_cabal("a", "a", &["base"]).unwrap();

	let draft = run(&fixture, ScriptedOracle::new([ok()])).unwrap();
	assert_eq!(draft.message, None);
	assert!(draft.duplicates.is_empty() && draft.incompatible.is_empty() && draft.extra_deps.is_empty());
}

#[test]
fn name_mismatches_abort_before_resolving() {
	let fixture = ProjectFixture::new().unwrap();
	fixture.write("a/a.cabal", "name: a\n").unwrap();
	fixture.write("b/b.cabal", "name: bee\n").unwrap();

	let oracle = ScriptedOracle::default();
	let calls = oracle.call_log();
	let result = run(&fixture, oracle);

	let Err(InitFailure::NameMismatch(mismatches)) = result else { panic!("expected name mismatch") };
	assert_eq!(mismatches, vec![(fixture.root().join("b/b.cabal"), PackageName::new("bee"))]);
	assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn empty_project_reports_no_packages() {
	let fixture = ProjectFixture::new().unwrap();
	fixture.write("README.md", "nothing here\n").unwrap();

	let result = run(&fixture, ScriptedOracle::default());
	assert!(matches!(result, Err(InitFailure::NoPackagesFound(_))));
}

#[test]
fn cancelled_run_produces_no_draft() {
	let fixture = ProjectFixture::new().unwrap();
	fixture.write_cabal("a", "a", &["base"]).unwrap();

	let cancel = CancellationToken::new();
	cancel.cancel();
	let result = run_with(&fixture, ScriptedOracle::new([ok()]), cancel);
	assert!(matches!(result, Err(InitFailure::Cancelled)));
}

#[test]
fn oracle_blaming_outside_the_set_is_a_logic_error() {
	let fixture = ProjectFixture::new().unwrap();
	fixture.write_cabal("a", "a", &["base"]).unwrap();

	let result = run(&fixture, ScriptedOracle::new([fail(&[("lens", "elsewhere")])]));
	assert!(matches!(result, Err(InitFailure::InvariantViolation(_))));
}

#[cfg(unix)]
#[test]
fn symlink_cycle_is_not_followed() {
	let fixture = ProjectFixture::new().unwrap();
	fixture.write_cabal("a", "a", &["base"]).unwrap();
	std::os::unix::fs::symlink(fixture.root(), fixture.root().join("a/loop")).unwrap();

	let oracle = ScriptedOracle::new([ok()]);
	let calls = oracle.call_log();
	let draft = run(&fixture, oracle).unwrap();

	assert_eq!(draft.packages, vec!["a"]);
	assert_eq!(calls.lock().unwrap()[0].1, vec![fixture.root().join("a")]);
}
