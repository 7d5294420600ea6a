use snapinit::build_plan::SnapshotPlanOracle;
use snapinit::package::BasicDescriptorLoader;
use snapinit::*;
use snapinit_test_utils::{test_data_dir, ProjectFixture, StaticSnapshotSource};

fn read_test_data(name: &str) -> String {
	std::fs::read_to_string(test_data_dir().join(name)).expect("test data should be readable")
}

fn snapshot_source() -> StaticSnapshotSource {
	StaticSnapshotSource::from_index(&read_test_data("snapshots.json")).unwrap()
		.with_contents("lts-22.43", &read_test_data("lts-22.43.cabal.config")).unwrap()
		.with_contents("nightly-2024-05-01", &read_test_data("nightly-2024-05-01.cabal.config")).unwrap()
		.with_contents("lts-21.25", &read_test_data("lts-21.25.cabal.config")).unwrap()
}

fn init(fixture: &ProjectFixture, options: &InitOptions, snapshot: Option<&str>) -> std::result::Result<ProjectConfigDraft, InitFailure> {
	let config = Config::default();
	let source = snapshot_source();
	let oracle = SnapshotPlanOracle::new(&source, BasicDescriptorLoader::default(), config.discovery.clone());

	resolve_project(&config, fixture.root(), options, snapshot.map(|s| Snapshot::parse(s)), BasicDescriptorLoader::default(), &source, oracle)
}

#[test]
fn ranked_snapshots_pick_first_satisfying_all_packages() {
	let _ = env_logger::builder().is_test(true).try_init();
	let fixture = ProjectFixture::from_test_data("sample-project").unwrap();

	let draft = init(&fixture, &InitOptions::default(), None).unwrap();

	/* lts-22.43 lacks servant-server, the nightly has it */
	assert_eq!(draft.snapshot, Snapshot::parse("nightly-2024-05-01"));
	assert_eq!(draft.packages, vec!["core", "tools/cli", "web"]);
	assert_eq!(draft.duplicates, vec!["vendor/old/core"]);
	assert!(draft.incompatible.is_empty());
	assert!(draft.message.as_deref().unwrap().contains("vendor/old/core"));
	assert!(!draft.no_working_plan);
}

#[test]
fn explicit_snapshot_with_omit_drops_incompatible_package() {
	let fixture = ProjectFixture::from_test_data("sample-project").unwrap();
	let options = InitOptions { omit_incompatible: true, ..Default::default() };

	let draft = init(&fixture, &options, Some("lts-22.43")).unwrap();

	assert_eq!(draft.snapshot, Snapshot::Lts { major: 22, minor: 43 });
	assert_eq!(draft.packages, vec!["core", "tools/cli"]);
	assert_eq!(draft.incompatible, vec!["web"]);
	let message = draft.message.unwrap();
	assert!(message.contains("- web"));
	assert!(message.contains("- vendor/old/core"));
}

#[test]
fn explicit_snapshot_without_omit_reports_unsatisfied_dependencies() {
	let fixture = ProjectFixture::from_test_data("sample-project").unwrap();

	let result = init(&fixture, &InitOptions::default(), Some("lts-22.43"));

	let Err(InitFailure::PlanFailure { snapshot, unsatisfied }) = result else { panic!("expected plan failure") };
	assert_eq!(snapshot.to_string(), "lts-22.43");
	let servant = unsatisfied.get(&"servant-server".into()).unwrap();
	assert_eq!(servant.available, None);
	assert_eq!(servant.needed_by.iter().map(|n| n.as_str()).collect::<Vec<_>>(), vec!["web"]);
}

#[test]
fn repeated_runs_give_identical_drafts() {
	let fixture = ProjectFixture::from_test_data("sample-project").unwrap();
	let options = InitOptions { omit_incompatible: true, ..Default::default() };

	let first = init(&fixture, &options, None).unwrap();
	let second = init(&fixture, &options, None).unwrap();
	assert_eq!(first, second);
	assert_eq!(serde_json::to_string(&first).unwrap(), serde_json::to_string(&second).unwrap());
}

#[test]
fn ignoring_subdirectories_finds_nothing_in_sample_project() {
	let fixture = ProjectFixture::from_test_data("sample-project").unwrap();
	let options = InitOptions { recurse: false, ..Default::default() };

	let result = init(&fixture, &options, None);
	assert!(matches!(result, Err(InitFailure::NoPackagesFound(roots)) if roots == vec![fixture.root()]));
}

#[test]
fn search_roots_limit_discovery() {
	let fixture = ProjectFixture::from_test_data("sample-project").unwrap();
	let options = InitOptions { search_roots: vec!["core".into(), "tools".into()], ..Default::default() };

	let draft = init(&fixture, &options, Some("lts-22.43")).unwrap();
	assert_eq!(draft.packages, vec!["core", "tools/cli"]);
	assert!(draft.duplicates.is_empty());
	assert_eq!(draft.message, None);
}

#[test]
fn existing_configuration_is_kept_unless_overwriting() {
	let fixture = ProjectFixture::from_test_data("sample-project").unwrap();
	fixture.write("stack.yaml", "resolver: lts-21.25\n").unwrap();

	let result = init(&fixture, &InitOptions::default(), None);
	assert!(matches!(result, Err(InitFailure::ConfigExists(path)) if path == fixture.root().join("stack.yaml")));

	let options = InitOptions { overwrite_existing: true, ..Default::default() };
	assert!(init(&fixture, &options, None).is_ok());
}

#[test]
fn unreachable_snapshot_index_is_reported() {
	let fixture = ProjectFixture::from_test_data("sample-project").unwrap();
	let config = Config::default();
	let source = snapshot_source();
	let oracle = SnapshotPlanOracle::new(&source, BasicDescriptorLoader::default(), config.discovery.clone());

	let result = resolve_project(&config, fixture.root(), &InitOptions::default(), None, BasicDescriptorLoader::default(), StaticSnapshotSource::offline(), oracle);
	assert!(matches!(result, Err(InitFailure::SnapshotSourceUnavailable(_))));
}

#[test]
fn explicit_snapshot_does_not_need_the_index() {
	let fixture = ProjectFixture::from_test_data("sample-project").unwrap();
	let config = Config::default();
	let source = snapshot_source();
	let oracle = SnapshotPlanOracle::new(&source, BasicDescriptorLoader::default(), config.discovery.clone());

	let draft = resolve_project(
		&config,
		fixture.root(),
		&InitOptions::default(),
		Some(Snapshot::parse("nightly-2024-05-01")),
		BasicDescriptorLoader::default(),
		StaticSnapshotSource::offline(),
		oracle,
	).unwrap();
	assert_eq!(draft.packages.len(), 3);
}
