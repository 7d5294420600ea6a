use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use snapinit::build_plan::SnapshotPlanOracle;
use snapinit::package::BasicDescriptorLoader;
use snapinit::snapshot::HttpSnapshotSource;
use snapinit::{CancellationToken, Config, InitOptions, ProjectConfigDraft, ProjectResolverBuilder, Snapshot};

const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[tokio::main]
async fn main() {
	let mut opts;

	/* Parse console input */
	let parsed_options = {
		let args: Vec<String> = std::env::args().collect();

		opts = getopts::Options::new();
		opts.optflag( "h", "help",           "Show help");
		opts.optflag( "v", "verbose",        "Increased verbosity");
		opts.optopt(  "",  "resolver",       "Use this snapshot instead of searching for one", "SNAPSHOT");
		opts.optflag( "",  "omit-packages",  "Leave out packages whose dependencies can't be satisfied");
		opts.optflag( "",  "force",          "Proceed even if a project configuration exists");
		opts.optflag( "",  "ignore-subdirs", "Do not search subdirectories for packages");
		opts.optopt(  "",  "timeout",        "Give up after this many seconds", "SECS");
		opts.parsing_style(getopts::ParsingStyle::FloatingFrees);

		let parsed_options = match opts.parse(&args[1..]) {
			Ok(m)  => { m }
			Err(e) => { println!("Unable to parse options: {}", e); return }
		};

		if parsed_options.opt_present("h") {
			eprintln!("{}", opts.usage("Usage: snapinit-terminal [options] [DIR...]"));
			return;
		}

		parsed_options
	};

	let default_level = if parsed_options.opt_present("v") { "debug" } else { "info" };
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

	let config = Config::load_from_disk().unwrap_or_else(|e| {
		log::warn!("Failed to read config file: {}", e);
		log::warn!("Using default config.");
		Config::default()
	});

	let timeout = match parsed_options.opt_str("timeout").map(|s| s.parse::<u64>()) {
		None => DEFAULT_TIMEOUT_SECS,
		Some(Ok(secs)) => secs,
		Some(Err(e)) => { log::error!("Invalid timeout: {}", e); std::process::exit(2) },
	};

	let project_root = match std::env::current_dir() {
		Ok(dir) => dir,
		Err(e) => { log::error!("Unable to determine current directory: {}", e); std::process::exit(1) },
	};

	if let Some(parent) = find_enclosing_project(&config, &project_root) {
		log::warn!("This directory is inside the project configured by {}", parent.display());
	}

	let options = InitOptions {
		search_roots: parsed_options.free.iter().map(PathBuf::from).collect(),
		recurse: !parsed_options.opt_present("ignore-subdirs"),
		omit_incompatible: parsed_options.opt_present("omit-packages"),
		overwrite_existing: parsed_options.opt_present("force"),
	};
	let snapshot = parsed_options.opt_str("resolver").map(Snapshot::from);

	match run(config, project_root, options, snapshot, timeout).await {
		Ok(draft) => {
			if let Some(message) = &draft.message {
				for line in message.lines() {
					log::warn!("{}", line);
				}
			}
			if draft.no_working_plan {
				log::warn!("No package could be built, only the snapshot was selected.");
			}
			match serde_json::to_string_pretty(&draft) {
				Ok(json) => println!("{}", json),
				Err(e) => { log::error!("Failed to serialize configuration: {}", e); std::process::exit(1) },
			}
		},
		Err(e) => {
			log::error!("{}", e);
			std::process::exit(1);
		},
	}
}

/// Looks for a project configuration in any directory above `project_root`.
fn find_enclosing_project(config: &Config, project_root: &Path) -> Option<PathBuf> {
	let parent = project_root.parent()?;
	snapinit::filesystem::search_up(parent, |dir| {
		let candidate = dir.join(config.project_file_name());
		candidate.is_file().then_some(candidate)
	})
}

/// Resolves on a blocking thread, cancelling it once `timeout_secs` have passed.
async fn run(config: Config, project_root: PathBuf, options: InitOptions, snapshot: Option<Snapshot>, timeout_secs: u64) -> Result<ProjectConfigDraft, Error> {
	let timeout = Duration::from_secs(timeout_secs);
	let cancel = CancellationToken::with_deadline(Instant::now() + timeout);
	let worker_cancel = cancel.clone();

	let task = tokio::task::spawn_blocking(move || -> Result<ProjectConfigDraft, Error> {
		let source = HttpSnapshotSource::new(&config)?;
		let oracle = SnapshotPlanOracle::new(&source, BasicDescriptorLoader::new(config.discovery.clone()), config.discovery.clone());

		let draft = ProjectResolverBuilder::new(&config, BasicDescriptorLoader::new(config.discovery.clone()), &source, oracle)
			.explicit_snapshot(snapshot)
			.cancellation(worker_cancel)
			.build()
			.resolve_project(&project_root, &options)?;
		Ok(draft)
	});

	match tokio::time::timeout(timeout, task).await {
		Ok(joined) => joined?,
		Err(_) => {
			/* The worker notices at its next check */
			cancel.cancel();
			Err(Error::Timeout(timeout_secs))
		},
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("snapinit error: {0}")]
	Snapinit(#[from] snapinit::Error),
	#[error("{0}")]
	Init(#[from] snapinit::InitFailure),
	#[error("timed out after {0} seconds")]
	Timeout(u64),
	#[error("resolution task failed: {0}")]
	Join(#[from] tokio::task::JoinError),
}
