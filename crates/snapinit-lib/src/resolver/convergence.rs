use super::*;

/// Shrinks `packages` until `snapshot` satisfies what remains.
///
/// # Parameters
/// - `omit_incompatible` - When `false` the first failure ends the resolve.
///
/// # Errors
/// - [`InitFailure::PlanFailure`] when the oracle fails and `omit_incompatible` is not set.
/// - [`InitFailure::InvariantViolation`] when a failure blames no package of the current set, as nothing could be removed.
/// - [`InitFailure::Cancelled`] and [`InitFailure::Other`] when the oracle can't answer.
pub fn converge<O>(oracle: &mut O, snapshot: &Snapshot, packages: CandidatePackageSet, omit_incompatible: bool, cancel: &CancellationToken) -> Result<Convergence, InitFailure>
where O: BuildPlanOracle + ?Sized
{
	converge_from(oracle, snapshot, packages, omit_incompatible, cancel, None)
}

/// As [`converge`], with the oracle's answer for the full set already known.
pub(super) fn converge_from<O>(
	oracle: &mut O,
	snapshot: &Snapshot,
	packages: CandidatePackageSet,
	omit_incompatible: bool,
	cancel: &CancellationToken,
	mut known: Option<BuildPlanResult>,
) -> Result<Convergence, InitFailure>
where O: BuildPlanOracle + ?Sized
{
	let mut current = packages;
	let mut removed = Vec::<(PackageName, PathBuf)>::new();
	let mut iterations = 0;

	loop {
		let result = match known.take() {
			Some(result) => result,
			None => {
				cancel.check()?;
				log::debug!("Checking {} packages against snapshot {}", current.len(), snapshot);
				oracle.check_plan(snapshot, &current.dirs())?
			},
		};
		iterations += 1;

		let errors = match result {
			BuildPlanResult::Ok(flags) => return Ok(Convergence::satisfied(snapshot, current, flags, Vec::new(), removed, iterations)),
			BuildPlanResult::Partial(flags, extra_deps) => return Ok(Convergence::satisfied(snapshot, current, flags, extra_deps, removed, iterations)),
			BuildPlanResult::Fail(errors) => errors,
		};

		if !omit_incompatible {
			return Err(InitFailure::PlanFailure { snapshot: snapshot.clone(), unsatisfied: errors });
		}

		let implicated = errors.implicated_packages();
		if implicated.is_empty() {
			return Err(InitFailure::InvariantViolation(format!("snapshot {} failed without blaming any package", snapshot)));
		}

		let to_remove: Vec<&PackageName> = implicated.iter().filter(|n| current.contains(n)).collect();
		if to_remove.is_empty() {
			return Err(InitFailure::InvariantViolation(format!(
				"snapshot {} failed only blaming packages outside the current set: {}",
				snapshot,
				implicated.iter().map(|n| n.as_str()).collect::<Vec<_>>().join(", ")
			)));
		}

		if to_remove.len() == current.len() {
			log::warn!("No package can be built with snapshot {}", snapshot);
			removed.extend(current.remove_all(to_remove));
			return Ok(Convergence {
				snapshot: snapshot.clone(),
				packages: current,
				flags: Default::default(),
				extra_deps: Default::default(),
				removed,
				outcome: ConvergenceOutcome::NoWorkingPlan,
				iterations,
			});
		}

		for (name, dir) in current.remove_all(to_remove) {
			log::warn!("Omitting package {} at {} due to unsatisfied dependencies:", name, dir.display());
			for (dependency, error) in errors.iter().filter(|(_, e)| e.needed_by.contains(&name)) {
				log::warn!("\t{} ({})", dependency, error.available.as_deref().unwrap_or("not in snapshot"));
			}
			removed.push((name, dir));
		}
	}
}
