use super::*;
use super::convergence::converge_from;

/// Picks the first of `candidates` able to build `packages`.
///
/// Every candidate is first checked against the full set. If none is satisfied and `omit_incompatible` is set,
/// candidates are converged in the same order and the first that keeps at least one package is used.
/// When every candidate loses every package the result for the first candidate is returned.
///
/// # Parameters
/// - `candidates` - Snapshots in order of preference, usually from [`rank_snapshots`](crate::snapshot::rank_snapshots).
///
/// # Errors
/// - [`InitFailure::NoMatchingSnapshot`] with every candidate's unsatisfied dependencies, when none works
/// and `omit_incompatible` is not set.
/// - Anything [`converge`] returns.
pub fn select_snapshot<O>(oracle: &mut O, candidates: &[Snapshot], packages: &CandidatePackageSet, omit_incompatible: bool, cancel: &CancellationToken) -> Result<Convergence, InitFailure>
where O: BuildPlanOracle + ?Sized
{
	let dirs = packages.dirs();
	let mut tried = Vec::<(Snapshot, DepErrors)>::with_capacity(candidates.len());

	for candidate in candidates {
		cancel.check()?;
		log::info!("Checking snapshot {}", candidate);
		match oracle.check_plan(candidate, &dirs)? {
			BuildPlanResult::Ok(flags) => return Ok(Convergence::satisfied(candidate, packages.clone(), flags, Vec::new(), Vec::new(), 1)),
			BuildPlanResult::Partial(flags, extra_deps) => return Ok(Convergence::satisfied(candidate, packages.clone(), flags, extra_deps, Vec::new(), 1)),
			BuildPlanResult::Fail(errors) => {
				log::debug!("Snapshot {} is missing {} dependencies", candidate, errors.len());
				tried.push((candidate.clone(), errors));
			},
		}
	}

	if !omit_incompatible || tried.is_empty() {
		return Err(InitFailure::NoMatchingSnapshot { tried });
	}

	log::info!("No snapshot builds every package, looking for one that builds some");
	let mut first_empty = None;
	for (candidate, errors) in tried {
		let convergence = converge_from(oracle, &candidate, packages.clone(), true, cancel, Some(BuildPlanResult::Fail(errors)))?;
		if convergence.outcome != ConvergenceOutcome::NoWorkingPlan {
			return Ok(convergence);
		}
		first_empty.get_or_insert(convergence);
	}

	first_empty.ok_or_else(|| InitFailure::InvariantViolation("no snapshot was converged".to_string()))
}
